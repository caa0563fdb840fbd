//! # Redirect Coordinator
//!
//! Moves a brand-new conversation to its permanent address (`/chat/<id>`)
//! exactly once, after the backend has assigned it an id.
//!
//! ```text
//!   arm()            observe() [all conditions]       timer_fired(id)
//! Idle ──▶ Armed ─────────────────────────▶ TimerPending ──────────────▶ Redirected
//!   ▲                                             │
//!   └──────────────── unmount() ◀─────────────────┘   (from any state)
//! ```
//!
//! The coordinator owns no timer. Every transition returns the side effects it
//! wants as [`RedirectEffect`] values; the TUI executes them. Navigation is
//! delayed because the conversation list is read from storage that may lag
//! behind the in-memory snapshot carrying the new id.
//!
//! The latch (`in_progress`) keeps repeated snapshots from scheduling
//! overlapping redirects. It is cleared only by the timer firing or by unmount.

use std::time::Duration;

use log::{debug, info};

use crate::RedirectPolicy;
use crate::core::state::{ConversationState, Routes, Tier};

/// Delay between the id appearing and the address being replaced.
pub const REDIRECT_DELAY: Duration = Duration::from_millis(1500);

/// Identifies one scheduled redirect. Ids are never reused within a coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectPhase {
    Idle,
    Armed,
    TimerPending,
    Redirected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectEffect {
    CancelTimer(TimerId),
    /// Best-effort notification for conversation lists.
    RefreshConversationList,
    ScheduleRedirect {
        timer: TimerId,
        delay: Duration,
        path: String,
    },
    /// Replace (not push) the current history entry.
    ReplaceAddress(String),
}

/// What the coordinator looks at on each conversation change.
pub struct RedirectSignal<'a> {
    pub conversation: &'a ConversationState,
    pub address: &'a str,
    pub tier: Tier,
    pub routes: &'a Routes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingRedirect {
    timer: TimerId,
    path: String,
}

#[derive(Debug, Clone)]
pub struct RedirectCoordinator {
    phase: RedirectPhase,
    in_progress: bool,
    pending: Option<PendingRedirect>,
    next_timer: u64,
    policy: RedirectPolicy,
    delay: Duration,
}

impl Default for RedirectCoordinator {
    fn default() -> Self {
        Self::new(RedirectPolicy::default(), REDIRECT_DELAY)
    }
}

impl RedirectCoordinator {
    pub fn new(policy: RedirectPolicy, delay: Duration) -> Self {
        Self {
            phase: RedirectPhase::Idle,
            in_progress: false,
            pending: None,
            next_timer: 0,
            policy,
            delay,
        }
    }

    pub fn phase(&self) -> RedirectPhase {
        self.phase
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn pending_timer(&self) -> Option<TimerId> {
        self.pending.as_ref().map(|p| p.timer)
    }

    /// True while the view shows a conversation that has not reached its permanent address.
    pub fn is_new_chat(&self) -> bool {
        matches!(self.phase, RedirectPhase::Armed | RedirectPhase::TimerPending)
    }

    /// Flag the view as a new, not-yet-persisted conversation.
    pub fn arm(&mut self) {
        if matches!(self.phase, RedirectPhase::Idle | RedirectPhase::Redirected) {
            debug!("Redirect armed");
            self.phase = RedirectPhase::Armed;
        }
    }

    fn admits(&self, tier: Tier) -> bool {
        match self.policy {
            RedirectPolicy::PremiumOnly => tier == Tier::Premium,
            RedirectPolicy::Everyone => true,
        }
    }

    /// React to a conversation change.
    pub fn observe(&mut self, signal: &RedirectSignal<'_>) -> Vec<RedirectEffect> {
        if self.phase != RedirectPhase::Armed || self.in_progress {
            return Vec::new();
        }
        let Some(id) = signal.conversation.id.as_deref() else {
            return Vec::new();
        };
        if signal.conversation.messages.is_empty()
            || signal.address.contains(id)
            || !self.admits(signal.tier)
        {
            return Vec::new();
        }

        let mut effects = Vec::new();
        if let Some(old) = self.pending.take() {
            effects.push(RedirectEffect::CancelTimer(old.timer));
        }
        effects.push(RedirectEffect::RefreshConversationList);

        self.in_progress = true;
        let timer = TimerId(self.next_timer);
        self.next_timer += 1;
        let path = signal.routes.chat(id);
        info!("Scheduling redirect to {} in {:?}", path, self.delay);
        self.pending = Some(PendingRedirect {
            timer,
            path: path.clone(),
        });
        self.phase = RedirectPhase::TimerPending;
        effects.push(RedirectEffect::ScheduleRedirect {
            timer,
            delay: self.delay,
            path,
        });
        effects
    }

    /// The timer `timer` elapsed. Stale or cancelled timers are ignored.
    pub fn timer_fired(&mut self, timer: TimerId) -> Vec<RedirectEffect> {
        match self.pending.take() {
            Some(pending) if pending.timer == timer => {
                info!("Redirecting to {}", pending.path);
                self.in_progress = false;
                self.phase = RedirectPhase::Redirected;
                vec![RedirectEffect::ReplaceAddress(pending.path)]
            }
            other => {
                debug!("Ignoring stale redirect timer {:?}", timer);
                self.pending = other;
                Vec::new()
            }
        }
    }

    /// Tear down: cancel any pending timer and release the latch.
    pub fn unmount(&mut self) -> Vec<RedirectEffect> {
        self.phase = RedirectPhase::Idle;
        self.in_progress = false;
        match self.pending.take() {
            Some(pending) => {
                debug!("Cancelling pending redirect {:?} on unmount", pending.timer);
                vec![RedirectEffect::CancelTimer(pending.timer)]
            }
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::ChatMessage;

    fn conversation(id: Option<&str>, messages: usize) -> ConversationState {
        ConversationState {
            id: id.map(str::to_string),
            messages: (0..messages).map(|i| ChatMessage::user(format!("m{i}"))).collect(),
        }
    }

    fn observe(
        coordinator: &mut RedirectCoordinator,
        conversation: &ConversationState,
        address: &str,
        tier: Tier,
    ) -> Vec<RedirectEffect> {
        let routes = Routes::default();
        coordinator.observe(&RedirectSignal {
            conversation,
            address,
            tier,
            routes: &routes,
        })
    }

    fn armed() -> RedirectCoordinator {
        let mut c = RedirectCoordinator::default();
        c.arm();
        c
    }

    #[test]
    fn test_schedules_once_when_all_conditions_hold() {
        let mut c = armed();
        let effects = observe(&mut c, &conversation(Some("abc123"), 1), "/", Tier::Premium);
        assert_eq!(
            effects,
            vec![
                RedirectEffect::RefreshConversationList,
                RedirectEffect::ScheduleRedirect {
                    timer: TimerId(0),
                    delay: REDIRECT_DELAY,
                    path: "/chat/abc123".to_string(),
                },
            ]
        );
        assert_eq!(c.phase(), RedirectPhase::TimerPending);
        assert!(c.in_progress());
    }

    #[test]
    fn test_stays_armed_without_id_or_messages() {
        let mut c = armed();
        assert!(observe(&mut c, &conversation(None, 2), "/", Tier::Premium).is_empty());
        assert!(observe(&mut c, &conversation(Some("abc"), 0), "/", Tier::Premium).is_empty());
        assert_eq!(c.phase(), RedirectPhase::Armed);
    }

    #[test]
    fn test_no_schedule_when_address_already_has_id() {
        let mut c = armed();
        let effects = observe(&mut c, &conversation(Some("abc"), 1), "/chat/abc", Tier::Premium);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_free_tier_excluded_by_default_policy() {
        let mut c = armed();
        assert!(observe(&mut c, &conversation(Some("abc"), 1), "/", Tier::Free).is_empty());
        assert_eq!(c.phase(), RedirectPhase::Armed);
    }

    #[test]
    fn test_everyone_policy_admits_free_tier() {
        let mut c = RedirectCoordinator::new(RedirectPolicy::Everyone, REDIRECT_DELAY);
        c.arm();
        let effects = observe(&mut c, &conversation(Some("abc"), 1), "/", Tier::Free);
        assert_eq!(effects.len(), 2);
    }

    #[test]
    fn test_idle_coordinator_ignores_changes() {
        let mut c = RedirectCoordinator::default();
        assert!(observe(&mut c, &conversation(Some("abc"), 1), "/", Tier::Premium).is_empty());
    }

    #[test]
    fn test_latch_blocks_repeated_changes_and_only_one_redirect_fires() {
        let mut c = armed();
        let first = observe(&mut c, &conversation(Some("abc123"), 1), "/", Tier::Premium);
        assert_eq!(first.len(), 2);

        for n in 2..5 {
            let more = observe(&mut c, &conversation(Some("abc123"), n), "/", Tier::Premium);
            assert!(more.is_empty());
        }

        let fired = c.timer_fired(TimerId(0));
        assert_eq!(
            fired,
            vec![RedirectEffect::ReplaceAddress("/chat/abc123".to_string())]
        );
        assert!(!c.in_progress());
        assert!(!c.is_new_chat());
        assert_eq!(c.phase(), RedirectPhase::Redirected);

        assert!(c.timer_fired(TimerId(0)).is_empty());
    }

    #[test]
    fn test_redirected_view_does_not_schedule_again() {
        let mut c = armed();
        observe(&mut c, &conversation(Some("abc"), 1), "/", Tier::Premium);
        c.timer_fired(TimerId(0));
        let effects = observe(&mut c, &conversation(Some("abc"), 3), "/", Tier::Premium);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_stale_timer_is_ignored_and_pending_kept() {
        let mut c = armed();
        observe(&mut c, &conversation(Some("abc"), 1), "/", Tier::Premium);
        assert!(c.timer_fired(TimerId(7)).is_empty());
        assert_eq!(c.pending_timer(), Some(TimerId(0)));
        assert!(c.in_progress());
    }

    #[test]
    fn test_unmount_cancels_pending_and_releases_latch() {
        let mut c = armed();
        observe(&mut c, &conversation(Some("abc"), 1), "/", Tier::Premium);

        let effects = c.unmount();
        assert_eq!(effects, vec![RedirectEffect::CancelTimer(TimerId(0))]);
        assert!(!c.in_progress());
        assert_eq!(c.phase(), RedirectPhase::Idle);

        // A late firing after unmount produces no navigation.
        assert!(c.timer_fired(TimerId(0)).is_empty());
    }

    #[test]
    fn test_unmount_without_timer_has_no_effects() {
        let mut c = armed();
        assert!(c.unmount().is_empty());
    }

    #[test]
    fn test_rearm_after_unmount_uses_fresh_timer_id() {
        let mut c = armed();
        observe(&mut c, &conversation(Some("a"), 1), "/", Tier::Premium);
        c.unmount();
        c.arm();
        let effects = observe(&mut c, &conversation(Some("b"), 1), "/", Tier::Premium);
        assert!(effects.contains(&RedirectEffect::ScheduleRedirect {
            timer: TimerId(1),
            delay: REDIRECT_DELAY,
            path: "/chat/b".to_string(),
        }));
    }
}
