//! # Actions
//!
//! Everything that can happen to the chat view becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! The backend published a new snapshot? That's `Action::ConversationChanged(state)`.
//!
//! The `update()` function takes the current state and an action, mutates the
//! state, and returns the side effects to perform. No I/O happens here; the TUI
//! executes the returned [`Effect`]s.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effects
//! ```

use log::{debug, info};

use crate::core::quota::QuotaDecision;
use crate::core::redirect::{RedirectEffect, RedirectSignal, TimerId};
use crate::core::state::{App, ConversationState, MountId, UserProfile};
use crate::services::Navigation;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// User submitted the input buffer.
    Submit(String),
    /// The quota gate finished for a message submitted under `mount`.
    QuotaChecked {
        text: String,
        decision: QuotaDecision,
        profile: UserProfile,
        mount: MountId,
    },
    /// The conversation backend published a new snapshot.
    ConversationChanged(ConversationState),
    /// The conversation backend could not load the mount's conversation.
    ConversationLoadFailed {
        reason: String,
        mount: MountId,
    },
    ReplyFinished {
        mount: MountId,
    },
    ReplyFailed {
        reason: String,
        mount: MountId,
    },
    RedirectTimerFired(TimerId),
    /// The navigator's current address changed.
    AddressChanged(String),
    DismissLimitDialog,
    UpgradeFromLimitDialog,
    OpenConversation(String),
    NewChat,
    NavigateBack,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Run the quota gate for `text`, then report `Action::QuotaChecked`.
    CheckQuota { text: String, mount: MountId },
    /// Hand an accepted message to the conversation backend, then report
    /// `Action::ReplyFinished` or `Action::ReplyFailed`.
    SendMessage { text: String, mount: MountId },
    /// Put a rejected message back into the input box.
    RestoreInput(String),
    Navigate(Navigation),
    /// Make `Some(id)` the backend's active conversation, or start empty.
    LoadConversation(Option<String>),
    Redirect(RedirectEffect),
    Quit,
}

fn redirect_effects(effects: Vec<RedirectEffect>) -> impl Iterator<Item = Effect> {
    effects.into_iter().map(|effect| match effect {
        RedirectEffect::ReplaceAddress(path) => Effect::Navigate(Navigation::Replace(path)),
        other => Effect::Redirect(other),
    })
}

/// Tear the chat view down: cancel the redirect, drop view-local state.
///
/// The view gets a new `MountId`, so results of work started before this
/// point are ignored when they arrive.
fn unmount(app: &mut App) -> Vec<Effect> {
    let effects = redirect_effects(app.redirect.unmount()).collect();
    app.view = app.view.remount();
    app.conversation = ConversationState::default();
    effects
}

/// Bring the chat view up for the current address.
pub fn mount(app: &mut App) -> Vec<Effect> {
    if !app.routes.is_chat_view(&app.address) {
        return Vec::new();
    }
    let id = app.routes.chat_id(&app.address).map(str::to_string);
    if id.is_none() {
        app.redirect.arm();
    }
    app.view.pending_load = Some(id.clone());
    vec![Effect::LoadConversation(id)]
}

/// True when a result reported under `mount` belongs to the current view.
fn is_current(app: &App, mount: MountId, what: &str) -> bool {
    if mount == app.view.mount {
        return true;
    }
    debug!("Dropping stale {} from mount {:?} (now {:?})", what, mount, app.view.mount);
    false
}

pub fn update(app: &mut App, action: Action) -> Vec<Effect> {
    match action {
        Action::Submit(text) => {
            if !app.routes.is_chat_view(&app.address) {
                return Vec::new();
            }
            if app.view.is_busy() {
                app.status_message = "Still waiting on the previous message".to_string();
                return vec![Effect::RestoreInput(text)];
            }
            if app.view.pending_load.is_some() {
                app.status_message = "Still loading the conversation".to_string();
                return vec![Effect::RestoreInput(text)];
            }
            app.view.quota_check_pending = true;
            app.status_message = "Checking message quota...".to_string();
            vec![Effect::CheckQuota {
                text,
                mount: app.view.mount,
            }]
        }

        Action::QuotaChecked {
            text,
            decision,
            profile,
            mount,
        } => {
            // The profile is account-wide, so even a stale check refreshes it.
            app.profile = profile;
            if !is_current(app, mount, "quota decision") {
                return Vec::new();
            }
            app.view.quota_check_pending = false;
            match decision {
                QuotaDecision::Allowed => {
                    app.view.awaiting_reply = true;
                    app.status_message = "Thinking...".to_string();
                    vec![Effect::SendMessage {
                        text,
                        mount: app.view.mount,
                    }]
                }
                QuotaDecision::SignInRequired => {
                    app.status_message = "Sign in to send messages".to_string();
                    vec![
                        Effect::RestoreInput(text),
                        Effect::Navigate(Navigation::Push(app.routes.sign_in.clone())),
                    ]
                }
                QuotaDecision::LimitReached { count } => {
                    info!("Showing limit dialog at count {}", count);
                    app.view.limit_dialog_visible = true;
                    app.status_message = "Message limit reached".to_string();
                    vec![Effect::RestoreInput(text)]
                }
                QuotaDecision::Unavailable(reason) => {
                    app.status_message =
                        format!("Could not check your message quota ({reason}). Press Enter to retry.");
                    vec![Effect::RestoreInput(text)]
                }
            }
        }

        Action::ConversationChanged(conversation) => {
            if let Some(expected) = &app.view.pending_load {
                if conversation.id != *expected {
                    debug!(
                        "Ignoring snapshot for {:?} while loading {:?}",
                        conversation.id, expected
                    );
                    return Vec::new();
                }
                app.view.pending_load = None;
            }
            app.conversation = conversation;
            let signal = RedirectSignal {
                conversation: &app.conversation,
                address: &app.address,
                tier: app.profile.tier,
                routes: &app.routes,
            };
            let effects = app.redirect.observe(&signal);
            redirect_effects(effects).collect()
        }

        Action::ConversationLoadFailed { reason, mount } => {
            if is_current(app, mount, "load failure") {
                app.view.pending_load = None;
                app.status_message = format!("Could not load conversation: {reason}");
            }
            Vec::new()
        }

        Action::ReplyFinished { mount } => {
            if is_current(app, mount, "reply") {
                app.view.awaiting_reply = false;
                app.status_message.clear();
            }
            Vec::new()
        }

        Action::ReplyFailed { reason, mount } => {
            if !is_current(app, mount, "reply failure") {
                return Vec::new();
            }
            app.view.awaiting_reply = false;
            app.status_message = format!("Assistant error: {reason}");
            Vec::new()
        }

        Action::RedirectTimerFired(timer) => redirect_effects(app.redirect.timer_fired(timer)).collect(),

        Action::AddressChanged(address) => {
            if address == app.address {
                return Vec::new();
            }
            let previous = std::mem::replace(&mut app.address, address);
            debug!("Address {} -> {}", previous, app.address);

            // Redirect of the current conversation to its permanent address.
            let same_conversation = app
                .conversation
                .id
                .as_deref()
                .is_some_and(|id| app.routes.chat_id(&app.address) == Some(id));
            if same_conversation {
                return Vec::new();
            }

            let mut effects = unmount(app);
            effects.extend(mount(app));
            effects
        }

        Action::DismissLimitDialog => {
            app.view.limit_dialog_visible = false;
            Vec::new()
        }

        Action::UpgradeFromLimitDialog => {
            app.view.limit_dialog_visible = false;
            vec![Effect::Navigate(Navigation::Push(app.routes.pricing.clone()))]
        }

        Action::OpenConversation(id) => {
            vec![Effect::Navigate(Navigation::Push(app.routes.chat(&id)))]
        }

        Action::NewChat => {
            if app.address == app.routes.home {
                let mut effects = unmount(app);
                effects.extend(mount(app));
                effects
            } else {
                vec![Effect::Navigate(Navigation::Push(app.routes.home.clone()))]
            }
        }

        Action::NavigateBack => vec![Effect::Navigate(Navigation::Back)],

        Action::Quit => {
            let mut effects: Vec<Effect> = redirect_effects(app.redirect.unmount()).collect();
            effects.push(Effect::Quit);
            effects
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::redirect::REDIRECT_DELAY;
    use crate::core::state::{ChatMessage, Tier};
    use crate::services::{Navigator, Router};
    use crate::test_support::test_app;

    /// Executes effects the way the TUI does, with a manually fired timer.
    struct Harness {
        app: App,
        router: Router,
        scheduled: Option<TimerId>,
        navigations: Vec<Navigation>,
        refreshes: usize,
        restored: Vec<String>,
        loads: Vec<Option<String>>,
        sent: Vec<String>,
    }

    impl Harness {
        fn mount(address: &str) -> Self {
            Self {
                app: test_app(address),
                router: Router::new(address),
                scheduled: None,
                navigations: Vec::new(),
                refreshes: 0,
                restored: Vec::new(),
                loads: Vec::new(),
                sent: Vec::new(),
            }
        }

        fn dispatch(&mut self, action: Action) {
            for effect in update(&mut self.app, action) {
                match effect {
                    Effect::Navigate(navigation) => {
                        self.router.apply(&navigation);
                        self.navigations.push(navigation);
                        let address = self.router.current().to_string();
                        self.dispatch(Action::AddressChanged(address));
                    }
                    Effect::Redirect(RedirectEffect::ScheduleRedirect { timer, .. }) => {
                        self.scheduled = Some(timer);
                    }
                    Effect::Redirect(RedirectEffect::CancelTimer(timer)) => {
                        if self.scheduled == Some(timer) {
                            self.scheduled = None;
                        }
                    }
                    Effect::Redirect(RedirectEffect::RefreshConversationList) => self.refreshes += 1,
                    Effect::Redirect(RedirectEffect::ReplaceAddress(_)) => {
                        unreachable!("mapped to Navigate")
                    }
                    Effect::RestoreInput(text) => self.restored.push(text),
                    Effect::LoadConversation(id) => self.loads.push(id),
                    Effect::SendMessage { text, .. } => self.sent.push(text),
                    Effect::CheckQuota { .. } | Effect::Quit => {}
                }
            }
        }

        /// Report a quota decision for the current mount.
        fn decide(&mut self, text: &str, decision: QuotaDecision) {
            self.decide_for(self.app.view.mount, text, decision);
        }

        fn decide_for(&mut self, mount: MountId, text: &str, decision: QuotaDecision) {
            let profile = self.app.profile.clone();
            self.dispatch(Action::QuotaChecked {
                text: text.to_string(),
                decision,
                profile,
                mount,
            });
        }

        fn fire_timer(&mut self) {
            if let Some(timer) = self.scheduled.take() {
                self.dispatch(Action::RedirectTimerFired(timer));
            }
        }
    }

    fn snapshot(id: Option<&str>, messages: usize) -> ConversationState {
        ConversationState {
            id: id.map(str::to_string),
            messages: (0..messages).map(|i| ChatMessage::user(format!("m{i}"))).collect(),
        }
    }

    #[test]
    fn test_new_chat_redirects_exactly_once() {
        let mut h = Harness::mount("/");

        h.dispatch(Action::ConversationChanged(snapshot(Some("abc123"), 1)));
        assert!(h.scheduled.is_some());
        assert_eq!(h.refreshes, 1);

        for n in 2..5 {
            h.dispatch(Action::ConversationChanged(snapshot(Some("abc123"), n)));
        }
        assert_eq!(h.refreshes, 1);

        h.fire_timer();
        assert_eq!(
            h.navigations,
            vec![Navigation::Replace("/chat/abc123".to_string())]
        );
        assert_eq!(h.router.current(), "/chat/abc123");
        assert_eq!(h.router.depth(), 1);
        assert_eq!(h.app.address, "/chat/abc123");
        assert!(!h.app.is_new_chat());
        // The redirect keeps the conversation on screen.
        assert_eq!(h.app.conversation.messages.len(), 4);
        assert!(h.loads.is_empty());
    }

    #[test]
    fn test_quit_with_pending_timer_never_navigates() {
        let mut h = Harness::mount("/");
        h.dispatch(Action::ConversationChanged(snapshot(Some("abc123"), 1)));
        let pending = h.scheduled.expect("scheduled");

        h.dispatch(Action::Quit);
        assert!(h.scheduled.is_none());

        // A timer that slipped through still does nothing.
        h.dispatch(Action::RedirectTimerFired(pending));
        assert!(h.navigations.is_empty());
    }

    #[test]
    fn test_leaving_chat_view_cancels_redirect() {
        let mut h = Harness::mount("/");
        h.dispatch(Action::ConversationChanged(snapshot(Some("abc123"), 1)));
        let pending = h.scheduled.expect("scheduled");

        h.decide("x", QuotaDecision::SignInRequired);
        assert!(h.scheduled.is_none());
        h.dispatch(Action::RedirectTimerFired(pending));
        assert_eq!(h.navigations, vec![Navigation::Push("/sign-in".to_string())]);
    }

    #[test]
    fn test_free_user_is_not_redirected() {
        let mut h = Harness::mount("/");
        h.app.profile.tier = Tier::Free;
        h.dispatch(Action::ConversationChanged(snapshot(Some("abc123"), 1)));
        assert!(h.scheduled.is_none());
        assert_eq!(h.refreshes, 0);
    }

    #[test]
    fn test_submit_runs_quota_check_and_blocks_overlap() {
        let mut app = test_app("/");
        assert_eq!(
            update(&mut app, Action::Submit("hi".into())),
            vec![Effect::CheckQuota {
                text: "hi".into(),
                mount: MountId(0),
            }]
        );
        assert_eq!(
            update(&mut app, Action::Submit("again".into())),
            vec![Effect::RestoreInput("again".into())]
        );
    }

    #[test]
    fn test_allowed_sends_message() {
        let mut h = Harness::mount("/");
        h.dispatch(Action::Submit("hi".into()));
        h.decide("hi", QuotaDecision::Allowed);
        assert_eq!(h.sent, vec!["hi".to_string()]);
        assert!(h.app.view.awaiting_reply);

        h.dispatch(Action::ReplyFinished {
            mount: h.app.view.mount,
        });
        assert!(!h.app.view.is_busy());
    }

    #[test]
    fn test_limit_reached_shows_dialog_and_keeps_text() {
        let mut h = Harness::mount("/");
        h.dispatch(Action::Submit("fourth".into()));
        h.decide("fourth", QuotaDecision::LimitReached { count: 4 });
        assert!(h.app.view.limit_dialog_visible);
        assert_eq!(h.restored, vec!["fourth".to_string()]);
        assert!(h.sent.is_empty());
        assert!(h.navigations.is_empty());
    }

    #[test]
    fn test_dismiss_dialog_never_navigates() {
        let mut h = Harness::mount("/");
        h.app.view.limit_dialog_visible = true;
        h.dispatch(Action::DismissLimitDialog);
        assert!(!h.app.view.limit_dialog_visible);
        assert!(h.navigations.is_empty());
    }

    #[test]
    fn test_upgrade_navigates_to_pricing_and_hides_dialog() {
        let mut h = Harness::mount("/");
        h.app.view.limit_dialog_visible = true;
        h.dispatch(Action::UpgradeFromLimitDialog);
        assert!(!h.app.view.limit_dialog_visible);
        assert_eq!(h.navigations, vec![Navigation::Push("/pricing".to_string())]);
        assert_eq!(h.app.address, "/pricing");
    }

    #[test]
    fn test_quota_unavailable_sets_retry_notice() {
        let mut app = test_app("/");
        update(&mut app, Action::Submit("hi".into()));
        let profile = app.profile.clone();
        let mount = app.view.mount;
        let effects = update(
            &mut app,
            Action::QuotaChecked {
                text: "hi".into(),
                decision: QuotaDecision::Unavailable("network error".into()),
                profile,
                mount,
            },
        );
        assert_eq!(effects, vec![Effect::RestoreInput("hi".into())]);
        assert!(app.status_message.contains("retry"));
        assert!(!app.view.limit_dialog_visible);
        assert!(!app.view.is_busy());
    }

    #[test]
    fn test_back_from_route_page_remounts_new_chat() {
        let mut h = Harness::mount("/");
        h.dispatch(Action::UpgradeFromLimitDialog);
        assert!(!h.app.is_new_chat());

        h.dispatch(Action::NavigateBack);
        assert_eq!(h.app.address, "/");
        assert!(h.app.is_new_chat());
        assert_eq!(h.loads, vec![None]);
    }

    #[test]
    fn test_open_conversation_loads_it() {
        let mut h = Harness::mount("/");
        h.dispatch(Action::OpenConversation("xyz".into()));
        assert_eq!(h.app.address, "/chat/xyz");
        assert_eq!(h.loads, vec![Some("xyz".to_string())]);
        assert!(!h.app.is_new_chat());
    }

    #[test]
    fn test_new_chat_on_home_resets_conversation() {
        let mut h = Harness::mount("/");
        h.app.profile.tier = Tier::Free;
        h.dispatch(Action::ConversationChanged(snapshot(Some("a"), 2)));
        h.dispatch(Action::NewChat);
        assert!(h.app.conversation.messages.is_empty());
        assert_eq!(h.loads, vec![None]);
        assert!(h.app.is_new_chat());
    }

    #[test]
    fn test_submit_ignored_on_route_page() {
        let mut app = test_app("/pricing");
        assert!(update(&mut app, Action::Submit("hi".into())).is_empty());
    }

    #[test]
    fn test_schedule_uses_configured_delay() {
        let mut app = test_app("/");
        let effects = update(&mut app, Action::ConversationChanged(snapshot(Some("q"), 1)));
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::Redirect(RedirectEffect::ScheduleRedirect { delay, .. }) if *delay == REDIRECT_DELAY
        )));
    }
    #[test]
    fn test_quota_decision_from_previous_mount_is_dropped() {
        let mut h = Harness::mount("/chat/old");
        h.dispatch(Action::Submit("for old".into()));
        let old = h.app.view.mount;

        h.dispatch(Action::NewChat);
        assert_eq!(h.app.address, "/");
        assert_ne!(h.app.view.mount, old);

        h.decide_for(old, "for old", QuotaDecision::Allowed);
        assert!(h.sent.is_empty());
        assert!(h.restored.is_empty());
        assert!(!h.app.view.is_busy());
    }

    #[test]
    fn test_reply_from_previous_mount_keeps_new_reply_pending() {
        let mut h = Harness::mount("/");
        h.dispatch(Action::Submit("a".into()));
        h.decide("a", QuotaDecision::Allowed);
        let old = h.app.view.mount;

        h.dispatch(Action::NewChat);
        h.dispatch(Action::ConversationChanged(snapshot(None, 0)));
        h.dispatch(Action::Submit("b".into()));
        h.decide("b", QuotaDecision::Allowed);
        assert_eq!(h.sent, vec!["a".to_string(), "b".to_string()]);

        h.dispatch(Action::ReplyFinished { mount: old });
        assert!(h.app.view.awaiting_reply);

        h.dispatch(Action::Submit("c".into()));
        assert_eq!(h.restored, vec!["c".to_string()]);

        h.dispatch(Action::ReplyFinished {
            mount: h.app.view.mount,
        });
        assert!(!h.app.view.is_busy());
    }

    #[test]
    fn test_late_limit_decision_on_route_page_shows_no_dialog() {
        let mut h = Harness::mount("/");
        h.dispatch(Action::Submit("x".into()));
        let old = h.app.view.mount;

        h.dispatch(Action::UpgradeFromLimitDialog);
        assert_eq!(h.app.address, "/pricing");

        h.decide_for(old, "x", QuotaDecision::LimitReached { count: 4 });
        assert!(!h.app.view.limit_dialog_visible);
        assert!(h.restored.is_empty());
    }

    #[test]
    fn test_snapshots_of_previous_conversation_ignored_until_load_lands() {
        let mut h = Harness::mount("/");
        h.dispatch(Action::ConversationChanged(snapshot(Some("old"), 1)));
        h.dispatch(Action::NewChat);
        assert!(h.scheduled.is_none());

        // The old conversation's reply arrives before the empty chat is published.
        h.dispatch(Action::ConversationChanged(snapshot(Some("old"), 2)));
        assert!(h.app.conversation.messages.is_empty());
        assert!(h.scheduled.is_none());

        h.dispatch(Action::ConversationChanged(snapshot(None, 0)));
        assert!(h.app.view.pending_load.is_none());

        h.dispatch(Action::ConversationChanged(snapshot(Some("new"), 1)));
        assert!(h.scheduled.is_some());
        h.fire_timer();
        assert_eq!(h.router.current(), "/chat/new");
    }

    #[test]
    fn test_submit_waits_for_load_and_failed_load_releases_it() {
        let mut h = Harness::mount("/");
        h.dispatch(Action::NewChat);
        h.dispatch(Action::Submit("early".into()));
        assert_eq!(h.restored, vec!["early".to_string()]);

        h.dispatch(Action::ConversationLoadFailed {
            reason: "parse error".into(),
            mount: h.app.view.mount,
        });
        assert!(h.app.view.pending_load.is_none());
        assert!(h.app.status_message.contains("Could not load"));

        h.dispatch(Action::Submit("again".into()));
        assert!(h.app.view.quota_check_pending);
    }
}
