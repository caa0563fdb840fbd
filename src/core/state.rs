//! # Application State
//!
//! Core state for the chat view. Domain logic only, no TUI-specific types.
//! Presentation state (scroll offsets, overlays, toasts) lives in the `tui` module.
//!
//! ```text
//! App
//! ├── conversation: ConversationState   // latest snapshot from the backend
//! ├── profile: UserProfile              // latest snapshot from the profile service
//! ├── address: String                   // current navigation address
//! ├── view: ViewState                   // dialog visibility, pending work
//! ├── redirect: RedirectCoordinator     // new chat → permanent address
//! ├── quota: QuotaGate                  // free-tier message limit
//! ├── routes: Routes                    // sign-in / pricing / chat addresses
//! ├── missing_keys: Vec<String>         // unset required env vars
//! └── status_message: String            // status bar text
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use serde::{Deserialize, Serialize};

use crate::core::config::ResolvedConfig;
use crate::core::quota::QuotaGate;
use crate::core::redirect::RedirectCoordinator;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Snapshot of the conversation owned by the backend.
///
/// `id` stays `None` until the backend has given the conversation a durable identity.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    pub id: Option<String>,
    pub messages: Vec<ChatMessage>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Premium,
}

impl Tier {
    pub fn label(self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Premium => "premium",
        }
    }
}

/// Snapshot of the signed-in account. `user_id == None` means signed out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: Option<String>,
    pub tier: Tier,
    /// Messages sent in the current billing period.
    pub message_count: u32,
}

impl UserProfile {
    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn is_premium(&self) -> bool {
        self.tier == Tier::Premium
    }
}

/// Identifies one mount of the chat view. Background work started under one
/// mount reports back with its id; results carrying an older id are dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MountId(pub u64);

impl MountId {
    pub fn next(self) -> Self {
        MountId(self.0 + 1)
    }
}

/// View-local flags. Created on mount, discarded on unmount.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub mount: MountId,
    pub limit_dialog_visible: bool,
    /// A quota check is in flight for a submitted message.
    pub quota_check_pending: bool,
    /// A message was accepted and the assistant has not answered yet.
    pub awaiting_reply: bool,
    /// Set while the mount's conversation load has not been published yet.
    /// Holds the id the loaded snapshot will carry (`None` for a new chat).
    pub pending_load: Option<Option<String>>,
}

impl ViewState {
    pub fn is_busy(&self) -> bool {
        self.quota_check_pending || self.awaiting_reply
    }

    /// Fresh state for the next mount.
    pub fn remount(&self) -> Self {
        Self {
            mount: self.mount.next(),
            ..Self::default()
        }
    }
}

/// Navigation targets the view knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    pub home: String,
    pub sign_in: String,
    pub pricing: String,
    pub chat_prefix: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            home: "/".to_string(),
            sign_in: "/sign-in".to_string(),
            pricing: "/pricing".to_string(),
            chat_prefix: "/chat/".to_string(),
        }
    }
}

impl Routes {
    pub fn chat(&self, id: &str) -> String {
        format!("{}{}", self.chat_prefix, id)
    }

    /// Returns the conversation id if `address` is a permanent chat address.
    pub fn chat_id<'a>(&self, address: &'a str) -> Option<&'a str> {
        address
            .strip_prefix(self.chat_prefix.as_str())
            .filter(|id| !id.is_empty())
    }

    /// True for addresses that show the chat view (home or a chat address).
    pub fn is_chat_view(&self, address: &str) -> bool {
        address == self.home || self.chat_id(address).is_some()
    }
}

pub struct App {
    pub conversation: ConversationState,
    pub profile: UserProfile,
    pub address: String,
    pub view: ViewState,
    pub redirect: RedirectCoordinator,
    pub quota: QuotaGate,
    pub routes: Routes,
    pub missing_keys: Vec<String>,
    pub status_message: String,
}

impl App {
    /// Mount the chat view at `address`.
    ///
    /// The home address is a new chat, which arms the redirect.
    pub fn new(
        address: String,
        profile: UserProfile,
        quota: QuotaGate,
        redirect: RedirectCoordinator,
        routes: Routes,
        missing_keys: Vec<String>,
    ) -> Self {
        let mut app = Self {
            conversation: ConversationState::default(),
            profile,
            address,
            view: ViewState::default(),
            redirect,
            quota,
            routes,
            missing_keys,
            status_message: String::from("Welcome to Charla!"),
        };
        if app.address == app.routes.home {
            app.redirect.arm();
        }
        app
    }

    pub fn from_config(address: String, profile: UserProfile, config: &ResolvedConfig) -> Self {
        Self::new(
            address,
            profile,
            QuotaGate::new(config.free_message_limit),
            RedirectCoordinator::new(config.redirect_policy, config.redirect_delay),
            config.routes.clone(),
            config.missing_keys(),
        )
    }

    pub fn is_new_chat(&self) -> bool {
        self.redirect.is_new_chat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_app;

    #[test]
    fn test_app_on_home_is_new_chat() {
        let app = test_app("/");
        assert!(app.is_new_chat());
        assert_eq!(app.status_message, "Welcome to Charla!");
        assert!(!app.view.limit_dialog_visible);
    }

    #[test]
    fn test_app_on_chat_address_is_not_new_chat() {
        let app = test_app("/chat/abc123");
        assert!(!app.is_new_chat());
    }

    #[test]
    fn test_routes_chat_id() {
        let routes = Routes::default();
        assert_eq!(routes.chat_id("/chat/abc123"), Some("abc123"));
        assert_eq!(routes.chat_id("/chat/"), None);
        assert_eq!(routes.chat_id("/pricing"), None);
        assert_eq!(routes.chat("xyz"), "/chat/xyz");
    }

    #[test]
    fn test_routes_chat_view() {
        let routes = Routes::default();
        assert!(routes.is_chat_view("/"));
        assert!(routes.is_chat_view("/chat/abc"));
        assert!(!routes.is_chat_view("/sign-in"));
    }

    #[test]
    fn test_chat_message_serializes_lowercase_role() {
        let json = serde_json::to_string(&ChatMessage::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }
}
