//! # External Collaborators
//!
//! The chat view only talks to the outside world through the traits in this
//! module. Each trait ships with a small local implementation so the binary
//! runs without any hosted backend:
//!
//! ```text
//! ConversationBackend ── LocalConversations   (~/.charla/chats/*.json)
//! AssistantClient     ── OpenAiClient         (OpenAI-compatible HTTP)
//! ProfileService      ── LocalProfile         (~/.charla/profile.json)
//! Navigator           ── Router               (in-memory history)
//! ConversationListObserver ── ConversationIndex
//! ```

pub mod assistant;
pub mod conversations;
pub mod navigation;
pub mod profile;
pub mod store;

use std::fmt;

pub use assistant::{AssistantClient, OpenAiClient};
pub use conversations::{ConversationBackend, ConversationIndex, ConversationSummary, LocalConversations};
pub use navigation::{ConversationEvents, ConversationListObserver, Navigation, Navigator, Router};
pub use profile::{LocalProfile, ProfileService};

/// Errors reported by collaborator services.
#[derive(Debug)]
pub enum ServiceError {
    /// Service misconfigured (missing API key, bad URL).
    Config(String),
    /// Local storage failure.
    Io(std::io::Error),
    /// Stored or received data could not be decoded.
    Parse(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// Remote service answered with an error status.
    Api { status: u16, message: String },
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Config(msg) => write!(f, "config error: {msg}"),
            ServiceError::Io(e) => write!(f, "storage error: {e}"),
            ServiceError::Parse(msg) => write!(f, "parse error: {msg}"),
            ServiceError::Network(msg) => write!(f, "network error: {msg}"),
            ServiceError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<std::io::Error> for ServiceError {
    fn from(e: std::io::Error) -> Self {
        ServiceError::Io(e)
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        ServiceError::Parse(e.to_string())
    }
}
