//! # Conversation Store
//!
//! Holds the active conversation and publishes every change through a
//! `tokio::sync::watch` channel, which the chat view subscribes to.
//!
//! A new conversation gets its id as soon as the first message is added, but
//! it is only written to `~/.charla/chats/<id>.json` once the assistant has
//! answered. Lists read from disk therefore trail the in-memory snapshot.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::core::state::{ChatMessage, ConversationState, Role};
use crate::services::navigation::ConversationListObserver;
use crate::services::store::{atomic_write_json, read_json};
use crate::services::{AssistantClient, ServiceError};

#[async_trait]
pub trait ConversationBackend: Send + Sync {
    /// Subscribe to snapshots of the active conversation.
    fn subscribe(&self) -> watch::Receiver<ConversationState>;

    /// Make `id` the active conversation, or start an empty one for `None`.
    async fn open(&self, id: Option<&str>) -> Result<(), ServiceError>;

    /// Add a user message, wait for the assistant's reply, and store the result.
    async fn send(&self, text: String) -> Result<(), ServiceError>;
}

/// On-disk shape of `chats/<id>.json`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StoredConversation {
    pub id: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub messages: Vec<ChatMessage>,
}

pub fn new_conversation_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn conversation_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{id}.json"))
}

pub struct LocalConversations {
    dir: PathBuf,
    assistant: Arc<dyn AssistantClient>,
    state: watch::Sender<ConversationState>,
}

impl LocalConversations {
    pub fn new(dir: PathBuf, assistant: Arc<dyn AssistantClient>) -> Self {
        let (state, _) = watch::channel(ConversationState::default());
        Self {
            dir,
            assistant,
            state,
        }
    }

    fn persist(&self, conversation: &ConversationState) -> Result<(), ServiceError> {
        let Some(id) = conversation.id.as_deref() else {
            return Ok(());
        };
        let path = conversation_path(&self.dir, id);
        let now = Utc::now().timestamp();
        let created_at = read_json::<StoredConversation>(&path)
            .ok()
            .flatten()
            .map(|c| c.created_at)
            .unwrap_or(now);
        let stored = StoredConversation {
            id: id.to_string(),
            created_at,
            updated_at: now,
            messages: conversation.messages.clone(),
        };
        atomic_write_json(&path, &stored)?;
        debug!("Conversation saved: {}", id);
        Ok(())
    }
}

#[async_trait]
impl ConversationBackend for LocalConversations {
    fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.state.subscribe()
    }

    async fn open(&self, id: Option<&str>) -> Result<(), ServiceError> {
        let next = match id {
            None => ConversationState::default(),
            Some(id) => {
                let path = conversation_path(&self.dir, id);
                match read_json::<StoredConversation>(&path)? {
                    Some(stored) => {
                        info!("Opened conversation {} ({} messages)", id, stored.messages.len());
                        ConversationState {
                            id: Some(stored.id),
                            messages: stored.messages,
                        }
                    }
                    None => {
                        warn!("Conversation {} not found, starting empty", id);
                        ConversationState {
                            id: Some(id.to_string()),
                            messages: Vec::new(),
                        }
                    }
                }
            }
        };
        self.state.send_replace(next);
        Ok(())
    }

    async fn send(&self, text: String) -> Result<(), ServiceError> {
        self.state.send_modify(|conversation| {
            conversation.id.get_or_insert_with(new_conversation_id);
            conversation.messages.push(ChatMessage::user(text));
        });
        let snapshot = self.state.borrow().clone();

        let reply = self.assistant.complete(&snapshot.messages).await?;

        // The user may have switched conversations while waiting.
        let applied = self.state.send_if_modified(|conversation| {
            if conversation.id == snapshot.id {
                conversation.messages.push(ChatMessage::assistant(reply));
                true
            } else {
                false
            }
        });
        if !applied {
            debug!("Dropping reply for inactive conversation {:?}", snapshot.id);
            return Ok(());
        }

        let latest = self.state.borrow().clone();
        self.persist(&latest)
    }
}

// ============================================================================
// Conversation Index
// ============================================================================

/// One row in the conversation list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub updated_at: i64,
    pub message_count: usize,
}

/// Derive a title from the first user message.
/// Returns the first line, truncated to 60 chars.
pub fn derive_title(messages: &[ChatMessage]) -> String {
    let Some(first) = messages.iter().find(|m| m.role == Role::User) else {
        return "Untitled".to_string();
    };
    let first_line = first.content.lines().next().unwrap_or("").trim();
    if first_line.chars().count() > 60 {
        let head: String = first_line.chars().take(57).collect();
        return format!("{head}...");
    }
    first_line.to_string()
}

/// Read every stored conversation in `dir`, most recently updated first.
pub fn list_conversations(dir: &Path) -> Vec<ConversationSummary> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut summaries: Vec<ConversationSummary> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .filter_map(|path| match read_json::<StoredConversation>(&path) {
            Ok(Some(stored)) => Some(ConversationSummary {
                title: derive_title(&stored.messages),
                message_count: stored.messages.len(),
                updated_at: stored.updated_at,
                id: stored.id,
            }),
            Ok(None) => None,
            Err(e) => {
                warn!("Skipping unreadable conversation {}: {}", path.display(), e);
                None
            }
        })
        .collect();
    summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    summaries
}

/// Cached conversation list, reloaded whenever a refetch is requested.
pub struct ConversationIndex {
    dir: PathBuf,
    entries: Mutex<Vec<ConversationSummary>>,
}

impl ConversationIndex {
    pub fn new(dir: PathBuf) -> Self {
        let entries = list_conversations(&dir);
        Self {
            dir,
            entries: Mutex::new(entries),
        }
    }

    pub fn entries(&self) -> Vec<ConversationSummary> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn reload(&self) {
        let fresh = list_conversations(&self.dir);
        debug!("Conversation index reloaded: {} entries", fresh.len());
        *self.entries.lock().unwrap_or_else(|e| e.into_inner()) = fresh;
    }
}

impl ConversationListObserver for ConversationIndex {
    fn refetch_conversations(&self) {
        self.reload();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{EchoAssistant, FailingAssistant};

    fn backend(dir: &Path) -> LocalConversations {
        LocalConversations::new(dir.to_path_buf(), Arc::new(EchoAssistant))
    }

    #[test]
    fn test_derive_title_from_first_user_message() {
        let messages = vec![ChatMessage::user("What is an ETF?"), ChatMessage::assistant("...")];
        assert_eq!(derive_title(&messages), "What is an ETF?");
    }

    #[test]
    fn test_derive_title_truncates_long_messages() {
        let long = "é".repeat(80);
        let title = derive_title(&[ChatMessage::user(long)]);
        assert_eq!(title.chars().count(), 60);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn test_derive_title_no_user_messages() {
        assert_eq!(derive_title(&[]), "Untitled");
    }

    #[tokio::test]
    async fn test_send_assigns_id_and_publishes_reply() {
        let dir = tempfile::tempdir().unwrap();
        let backend = backend(dir.path());
        let rx = backend.subscribe();

        backend.send("hello".to_string()).await.unwrap();

        let state = rx.borrow().clone();
        let id = state.id.clone().expect("id assigned");
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1], ChatMessage::assistant("echo: hello"));
        assert!(conversation_path(dir.path(), &id).exists());
    }

    #[tokio::test]
    async fn test_failed_reply_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalConversations::new(dir.path().to_path_buf(), Arc::new(FailingAssistant));
        let rx = backend.subscribe();

        assert!(backend.send("hello".to_string()).await.is_err());

        let state = rx.borrow().clone();
        assert!(state.id.is_some());
        assert_eq!(state.messages, vec![ChatMessage::user("hello")]);
        assert!(list_conversations(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_open_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let first = backend(dir.path());
        first.send("hi".to_string()).await.unwrap();
        let id = first.subscribe().borrow().id.clone().unwrap();

        let second = backend(dir.path());
        second.open(Some(&id)).await.unwrap();
        let state = second.subscribe().borrow().clone();
        assert_eq!(state.id.as_deref(), Some(id.as_str()));
        assert_eq!(state.messages.len(), 2);

        second.open(None).await.unwrap();
        assert_eq!(second.subscribe().borrow().clone(), ConversationState::default());
    }

    #[tokio::test]
    async fn test_index_reloads_on_refetch() {
        let dir = tempfile::tempdir().unwrap();
        let index = ConversationIndex::new(dir.path().to_path_buf());
        assert!(index.entries().is_empty());

        backend(dir.path()).send("first question".to_string()).await.unwrap();
        assert!(index.entries().is_empty());

        index.refetch_conversations();
        let entries = index.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "first question");
        assert_eq!(entries[0].message_count, 2);
    }
}
