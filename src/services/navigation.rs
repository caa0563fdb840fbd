//! # Navigation
//!
//! The address bar of the app. `Router` keeps an in-memory history stack;
//! `replace` swaps the top entry so redirected chats leave no dead back-entry.
//!
//! Also home to the conversation-list notification: instead of a global
//! broadcast, observers register on [`ConversationEvents`].

use std::sync::Arc;

use log::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Push(String),
    Replace(String),
    Back,
}

pub trait Navigator {
    fn current(&self) -> &str;
    fn push(&mut self, path: &str);
    fn replace(&mut self, path: &str);
    /// Go to the previous entry. Returns false when there is none.
    fn back(&mut self) -> bool;

    fn apply(&mut self, navigation: &Navigation) {
        match navigation {
            Navigation::Push(path) => self.push(path),
            Navigation::Replace(path) => self.replace(path),
            Navigation::Back => {
                self.back();
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Router {
    history: Vec<String>,
}

impl Router {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            history: vec![initial.into()],
        }
    }

    pub fn depth(&self) -> usize {
        self.history.len()
    }
}

impl Navigator for Router {
    fn current(&self) -> &str {
        self.history.last().map(String::as_str).unwrap_or("/")
    }

    fn push(&mut self, path: &str) {
        debug!("Navigate push {}", path);
        self.history.push(path.to_string());
    }

    fn replace(&mut self, path: &str) {
        debug!("Navigate replace {}", path);
        match self.history.last_mut() {
            Some(top) => *top = path.to_string(),
            None => self.history.push(path.to_string()),
        }
    }

    fn back(&mut self) -> bool {
        if self.history.len() > 1 {
            self.history.pop();
            debug!("Navigate back to {}", self.current());
            true
        } else {
            false
        }
    }
}

/// Anything that shows the list of saved conversations.
pub trait ConversationListObserver: Send + Sync {
    /// The list may be stale; reload it. No acknowledgment is expected.
    fn refetch_conversations(&self);
}

#[derive(Default, Clone)]
pub struct ConversationEvents {
    observers: Vec<Arc<dyn ConversationListObserver>>,
}

impl ConversationEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Arc<dyn ConversationListObserver>) {
        self.observers.push(observer);
    }

    pub fn refetch(&self) {
        debug!("Conversation list refetch ({} observers)", self.observers.len());
        for observer in &self.observers {
            observer.refetch_conversations();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_push_and_back() {
        let mut router = Router::new("/");
        router.push("/pricing");
        assert_eq!(router.current(), "/pricing");
        assert!(router.back());
        assert_eq!(router.current(), "/");
        assert!(!router.back());
    }

    #[test]
    fn test_replace_keeps_depth() {
        let mut router = Router::new("/");
        router.replace("/chat/abc");
        assert_eq!(router.current(), "/chat/abc");
        assert_eq!(router.depth(), 1);
        assert!(!router.back());
    }

    #[test]
    fn test_apply_dispatches() {
        let mut router = Router::new("/");
        router.apply(&Navigation::Push("/sign-in".into()));
        router.apply(&Navigation::Replace("/pricing".into()));
        assert_eq!(router.depth(), 2);
        router.apply(&Navigation::Back);
        assert_eq!(router.current(), "/");
    }

    struct Counter(AtomicUsize);

    impl ConversationListObserver for Counter {
        fn refetch_conversations(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_refetch_reaches_every_observer() {
        let a = Arc::new(Counter(AtomicUsize::new(0)));
        let b = Arc::new(Counter(AtomicUsize::new(0)));
        let mut events = ConversationEvents::new();
        events.subscribe(a.clone());
        events.subscribe(b.clone());

        events.refetch();
        events.refetch();

        assert_eq!(a.0.load(Ordering::SeqCst), 2);
        assert_eq!(b.0.load(Ordering::SeqCst), 2);
    }
}
