//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;

use crate::core::quota::QuotaGate;
use crate::core::redirect::RedirectCoordinator;
use crate::core::state::{App, ChatMessage, Routes, Tier, UserProfile};
use crate::services::{AssistantClient, ProfileService, ServiceError};

/// In-memory profile that counts increments.
pub struct FakeProfile {
    profile: Mutex<UserProfile>,
    increments: AtomicU32,
    fail: bool,
}

impl FakeProfile {
    pub fn signed_in(tier: Tier, message_count: u32) -> Self {
        Self {
            profile: Mutex::new(UserProfile {
                user_id: Some("user-1".to_string()),
                tier,
                message_count,
            }),
            increments: AtomicU32::new(0),
            fail: false,
        }
    }

    pub fn signed_out(tier: Tier) -> Self {
        let fake = Self::signed_in(tier, 0);
        fake.profile.lock().unwrap().user_id = None;
        fake
    }

    /// Every increment fails with a network error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn increments(&self) -> u32 {
        self.increments.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileService for FakeProfile {
    fn snapshot(&self) -> UserProfile {
        self.profile.lock().unwrap().clone()
    }

    async fn increment_message_count(&self) -> Result<u32, ServiceError> {
        self.increments.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ServiceError::Network("connection refused".to_string()));
        }
        let mut profile = self.profile.lock().unwrap();
        profile.message_count += 1;
        Ok(profile.message_count)
    }
}

/// Replies with the last message prefixed by `echo: `.
pub struct EchoAssistant;

#[async_trait]
impl AssistantClient for EchoAssistant {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ServiceError> {
        let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
        Ok(format!("echo: {last}"))
    }
}

pub struct FailingAssistant;

#[async_trait]
impl AssistantClient for FailingAssistant {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, ServiceError> {
        Err(ServiceError::Api {
            status: 503,
            message: "overloaded".to_string(),
        })
    }
}

pub fn premium_profile() -> UserProfile {
    UserProfile {
        user_id: Some("user-1".to_string()),
        tier: Tier::Premium,
        message_count: 0,
    }
}

/// Creates a test App mounted at `address` for a premium user.
pub fn test_app(address: &str) -> App {
    App::new(
        address.to_string(),
        premium_profile(),
        QuotaGate::default(),
        RedirectCoordinator::default(),
        Routes::default(),
        vec!["OPENAI_API_KEY".to_string()],
    )
}
