//! # Quota Gate
//!
//! Decides whether an outgoing message may be sent.
//!
//! - Signed out: never allowed, the caller is sent to sign-in.
//! - Premium: always allowed, the counter is left untouched.
//! - Free: the counter is incremented remotely and the message is allowed while
//!   the new count stays at or below the limit.
//!
//! The gate only produces a [`QuotaDecision`]. Navigation and dialog visibility
//! are applied by the reducer in `action.rs`.

use log::{info, warn};

use crate::services::ProfileService;

/// Messages a free account may send per billing period.
pub const FREE_MESSAGE_LIMIT: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaDecision {
    Allowed,
    SignInRequired,
    /// The increment pushed the count above the limit.
    LimitReached { count: u32 },
    /// The counter service failed; treated as not allowed.
    Unavailable(String),
}

impl QuotaDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, QuotaDecision::Allowed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaGate {
    limit: u32,
}

impl Default for QuotaGate {
    fn default() -> Self {
        Self::new(FREE_MESSAGE_LIMIT)
    }
}

impl QuotaGate {
    pub fn new(limit: u32) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Check (and for free accounts, consume) one message of quota.
    ///
    /// Performs at most one counter increment.
    pub async fn check(&self, profile: &dyn ProfileService) -> QuotaDecision {
        let snapshot = profile.snapshot();

        if !snapshot.is_authenticated() {
            info!("Quota check: not signed in");
            return QuotaDecision::SignInRequired;
        }

        if snapshot.is_premium() {
            return QuotaDecision::Allowed;
        }

        match profile.increment_message_count().await {
            Ok(count) if count > self.limit => {
                info!("Quota check: limit reached ({}/{})", count, self.limit);
                QuotaDecision::LimitReached { count }
            }
            Ok(count) => {
                info!("Quota check: allowed ({}/{})", count, self.limit);
                QuotaDecision::Allowed
            }
            Err(e) => {
                warn!("Quota check failed: {}", e);
                QuotaDecision::Unavailable(e.to_string())
            }
        }
    }
}
