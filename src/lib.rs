//! Charla library exports for testing

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub mod core;
pub mod services;
pub mod tui;

#[cfg(test)]
pub mod test_support;

/// Which accounts get moved to a conversation's permanent address automatically.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RedirectPolicy {
    #[default]
    PremiumOnly,
    Everyone,
}
