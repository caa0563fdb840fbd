//! # Profile Service
//!
//! Account identity, subscription tier and the per-period message counter.
//!
//! `LocalProfile` keeps the account in `~/.charla/profile.json`. The counter is
//! scoped to a calendar month; the first increment in a new month starts
//! over at 1.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::core::state::{Tier, UserProfile};
use crate::services::ServiceError;
use crate::services::store::{atomic_write_json, read_json};

#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Current account snapshot.
    fn snapshot(&self) -> UserProfile;

    /// Atomically add one message to the current period; returns the new count.
    async fn increment_message_count(&self) -> Result<u32, ServiceError>;
}

/// On-disk shape of `profile.json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProfileRecord {
    pub user_id: Option<String>,
    #[serde(default)]
    pub tier: Tier,
    #[serde(default)]
    pub message_count: u32,
    /// Billing period as `YYYY-MM`.
    #[serde(default)]
    pub period: String,
}

impl ProfileRecord {
    fn to_profile(&self) -> UserProfile {
        UserProfile {
            user_id: self.user_id.clone(),
            tier: self.tier,
            message_count: self.message_count,
        }
    }
}

pub fn billing_period(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

pub struct LocalProfile {
    path: PathBuf,
    record: Mutex<ProfileRecord>,
    today: fn() -> NaiveDate,
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

impl LocalProfile {
    /// Open the profile at `path`, creating a signed-in free account if none exists.
    pub fn open(path: &Path) -> Result<Self, ServiceError> {
        Self::open_with_clock(path, utc_today)
    }

    pub fn open_with_clock(path: &Path, today: fn() -> NaiveDate) -> Result<Self, ServiceError> {
        let record = match read_json::<ProfileRecord>(path)? {
            Some(record) => {
                debug!("Loaded profile from {}", path.display());
                record
            }
            None => {
                let record = ProfileRecord {
                    user_id: Some(uuid::Uuid::new_v4().to_string()),
                    tier: Tier::Free,
                    message_count: 0,
                    period: billing_period(today()),
                };
                atomic_write_json(path, &record)?;
                info!("Created local profile at {}", path.display());
                record
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            record: Mutex::new(record),
            today,
        })
    }
}

#[async_trait]
impl ProfileService for LocalProfile {
    fn snapshot(&self) -> UserProfile {
        let record = self.record.lock().unwrap_or_else(|e| e.into_inner());
        let mut profile = record.to_profile();
        if record.period != billing_period((self.today)()) {
            profile.message_count = 0;
        }
        profile
    }

    async fn increment_message_count(&self) -> Result<u32, ServiceError> {
        let mut record = self.record.lock().unwrap_or_else(|e| e.into_inner());
        let mut next = record.clone();
        let period = billing_period((self.today)());
        if next.period != period {
            debug!("New billing period {} (was {})", period, next.period);
            next.period = period;
            next.message_count = 0;
        }
        next.message_count += 1;

        // Only commit in memory once the write succeeded.
        if let Err(e) = atomic_write_json(&self.path, &next) {
            warn!("Failed to persist message count: {}", e);
            return Err(ServiceError::Io(e));
        }
        *record = next;
        Ok(record.message_count)
    }
}
