//! Persistence layer: SQLite row storage and TOML configuration.
//!
//! The engines depend only on the narrow [`Store`] port; [`Database`] is
//! the rusqlite adapter behind it. Tests run against
//! `Database::open_memory()`.

mod config;
pub mod database;

pub use config::{Config, PushConfig};
pub use database::Database;

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DatabaseError;
use crate::notify::Slot;
use crate::progress::DailyProgress;
use crate::streak::StreakRecord;

/// Returns `~/.config/itstreak[-dev]/` based on ITSTREAK_ENV.
///
/// Set ITSTREAK_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("ITSTREAK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("itstreak-dev")
    } else {
        base_dir.join("itstreak")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Per-user profile row. Owned by the account/settings flow; the core only
/// consumes the goal and notification fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub daily_goal: u32,
    pub notification_enabled: bool,
    /// Preferred reminder time, `HH:MM` local.
    pub notification_time: String,
    pub push_token: Option<String>,
}

impl Profile {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            display_name: None,
            daily_goal: crate::progress::DEFAULT_DAILY_GOAL,
            notification_enabled: true,
            notification_time: "20:00".to_string(),
            push_token: None,
        }
    }
}

/// Append-only record of one sent reminder, used by the 3-day
/// recent-repeat filter and the deadline-slot escalation gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushLogEntry {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDate,
    pub slot: Slot,
    pub message_id: String,
}

impl PushLogEntry {
    pub fn new(
        user_id: impl Into<String>,
        date: NaiveDate,
        slot: Slot,
        message_id: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            date,
            slot,
            message_id: message_id.into(),
        }
    }
}

/// Narrow persistence port the engines are written against.
///
/// All writes are single-row and either atomic (`add_answer`,
/// `add_study_time`) or conflict-ignoring (`add_progress_stub`), so
/// crash/retry from the client cannot corrupt counters.
pub trait Store {
    fn streak(&self, user_id: &str) -> Result<Option<StreakRecord>, DatabaseError>;
    fn save_streak(&self, record: &StreakRecord) -> Result<(), DatabaseError>;

    fn progress(&self, user_id: &str, date: NaiveDate)
        -> Result<Option<DailyProgress>, DatabaseError>;
    /// Create-or-increment today's counters by one answer.
    fn add_answer(
        &self,
        user_id: &str,
        date: NaiveDate,
        correct: bool,
    ) -> Result<DailyProgress, DatabaseError>;
    /// Accumulate study time on the day's row.
    fn add_study_time(
        &self,
        user_id: &str,
        date: NaiveDate,
        seconds: u32,
    ) -> Result<DailyProgress, DatabaseError>;
    /// Insert a zero-activity row unless one already exists for the day.
    fn add_progress_stub(&self, user_id: &str, date: NaiveDate) -> Result<(), DatabaseError>;

    fn profile(&self, user_id: &str) -> Result<Option<Profile>, DatabaseError>;
    fn upsert_profile(&self, profile: &Profile) -> Result<(), DatabaseError>;
    /// Profiles with notifications enabled and a registered push token.
    fn notifiable_profiles(&self) -> Result<Vec<Profile>, DatabaseError>;

    fn log_push(&self, entries: &[PushLogEntry]) -> Result<(), DatabaseError>;
    /// Message ids sent to the user on `since` or later.
    fn recent_message_ids(
        &self,
        user_id: &str,
        since: NaiveDate,
    ) -> Result<Vec<String>, DatabaseError>;
    /// Whether a message for `slot` was logged for the user on `date`.
    fn slot_sent_on(&self, user_id: &str, date: NaiveDate, slot: Slot)
        -> Result<bool, DatabaseError>;
}
