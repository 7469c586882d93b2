//! # IT Streak Core Library
//!
//! Core business logic for IT Streak, a daily quiz study app: the
//! consecutive-day streak engine with its bounded revival window, the
//! per-day progress tracker, and the push-reminder pipeline (message
//! catalog, selection, slot scheduler). The CLI binary is a thin layer
//! over this crate; the mobile app talks to the same schema through its
//! hosted backend.
//!
//! ## Architecture
//!
//! - **Streak Engine**: pure transitions over (`StreakRecord`, date) plus
//!   storage-backed operations that persist only on change
//! - **Daily Progress**: atomic per-answer counters against a daily goal
//! - **Storage**: SQLite rows behind the narrow [`storage::Store`] port,
//!   TOML-based configuration
//! - **Notify**: static message catalog, deterministic narrowing with a
//!   single random pick, batched dispatch over the push transport
//!
//! ## Key Components
//!
//! - [`StreakRecord`]: streak state machine
//! - [`Database`]: row storage for profiles, streaks, progress, send log
//! - [`run_slot`]: one scheduler invocation for a time-of-day slot

pub mod dates;
pub mod error;
pub mod notify;
pub mod progress;
pub mod storage;
pub mod streak;

pub use error::{ConfigError, CoreError, DatabaseError, Result, TransportError};
pub use notify::{plan_slot, run_slot, DispatchReport, ExpoPushTransport, PushTransport, Slot};
pub use progress::{DailyProgress, GoalStatus, DEFAULT_DAILY_GOAL};
pub use storage::{Config, Database, Profile, PushLogEntry, Store};
pub use streak::{CompletionKind, ReviveStep, StreakRecord, StreakState, MAX_REVIVE_DAYS};
