//! Local-calendar date-key helpers.
//!
//! Streaks and daily progress are keyed by the user's local calendar day
//! (`YYYY-MM-DD`). All arithmetic happens on `NaiveDate`, never on UTC
//! epoch seconds, so DST shifts cannot skew day counts.

use chrono::{Duration, Local, NaiveDate};

/// Storage/display format of a date key.
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Today's date in the local calendar.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Yesterday's date in the local calendar.
pub fn yesterday() -> NaiveDate {
    today() - Duration::days(1)
}

/// Signed day count `b - a`.
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// `a` plus one calendar day.
pub fn next_day(a: NaiveDate) -> NaiveDate {
    a + Duration::days(1)
}

/// Parse a `YYYY-MM-DD` date key.
pub fn parse_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, DATE_KEY_FORMAT).ok()
}

/// Render a date as a `YYYY-MM-DD` key.
pub fn format_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}
