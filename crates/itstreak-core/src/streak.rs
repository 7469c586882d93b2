//! Consecutive-day streak engine with a bounded revival window.
//!
//! A streak counts consecutive local calendar days with completed study
//! activity. When a day is missed the streak lapses; for up to
//! [`MAX_REVIVE_DAYS`] missed days it can be revived one day at a time
//! (each revival grant walks `last_completed_date` forward by one day),
//! after which it is permanently lost.
//!
//! Transitions are pure functions over (`StreakRecord`, `today`) so they
//! can be tested with fixed dates; the storage-backed operations at the
//! bottom fetch, apply, and persist only on change.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::dates;
use crate::error::Result;
use crate::storage::Store;

/// A lapsed streak can only be revived while the gap since
/// `last_completed_date` is at most this many whole missed days.
pub const MAX_REVIVE_DAYS: i64 = 3;

/// Per-user streak state.
///
/// Invariants: `longest_streak >= current_streak`; `current_streak > 0`
/// implies `last_completed_date` is today or yesterday (after reconcile);
/// `current_streak == 0 && previous_streak > 0` means the user is inside
/// the revival window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakRecord {
    pub user_id: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub previous_streak: u32,
    pub last_completed_date: Option<NaiveDate>,
}

/// Where a record sits in the streak lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakState {
    /// No activity recorded yet.
    New,
    /// Streak is alive (completed today or yesterday).
    Active,
    /// Streak lapsed but is still inside the revival window.
    LapsedRevivable,
    /// Streak lapsed beyond the revival window and is lost.
    LapsedExpired,
}

/// What a completion call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionKind {
    /// First ever completion for this user.
    Started,
    /// Continued from yesterday.
    Extended,
    /// Streak was broken; started over at 1.
    Restarted,
    /// Today was already recorded; nothing changed.
    AlreadyRecorded,
}

/// What a single revival grant did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviveStep {
    /// Not inside a revival window; nothing changed.
    Ineligible,
    /// Filled one missed day; more grants are needed.
    Filled(NaiveDate),
    /// Last missed day filled; streak fully restored.
    Restored,
}

impl StreakRecord {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            current_streak: 0,
            longest_streak: 0,
            previous_streak: 0,
            last_completed_date: None,
        }
    }

    /// Whole missed days: gap between `last_completed_date` and yesterday.
    /// `Some(0)` means nothing was missed (completed today or yesterday).
    fn missed_days(&self, today: NaiveDate) -> Option<i64> {
        self.last_completed_date
            .map(|last| dates::days_between(last, today - Duration::days(1)))
    }

    /// Classify the record without mutating it.
    pub fn state(&self, today: NaiveDate) -> StreakState {
        let missed = match self.missed_days(today) {
            Some(m) => m,
            None => return StreakState::New,
        };
        if self.current_streak > 0 {
            if missed <= 0 {
                return StreakState::Active;
            }
            if missed <= MAX_REVIVE_DAYS {
                return StreakState::LapsedRevivable;
            }
            return StreakState::LapsedExpired;
        }
        if self.previous_streak > 0 && missed > 0 && missed <= MAX_REVIVE_DAYS {
            return StreakState::LapsedRevivable;
        }
        StreakState::LapsedExpired
    }

    /// The streak a pure reader sees: the stored value while active, 0 once
    /// the record has lapsed (even before a reconcile has persisted that).
    pub fn effective_streak(&self, today: NaiveDate) -> u32 {
        match self.state(today) {
            StreakState::Active => self.current_streak,
            _ => 0,
        }
    }

    /// Lapse check: if the streak is alive on paper but neither today nor
    /// yesterday is completed, zero it, keeping the old value in
    /// `previous_streak` while the gap is still within [`MAX_REVIVE_DAYS`].
    /// Also clears a `previous_streak` whose window has since expired.
    ///
    /// Idempotent. Returns `true` if the record changed.
    pub fn apply_lapse(&mut self, today: NaiveDate) -> bool {
        let missed = match self.missed_days(today) {
            Some(m) => m,
            None => return false,
        };
        if self.current_streak > 0 {
            if missed <= 0 {
                return false;
            }
            self.previous_streak = if missed <= MAX_REVIVE_DAYS {
                self.current_streak
            } else {
                0
            };
            self.current_streak = 0;
            return true;
        }
        if self.previous_streak > 0 && (missed <= 0 || missed > MAX_REVIVE_DAYS) {
            self.previous_streak = 0;
            return true;
        }
        false
    }

    /// Record today's completed study session.
    ///
    /// Calling this twice on the same day is a no-op the second time.
    pub fn apply_completion(&mut self, today: NaiveDate) -> CompletionKind {
        let yesterday = today - Duration::days(1);
        let kind = match self.last_completed_date {
            Some(last) if last == today => return CompletionKind::AlreadyRecorded,
            Some(last) if last == yesterday => {
                self.current_streak += 1;
                CompletionKind::Extended
            }
            Some(_) => {
                self.current_streak = 1;
                CompletionKind::Restarted
            }
            None => {
                self.current_streak = 1;
                CompletionKind::Started
            }
        };
        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.last_completed_date = Some(today);
        self.previous_streak = 0;
        kind
    }

    /// Consume one revival grant.
    ///
    /// On the last missed day the streak is fully restored; otherwise one
    /// missed day is filled by advancing `last_completed_date`, and the
    /// returned date needs a zero-activity progress stub so calendar views
    /// show it as studied.
    pub fn apply_revive(&mut self, today: NaiveDate) -> ReviveStep {
        if self.previous_streak == 0 || self.current_streak > 0 {
            return ReviveStep::Ineligible;
        }
        let missed = match self.missed_days(today) {
            Some(m) => m,
            None => return ReviveStep::Ineligible,
        };
        if missed <= 0 || missed > MAX_REVIVE_DAYS {
            return ReviveStep::Ineligible;
        }
        if missed == 1 {
            self.current_streak = self.previous_streak;
            self.longest_streak = self.longest_streak.max(self.current_streak);
            self.previous_streak = 0;
            self.last_completed_date = Some(today - Duration::days(1));
            return ReviveStep::Restored;
        }
        // last_completed_date is Some here, missed >= 2
        let filled = dates::next_day(self.last_completed_date.unwrap_or(today));
        self.last_completed_date = Some(filled);
        ReviveStep::Filled(filled)
    }

    /// Revival grants still needed to fully restore the streak, 0 when not
    /// inside a revival window.
    pub fn revive_days_remaining(&self, today: NaiveDate) -> u32 {
        if self.current_streak > 0 || self.previous_streak == 0 {
            return 0;
        }
        match self.missed_days(today) {
            Some(m) if m > 0 && m <= MAX_REVIVE_DAYS => m as u32,
            _ => 0,
        }
    }
}

/// Read the user's streak, persisting any pending lapse transition.
///
/// This is the explicit reconcile step: plain snapshots (e.g. the
/// notification scheduler) use [`StreakRecord::effective_streak`] instead
/// and never write.
pub fn reconcile<S: Store>(store: &S, user_id: &str, today: NaiveDate) -> Result<StreakRecord> {
    let mut record = store
        .streak(user_id)?
        .unwrap_or_else(|| StreakRecord::new(user_id));
    if record.apply_lapse(today) {
        store.save_streak(&record)?;
    }
    Ok(record)
}

/// Quiz-completion boundary: record that today's session finished.
pub fn record_completion<S: Store>(
    store: &S,
    user_id: &str,
    today: NaiveDate,
) -> Result<(StreakRecord, CompletionKind)> {
    let mut record = store
        .streak(user_id)?
        .unwrap_or_else(|| StreakRecord::new(user_id));
    let kind = record.apply_completion(today);
    if kind != CompletionKind::AlreadyRecorded {
        store.save_streak(&record)?;
    }
    Ok((record, kind))
}

/// Revival-grant boundary: consume one earned revival (e.g. a rewarded ad).
///
/// A partial revival writes the filled day's zero-activity progress stub
/// before the streak row so a failed streak write never loses the stub;
/// the stub insert ignores conflicts and never overwrites real progress.
pub fn revive<S: Store>(
    store: &S,
    user_id: &str,
    today: NaiveDate,
) -> Result<(StreakRecord, ReviveStep)> {
    let mut record = match store.streak(user_id)? {
        Some(record) => record,
        None => return Ok((StreakRecord::new(user_id), ReviveStep::Ineligible)),
    };
    if record.apply_lapse(today) {
        store.save_streak(&record)?;
    }
    let step = record.apply_revive(today);
    match step {
        ReviveStep::Ineligible => {}
        ReviveStep::Filled(date) => {
            store.add_progress_stub(user_id, date)?;
            store.save_streak(&record)?;
        }
        ReviveStep::Restored => {
            store.save_streak(&record)?;
        }
    }
    Ok((record, step))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(key: &str) -> NaiveDate {
        crate::dates::parse_key(key).unwrap()
    }

    fn active(streak: u32, last: &str) -> StreakRecord {
        StreakRecord {
            user_id: "u1".into(),
            current_streak: streak,
            longest_streak: streak,
            previous_streak: 0,
            last_completed_date: Some(d(last)),
        }
    }

    #[test]
    fn first_completion_starts_at_one() {
        let mut record = StreakRecord::new("u1");
        let kind = record.apply_completion(d("2025-05-10"));
        assert_eq!(kind, CompletionKind::Started);
        assert_eq!(record.current_streak, 1);
        assert_eq!(record.longest_streak, 1);
        assert_eq!(record.last_completed_date, Some(d("2025-05-10")));
    }

    #[test]
    fn same_day_completion_is_idempotent() {
        let mut record = active(4, "2025-05-10");
        assert_eq!(
            record.apply_completion(d("2025-05-10")),
            CompletionKind::AlreadyRecorded
        );
        assert_eq!(record.current_streak, 4);
    }

    #[test]
    fn consecutive_day_extends() {
        let mut record = active(4, "2025-05-10");
        assert_eq!(record.apply_completion(d("2025-05-11")), CompletionKind::Extended);
        assert_eq!(record.current_streak, 5);
        assert_eq!(record.longest_streak, 5);
    }

    #[test]
    fn longest_streak_is_monotone_across_resets() {
        let mut record = active(8, "2025-05-10");
        assert_eq!(record.apply_completion(d("2025-05-14")), CompletionKind::Restarted);
        assert_eq!(record.current_streak, 1);
        assert_eq!(record.longest_streak, 8);
        record.apply_completion(d("2025-05-15"));
        assert_eq!(record.longest_streak, 8);
        assert!(record.longest_streak >= record.current_streak);
    }

    #[test]
    fn completion_clears_pending_revival() {
        let mut record = active(6, "2025-05-10");
        record.apply_lapse(d("2025-05-13"));
        assert_eq!(record.previous_streak, 6);
        record.apply_completion(d("2025-05-13"));
        assert_eq!(record.previous_streak, 0);
        assert_eq!(record.current_streak, 1);
    }

    #[test]
    fn no_lapse_when_completed_today_or_yesterday() {
        let mut record = active(3, "2025-05-10");
        assert!(!record.apply_lapse(d("2025-05-10")));
        assert!(!record.apply_lapse(d("2025-05-11")));
        assert_eq!(record.current_streak, 3);
    }

    #[test]
    fn lapse_within_window_keeps_previous_streak() {
        // completed on the 10th, today the 13th: missed the 11th and 12th
        let mut record = active(12, "2025-05-10");
        assert!(record.apply_lapse(d("2025-05-13")));
        assert_eq!(record.current_streak, 0);
        assert_eq!(record.previous_streak, 12);
        assert_eq!(record.state(d("2025-05-13")), StreakState::LapsedRevivable);
    }

    #[test]
    fn lapse_beyond_window_expires() {
        // five whole missed days
        let mut record = active(5, "2025-05-10");
        assert!(record.apply_lapse(d("2025-05-16")));
        assert_eq!(record.current_streak, 0);
        assert_eq!(record.previous_streak, 0);
        assert_eq!(record.state(d("2025-05-16")), StreakState::LapsedExpired);
    }

    #[test]
    fn lapse_boundary_at_max_revive_days() {
        // exactly MAX_REVIVE_DAYS missed days is still revivable
        let mut record = active(7, "2025-05-10");
        assert!(record.apply_lapse(d("2025-05-14")));
        assert_eq!(record.previous_streak, 7);

        // one more missed day and it is gone
        let mut record = active(7, "2025-05-10");
        assert!(record.apply_lapse(d("2025-05-15")));
        assert_eq!(record.previous_streak, 0);
    }

    #[test]
    fn apply_lapse_is_idempotent() {
        let mut record = active(12, "2025-05-10");
        assert!(record.apply_lapse(d("2025-05-13")));
        let snapshot = record.clone();
        assert!(!record.apply_lapse(d("2025-05-13")));
        assert_eq!(record, snapshot);
    }

    #[test]
    fn stale_revival_window_is_cleared_on_lapse_check() {
        let mut record = active(9, "2025-05-10");
        record.apply_lapse(d("2025-05-12"));
        assert_eq!(record.previous_streak, 9);
        // user waits past the window without reviving
        assert!(record.apply_lapse(d("2025-05-20")));
        assert_eq!(record.previous_streak, 0);
    }

    #[test]
    fn two_missed_days_need_two_revives() {
        // completed on D=10th, missed 11th and 12th, today the 13th
        let mut record = active(12, "2025-05-10");
        record.apply_lapse(d("2025-05-13"));
        assert_eq!(record.revive_days_remaining(d("2025-05-13")), 2);

        let step = record.apply_revive(d("2025-05-13"));
        assert_eq!(step, ReviveStep::Filled(d("2025-05-11")));
        assert_eq!(record.current_streak, 0);
        assert_eq!(record.previous_streak, 12);
        assert_eq!(record.revive_days_remaining(d("2025-05-13")), 1);

        let step = record.apply_revive(d("2025-05-13"));
        assert_eq!(step, ReviveStep::Restored);
        assert_eq!(record.current_streak, 12);
        assert_eq!(record.previous_streak, 0);
        assert_eq!(record.last_completed_date, Some(d("2025-05-12")));
        assert_eq!(record.state(d("2025-05-13")), StreakState::Active);
    }

    #[test]
    fn revive_converges_in_missed_days_calls() {
        for missed in 1..=MAX_REVIVE_DAYS {
            let mut record = active(10, "2025-05-10");
            let today = d("2025-05-10") + Duration::days(missed + 1);
            record.apply_lapse(today);
            assert_eq!(record.revive_days_remaining(today), missed as u32);
            for _ in 0..missed - 1 {
                assert!(matches!(record.apply_revive(today), ReviveStep::Filled(_)));
            }
            assert_eq!(record.apply_revive(today), ReviveStep::Restored);
            assert_eq!(record.current_streak, 10);
            assert_eq!(record.last_completed_date, Some(today - Duration::days(1)));
        }
    }

    #[test]
    fn revive_without_window_is_noop() {
        let mut record = active(5, "2025-05-10");
        assert_eq!(record.apply_revive(d("2025-05-11")), ReviveStep::Ineligible);
        assert_eq!(record.current_streak, 5);

        let mut expired = active(5, "2025-05-10");
        expired.apply_lapse(d("2025-05-16"));
        assert_eq!(expired.apply_revive(d("2025-05-16")), ReviveStep::Ineligible);
        assert_eq!(expired.revive_days_remaining(d("2025-05-16")), 0);
    }

    #[test]
    fn effective_streak_zeroes_unpersisted_lapse() {
        let record = active(12, "2025-05-10");
        assert_eq!(record.effective_streak(d("2025-05-11")), 12);
        assert_eq!(record.effective_streak(d("2025-05-13")), 0);
    }

    #[test]
    fn new_record_state() {
        let record = StreakRecord::new("u1");
        assert_eq!(record.state(d("2025-05-10")), StreakState::New);
        assert_eq!(record.effective_streak(d("2025-05-10")), 0);
        assert_eq!(record.revive_days_remaining(d("2025-05-10")), 0);
    }
}
