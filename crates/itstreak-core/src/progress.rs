//! Per-user, per-day study progress and daily-goal tracking.
//!
//! A `DailyProgress` row is created lazily on the first answered question
//! of a day and incremented atomically per answer, so rapid-fire answers
//! from the same quiz session never lose counts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::Store;

/// Goal applied when the user has no profile row yet.
pub const DEFAULT_DAILY_GOAL: u32 = 5;

/// One user's counters for one local calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyProgress {
    pub user_id: String,
    pub date: NaiveDate,
    pub questions_answered: u32,
    pub questions_correct: u32,
    pub study_time_seconds: u32,
}

impl DailyProgress {
    /// Zero-activity row, as written when a revival fills a missed day.
    pub fn stub(user_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            user_id: user_id.into(),
            date,
            questions_answered: 0,
            questions_correct: 0,
            study_time_seconds: 0,
        }
    }

    pub fn is_goal_completed(&self, daily_goal: u32) -> bool {
        self.questions_answered >= daily_goal
    }

    /// Progress toward the goal, clamped to `[0, 100]`.
    pub fn progress_percentage(&self, daily_goal: u32) -> f64 {
        if daily_goal == 0 {
            return 100.0;
        }
        (self.questions_answered as f64 / daily_goal as f64 * 100.0).min(100.0)
    }
}

/// Snapshot of today's standing against the daily goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalStatus {
    pub date: NaiveDate,
    pub questions_answered: u32,
    pub questions_correct: u32,
    pub study_time_seconds: u32,
    pub daily_goal: u32,
    pub goal_completed: bool,
    pub progress_percentage: f64,
    pub remaining: u32,
}

/// Quiz boundary: one call per answered question.
pub fn record_answer<S: Store>(
    store: &S,
    user_id: &str,
    correct: bool,
    today: NaiveDate,
) -> Result<DailyProgress> {
    Ok(store.add_answer(user_id, today, correct)?)
}

/// Accumulate session study time for today's row.
pub fn record_study_time<S: Store>(
    store: &S,
    user_id: &str,
    seconds: u32,
    today: NaiveDate,
) -> Result<DailyProgress> {
    Ok(store.add_study_time(user_id, today, seconds)?)
}

/// Today's progress against the profile's daily goal (profile-less users
/// get [`DEFAULT_DAILY_GOAL`]).
pub fn goal_status<S: Store>(store: &S, user_id: &str, today: NaiveDate) -> Result<GoalStatus> {
    let daily_goal = store
        .profile(user_id)?
        .map(|p| p.daily_goal)
        .unwrap_or(DEFAULT_DAILY_GOAL);
    let progress = store
        .progress(user_id, today)?
        .unwrap_or_else(|| DailyProgress::stub(user_id, today));
    Ok(GoalStatus {
        date: today,
        questions_answered: progress.questions_answered,
        questions_correct: progress.questions_correct,
        study_time_seconds: progress.study_time_seconds,
        daily_goal,
        goal_completed: progress.is_goal_completed(daily_goal),
        progress_percentage: progress.progress_percentage(daily_goal),
        remaining: daily_goal.saturating_sub(progress.questions_answered),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(answered: u32, correct: u32) -> DailyProgress {
        DailyProgress {
            user_id: "u1".into(),
            date: crate::dates::parse_key("2025-05-10").unwrap(),
            questions_answered: answered,
            questions_correct: correct,
            study_time_seconds: 0,
        }
    }

    #[test]
    fn goal_completion_threshold() {
        assert!(!row(3, 2).is_goal_completed(5));
        assert!(!row(4, 4).is_goal_completed(5));
        assert!(row(5, 1).is_goal_completed(5));
        assert!(row(9, 0).is_goal_completed(5));
    }

    #[test]
    fn percentage_matches_fraction() {
        assert_eq!(row(3, 3).progress_percentage(5), 60.0);
        assert_eq!(row(0, 0).progress_percentage(5), 0.0);
        assert_eq!(row(5, 5).progress_percentage(5), 100.0);
    }

    #[test]
    fn percentage_is_clamped_to_100() {
        assert_eq!(row(12, 10).progress_percentage(5), 100.0);
    }

    #[test]
    fn zero_goal_counts_as_met() {
        assert!(row(0, 0).is_goal_completed(0));
        assert_eq!(row(0, 0).progress_percentage(0), 100.0);
    }

    #[test]
    fn percentage_bound_holds_for_arbitrary_counts() {
        for answered in [0u32, 1, 4, 5, 6, 50, 1000] {
            for goal in [0u32, 1, 5, 7] {
                let pct = row(answered, 0).progress_percentage(goal);
                assert!((0.0..=100.0).contains(&pct), "answered={answered} goal={goal} pct={pct}");
            }
        }
    }
}
