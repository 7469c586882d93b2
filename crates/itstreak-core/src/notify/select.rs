//! Message selection: deterministic narrowing, then one random pick.
//!
//! The pipeline filters the slot's catalog by streak-derived priority (or
//! the deadline slot's curated streak bands), then drops messages sent in
//! the trailing 3-day window. Every filter falls back to its input when it
//! would empty the candidate set, so a message can always be selected.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::messages::{messages_for, PushMessage, Slot, StreakPriority};

/// Everything the selection pipeline needs about one user.
#[derive(Debug, Clone)]
pub struct SelectionInput<'a> {
    pub slot: Slot,
    /// Current (effective) streak.
    pub streak: u32,
    pub daily_goal: u32,
    pub today_answered: u32,
    /// Message ids sent to this user within the trailing 3-day window.
    pub recent_message_ids: &'a [String],
}

/// Streak thresholds mapping a slot to the priority bucket to prefer.
/// First matching row wins; `lunch` and `recovery` use no priority filter.
const SLOT_PRIORITY_BANDS: &[(Slot, &[(u32, StreakPriority)])] = &[
    (Slot::Morning, &[(5, StreakPriority::High), (0, StreakPriority::Low)]),
    (Slot::Evening, &[(7, StreakPriority::High), (0, StreakPriority::Low)]),
    (
        Slot::Night,
        &[
            (10, StreakPriority::VeryHigh),
            (3, StreakPriority::Medium),
            (0, StreakPriority::Low),
        ],
    ),
    (
        Slot::Final,
        &[
            (7, StreakPriority::High),
            (3, StreakPriority::Medium),
            (0, StreakPriority::Low),
        ],
    ),
];

/// The deadline slot's candidates are curated per streak band rather than
/// derived from priorities.
const DEADLINE_BANDS: &[(u32, &[&str])] = &[
    (30, &["D02", "D05"]),
    (7, &["D02", "D04", "D05"]),
    (0, &["D01", "D03", "D06"]),
];

/// Priority bucket for `(slot, streak)`, `None` for slots that don't
/// filter by priority.
pub fn priority_for_slot(slot: Slot, streak: u32) -> Option<StreakPriority> {
    let (_, bands) = SLOT_PRIORITY_BANDS.iter().find(|(s, _)| *s == slot)?;
    bands
        .iter()
        .find(|(min_streak, _)| streak >= *min_streak)
        .map(|(_, priority)| *priority)
}

fn deadline_allow_list(streak: u32) -> &'static [&'static str] {
    DEADLINE_BANDS
        .iter()
        .find(|(min_streak, _)| streak >= *min_streak)
        .map(|(_, ids)| *ids)
        .unwrap_or(&[])
}

fn filter_recent<'m>(
    candidates: Vec<&'m PushMessage>,
    recent_message_ids: &[String],
) -> Vec<&'m PushMessage> {
    if recent_message_ids.is_empty() {
        return candidates;
    }
    let filtered: Vec<&PushMessage> = candidates
        .iter()
        .copied()
        .filter(|m| !recent_message_ids.iter().any(|id| id == m.id))
        .collect();
    if filtered.is_empty() {
        candidates
    } else {
        filtered
    }
}

/// The deterministic part of selection: the narrowed candidate set the
/// random pick draws from. Never empty.
pub fn candidates(input: &SelectionInput<'_>) -> Vec<&'static PushMessage> {
    let catalog = messages_for(input.slot);
    let mut candidates: Vec<&'static PushMessage> = catalog.iter().collect();

    match input.slot {
        Slot::Deadline => {
            let allowed = deadline_allow_list(input.streak);
            candidates.retain(|m| allowed.contains(&m.id));
            if candidates.is_empty() {
                candidates = catalog.iter().collect();
            }
        }
        Slot::Lunch => {
            if input.daily_goal > 0 {
                // goal-tied copy first; the pick is uniform either way
                candidates.sort_by_key(|m| !m.requires_goal);
            } else {
                candidates.retain(|m| !m.requires_goal);
            }
        }
        Slot::Recovery => {}
        _ => {
            if let Some(priority) = priority_for_slot(input.slot, input.streak) {
                let by_priority: Vec<&'static PushMessage> = candidates
                    .iter()
                    .copied()
                    .filter(|m| m.streak_priority == Some(priority))
                    .collect();
                if !by_priority.is_empty() {
                    candidates = by_priority;
                }
            }
        }
    }

    filter_recent(candidates, input.recent_message_ids)
}

/// Narrow the slot's catalog for this user and pick one message uniformly.
pub fn select_message<R: Rng + ?Sized>(
    input: &SelectionInput<'_>,
    rng: &mut R,
) -> &'static PushMessage {
    candidates(input)
        .choose(rng)
        .copied()
        .or_else(|| messages_for(input.slot).first())
        .expect("slot catalogs are non-empty")
}

/// Title/body with placeholders substituted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub title: String,
    pub body: String,
}

/// Substitute `{streak}` and `{remaining}` in the chosen message.
pub fn render(message: &PushMessage, streak: u32, remaining: u32) -> RenderedMessage {
    let substitute = |s: &str| {
        s.replace("{streak}", &streak.to_string())
            .replace("{remaining}", &remaining.to_string())
    };
    RenderedMessage {
        title: substitute(message.title),
        body: substitute(message.body),
    }
}
