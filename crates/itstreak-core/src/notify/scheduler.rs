//! Slot-triggered reminder orchestration.
//!
//! A run loads every user with notifications enabled and a registered push
//! token, applies the slot's eligibility rule to each user's streak and
//! progress snapshots, selects a message per eligible user, and dispatches
//! in bounded batches. Streak rows are never written here; a lapsed streak
//! simply reads as 0.

use chrono::{Duration, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::messages::Slot;
use super::select::{render, select_message, SelectionInput};
use super::transport::{OutboundPush, PushTransport};
use crate::error::Result;
use crate::storage::{PushLogEntry, Store};

/// Transport batch-size limit (Expo accepts up to 100 per request).
pub const DISPATCH_BATCH_SIZE: usize = 100;

/// Trailing window, in days, of the recent-repeat filter.
pub const RECENT_WINDOW_DAYS: i64 = 3;

/// Outcome of one scheduler run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchReport {
    pub slot: Slot,
    pub date: NaiveDate,
    /// Users that passed the slot's eligibility rule.
    pub eligible: usize,
    /// Notifications handed to the transport and logged.
    pub sent: usize,
    /// Batches the transport refused; their users are skipped this cycle.
    pub failed_batches: usize,
    pub failures: Vec<String>,
}

/// One selected notification, ready to dispatch and log.
#[derive(Debug, Clone)]
pub struct PlannedSend {
    pub push: OutboundPush,
    pub entry: PushLogEntry,
}

/// The planning phase of a run: eligibility plus message selection for
/// every notifiable user, without touching the transport or the log.
pub fn plan_slot<S: Store, R: Rng + ?Sized>(
    store: &S,
    slot: Slot,
    today: NaiveDate,
    rng: &mut R,
) -> Result<Vec<PlannedSend>> {
    let since = today - Duration::days(RECENT_WINDOW_DAYS - 1);
    let mut queued: Vec<PlannedSend> = Vec::new();

    for profile in store.notifiable_profiles()? {
        let token = match profile.push_token.as_deref() {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => continue,
        };

        let answered = store
            .progress(&profile.id, today)?
            .map(|p| p.questions_answered)
            .unwrap_or(0);
        let record = store.streak(&profile.id)?;
        let streak = record
            .as_ref()
            .map(|r| r.effective_streak(today))
            .unwrap_or(0);
        let last_completed = record.as_ref().and_then(|r| r.last_completed_date);

        let eligible = match slot {
            // never re-engage someone who has not studied at all yet
            Slot::Recovery => streak == 0 && answered == 0 && last_completed.is_some(),
            Slot::Morning => answered == 0 && (streak > 0 || last_completed.is_none()),
            // last-resort escalation: only after today's `final` message,
            // and only while the day is still unanswered
            Slot::Deadline => {
                answered == 0 && store.slot_sent_on(&profile.id, today, Slot::Final)?
            }
            _ => answered == 0,
        };
        if !eligible {
            continue;
        }

        let recent = store.recent_message_ids(&profile.id, since)?;
        let selection = SelectionInput {
            slot,
            streak,
            daily_goal: profile.daily_goal,
            today_answered: answered,
            recent_message_ids: &recent,
        };
        let message = select_message(&selection, rng);
        let remaining = profile.daily_goal.saturating_sub(answered);
        let rendered = render(message, streak, remaining);

        queued.push(PlannedSend {
            push: OutboundPush {
                to: token,
                sound: "default",
                title: rendered.title,
                body: rendered.body,
                data: json!({ "type": "daily_reminder", "slot": slot.as_str() }),
            },
            entry: PushLogEntry::new(&profile.id, today, slot, message.id),
        });
    }

    Ok(queued)
}

/// Run one slot once (invoked by an external time trigger).
///
/// A batch failure is recorded and the loop continues; nothing is retried
/// within a run, so an external retry pass cannot double-send a batch this
/// run already delivered. Send-log entries are persisted per accepted
/// batch, keeping the recency filter and the deadline escalation gate
/// consistent with what users actually received.
pub fn run_slot<S: Store, T: PushTransport, R: Rng + ?Sized>(
    store: &S,
    transport: &T,
    slot: Slot,
    today: NaiveDate,
    rng: &mut R,
) -> Result<DispatchReport> {
    let queued = plan_slot(store, slot, today, rng)?;

    let mut report = DispatchReport {
        slot,
        date: today,
        eligible: queued.len(),
        sent: 0,
        failed_batches: 0,
        failures: Vec::new(),
    };

    for chunk in queued.chunks(DISPATCH_BATCH_SIZE) {
        let batch: Vec<OutboundPush> = chunk.iter().map(|p| p.push.clone()).collect();
        match transport.send_batch(&batch) {
            Ok(()) => {
                let entries: Vec<PushLogEntry> =
                    chunk.iter().map(|p| p.entry.clone()).collect();
                store.log_push(&entries)?;
                report.sent += batch.len();
            }
            Err(err) => {
                report.failed_batches += 1;
                report.failures.push(err.to_string());
            }
        }
    }

    Ok(report)
}
