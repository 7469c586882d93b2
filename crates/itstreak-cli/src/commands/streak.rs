use clap::Subcommand;
use itstreak_core::{dates, streak, Database};
use serde_json::json;

use super::resolve_user;

#[derive(Subcommand)]
pub enum StreakAction {
    /// Current streak state (applies any pending lapse first)
    Show {
        #[arg(long)]
        user: Option<String>,
    },
    /// Record today's study completion
    Complete {
        #[arg(long)]
        user: Option<String>,
    },
    /// Spend one revival grant on the oldest missed day
    Revive {
        #[arg(long)]
        user: Option<String>,
    },
}

pub fn run(action: StreakAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let today = dates::today();

    match action {
        StreakAction::Show { user } => {
            let user = resolve_user(user)?;
            let record = streak::reconcile(&db, &user, today)?;
            let view = json!({
                "user_id": record.user_id,
                "current_streak": record.current_streak,
                "longest_streak": record.longest_streak,
                "previous_streak": record.previous_streak,
                "last_completed_date": record.last_completed_date,
                "state": record.state(today),
                "revive_days_remaining": record.revive_days_remaining(today),
            });
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        StreakAction::Complete { user } => {
            let user = resolve_user(user)?;
            let (record, kind) = streak::record_completion(&db, &user, today)?;
            let view = json!({ "result": kind, "record": record });
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        StreakAction::Revive { user } => {
            let user = resolve_user(user)?;
            let (record, step) = streak::revive(&db, &user, today)?;
            let view = json!({ "result": step, "record": record });
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }
    Ok(())
}
