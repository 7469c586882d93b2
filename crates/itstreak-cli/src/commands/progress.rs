use clap::Subcommand;
use itstreak_core::{dates, progress, Database};

use super::resolve_user;

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Today's progress against the daily goal
    Status {
        #[arg(long)]
        user: Option<String>,
    },
    /// Record one answered question
    Answer {
        #[arg(long)]
        user: Option<String>,
        /// The answer was correct
        #[arg(long)]
        correct: bool,
    },
    /// Add study time to today's total
    StudyTime {
        #[arg(long)]
        user: Option<String>,
        /// Seconds spent studying
        seconds: u32,
    },
}

pub fn run(action: ProgressAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let today = dates::today();

    match action {
        ProgressAction::Status { user } => {
            let user = resolve_user(user)?;
            let status = progress::goal_status(&db, &user, today)?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        ProgressAction::Answer { user, correct } => {
            let user = resolve_user(user)?;
            progress::record_answer(&db, &user, correct, today)?;
            let status = progress::goal_status(&db, &user, today)?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        ProgressAction::StudyTime { user, seconds } => {
            let user = resolve_user(user)?;
            let row = progress::record_study_time(&db, &user, seconds, today)?;
            println!("{}", serde_json::to_string_pretty(&row)?);
        }
    }
    Ok(())
}
