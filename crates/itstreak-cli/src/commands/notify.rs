use std::str::FromStr;

use clap::Subcommand;
use itstreak_core::notify::{plan_slot, run_slot, ExpoPushTransport, Slot};
use itstreak_core::{dates, Config, Database};
use serde_json::json;

#[derive(Subcommand)]
pub enum NotifyAction {
    /// Run one reminder slot now
    Run {
        /// Slot name: morning, lunch, evening, night, final, deadline, recovery
        slot: String,
        /// Plan eligibility and selection without dispatching or logging
        #[arg(long)]
        dry_run: bool,
        /// Run as of this date (YYYY-MM-DD) instead of today
        #[arg(long)]
        date: Option<String>,
    },
    /// List the catalog for a slot
    Messages {
        /// Slot name
        slot: String,
    },
}

pub fn run(action: NotifyAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        NotifyAction::Run { slot, dry_run, date } => {
            let slot = Slot::from_str(&slot)?;
            let today = match date {
                Some(key) => {
                    dates::parse_key(&key).ok_or_else(|| format!("invalid date: {key}"))?
                }
                None => dates::today(),
            };
            let db = Database::open()?;
            let mut rng = rand::thread_rng();

            if dry_run {
                let planned = plan_slot(&db, slot, today, &mut rng)?;
                let view: Vec<_> = planned
                    .iter()
                    .map(|p| {
                        json!({
                            "user_id": p.entry.user_id,
                            "to": p.push.to,
                            "message_id": p.entry.message_id,
                            "title": p.push.title,
                            "body": p.push.body,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                let config = Config::load()?;
                let transport = ExpoPushTransport::with_endpoint(config.push.endpoint);
                let report = run_slot(&db, &transport, slot, today, &mut rng)?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }
        NotifyAction::Messages { slot } => {
            let slot = Slot::from_str(&slot)?;
            let messages = itstreak_core::notify::messages_for(slot);
            println!("{}", serde_json::to_string_pretty(&messages)?);
        }
    }
    Ok(())
}
