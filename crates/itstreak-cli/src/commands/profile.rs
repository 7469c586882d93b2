use clap::Subcommand;
use itstreak_core::storage::Store;
use itstreak_core::{Database, Profile};

use super::resolve_user;

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show the profile
    Show {
        #[arg(long)]
        user: Option<String>,
    },
    /// Create or update profile fields
    Set {
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        display_name: Option<String>,
        /// Questions per day needed to complete the goal
        #[arg(long)]
        daily_goal: Option<u32>,
        /// Enable or disable reminders (true/false)
        #[arg(long)]
        notifications: Option<bool>,
        /// Preferred reminder time, HH:MM local
        #[arg(long)]
        notification_time: Option<String>,
        /// Expo push token; an empty string clears it
        #[arg(long)]
        push_token: Option<String>,
    },
}

pub fn run(action: ProfileAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        ProfileAction::Show { user } => {
            let user = resolve_user(user)?;
            match db.profile(&user)? {
                Some(profile) => println!("{}", serde_json::to_string_pretty(&profile)?),
                None => {
                    eprintln!("no profile for user: {user}");
                    std::process::exit(1);
                }
            }
        }
        ProfileAction::Set {
            user,
            email,
            display_name,
            daily_goal,
            notifications,
            notification_time,
            push_token,
        } => {
            let user = resolve_user(user)?;
            let mut profile = db
                .profile(&user)?
                .unwrap_or_else(|| Profile::new(&user, ""));
            if let Some(email) = email {
                profile.email = email;
            }
            if let Some(name) = display_name {
                profile.display_name = Some(name);
            }
            if let Some(goal) = daily_goal {
                profile.daily_goal = goal;
            }
            if let Some(enabled) = notifications {
                profile.notification_enabled = enabled;
            }
            if let Some(time) = notification_time {
                profile.notification_time = time;
            }
            if let Some(token) = push_token {
                profile.push_token = if token.is_empty() { None } else { Some(token) };
            }
            db.upsert_profile(&profile)?;
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
    }
    Ok(())
}
