use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "itstreak-cli", version, about = "IT Streak CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Streak lifecycle
    Streak {
        #[command(subcommand)]
        action: commands::streak::StreakAction,
    },
    /// Daily progress tracking
    Progress {
        #[command(subcommand)]
        action: commands::progress::ProgressAction,
    },
    /// Profile management
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Reminder dispatch
    Notify {
        #[command(subcommand)]
        action: commands::notify::NotifyAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Streak { action } => commands::streak::run(action),
        Commands::Progress { action } => commands::progress::run(action),
        Commands::Profile { action } => commands::profile::run(action),
        Commands::Notify { action } => commands::notify::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
