//! IronLog CLI — the main entry point.
//!
//! Commands:
//! - `onboard`  — Write the default config
//! - `serve`    — Start the interactions endpoint and the reminder
//! - `register` — Register slash commands with Discord
//! - `chat`     — Run prefix commands from the terminal
//! - `status`   — Show configuration
//! - `doctor`   — Diagnose setup problems

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "ironlog",
    about = "IronLog — training log and English diary coach for Discord",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: ~/.ironlog/config.toml)
    #[arg(short, long, global = true, env = "IRONLOG_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file
    Onboard,

    /// Start the interactions endpoint and the daily reminder
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Register the slash commands with Discord
    Register,

    /// Run prefix commands (`!workout_log ...`) from the terminal
    Chat {
        /// Channel ID the messages are posted in (default: the workout channel)
        #[arg(long)]
        channel: Option<String>,

        /// User ID the entries are recorded under
        #[arg(long, default_value = "local_user")]
        user: String,
    },

    /// Show configuration
    Status,

    /// Diagnose setup problems
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Onboard => commands::onboard::run(config_path).await?,
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::Register => commands::register::run(config_path).await?,
        Commands::Chat { channel, user } => commands::chat::run(config_path, channel, user).await?,
        Commands::Status => commands::status::run(config_path).await?,
        Commands::Doctor => commands::doctor::run(config_path).await?,
    }

    Ok(())
}
