//! `ironlog chat` — prefix commands on stdin/stdout.
//!
//! Every line is treated as a message posted in `--channel`, so the same
//! scope rules as on Discord apply.

use super::runtime::{self, CliResult};
use ironlog_channels::{CliChannel, PrefixAdapter};
use ironlog_coach::ChannelScope;
use ironlog_config::AppConfig;
use std::path::Path;
use std::sync::Arc;

const LOCAL_WORKOUT_CHANNEL: &str = "workout";
const LOCAL_DIARY_CHANNEL: &str = "diary";

/// Configured channels, with local names standing in for unset ones.
fn local_scope(config: &AppConfig) -> ChannelScope {
    ChannelScope::new(
        config
            .channels
            .workout_channel_id
            .as_deref()
            .unwrap_or(LOCAL_WORKOUT_CHANNEL),
        config
            .channels
            .diary_channel_id
            .as_deref()
            .unwrap_or(LOCAL_DIARY_CHANNEL),
    )
}

pub async fn run(
    config_path: Option<&Path>,
    channel: Option<String>,
    user: String,
) -> CliResult<()> {
    let config = runtime::load_config(config_path)?;

    if config.api_key.is_none() && config.provider.name == "openai" {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    OPENAI_API_KEY  = 'sk-...'");
        eprintln!("    IRONLOG_API_KEY = 'sk-...'   (takes precedence)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", runtime::config_file(config_path).display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let scope = local_scope(&config);
    let chat_id =
        channel.unwrap_or_else(|| scope.channel_for(ironlog_core::Room::Workout).to_string());

    let store = runtime::open_store(&config).await?;
    let controller = runtime::build_controller(&config, store.clone(), scope)?;

    println!("🏋️ IronLog chat — posting as '{user}' in channel '{chat_id}'");
    println!("   Commands: !workout_log <部位> <種目> <重量> <回数>, !workout_history,");
    println!("             !workout_recommend, !diary <text>");
    println!("   Type 'exit' to quit.\n");

    let channel = Arc::new(CliChannel::new(chat_id, user));
    let adapter = PrefixAdapter::new(channel, controller);
    let result = adapter.run().await;

    store.close().await;
    result?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironlog_core::Room;

    #[test]
    fn local_scope_fills_unset_channels() {
        let mut config = AppConfig::default();
        config.channels.diary_channel_id = Some("journal".into());

        let scope = local_scope(&config);
        assert_eq!(scope.channel_for(Room::Workout), LOCAL_WORKOUT_CHANNEL);
        assert_eq!(scope.channel_for(Room::Diary), "journal");
    }
}
