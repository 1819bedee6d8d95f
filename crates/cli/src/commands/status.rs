//! `ironlog status` — show the effective configuration.

use super::runtime::{self, CliResult};
use std::path::Path;

fn or_unset(value: Option<&str>) -> &str {
    value.unwrap_or("(unset)")
}

pub async fn run(config_path: Option<&Path>) -> CliResult<()> {
    let config = runtime::load_config(config_path)?;
    let path = runtime::config_file(config_path);

    println!("🏋️ IronLog Status");
    println!("=================");
    println!("  Config file:     {}", path.display());
    println!("  Provider:        {} ({})", config.provider.name, config.provider.api_url);
    println!("  Model:           {}", config.provider.model);
    println!("  API key:         {}", if config.api_key.is_some() { "set" } else { "(unset)" });
    println!("  Database:        {}", config.database_path());
    println!("  Gateway:         {}:{}", config.gateway.host, config.gateway.port);
    println!("  Application ID:  {}", or_unset(config.discord.application_id.as_deref()));
    println!("  Guild:           {}", or_unset(config.discord.guild_id.as_deref()));
    println!("  Workout channel: {}", or_unset(config.channels.workout_channel_id.as_deref()));
    println!("  Diary channel:   {}", or_unset(config.channels.diary_channel_id.as_deref()));
    if config.reminder.enabled {
        println!(
            "  Reminder:        {} (UTC{:+}min) → {}",
            config.reminder.time,
            config.reminder.utc_offset_minutes,
            or_unset(config.reminder_channel())
        );
    } else {
        println!("  Reminder:        disabled");
    }

    if path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `ironlog onboard` first");
    }

    Ok(())
}
