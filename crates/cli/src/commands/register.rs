//! `ironlog register` — push the slash command definitions to Discord.

use super::runtime::{self, CliResult};
use ironlog_channels::DiscordRest;
use ironlog_channels::commands::command_definitions;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> CliResult<()> {
    let config = runtime::load_config(config_path)?;
    if config.discord.bot_token.is_none() {
        return Err("discord.bot_token (DISCORD_BOT_TOKEN) is required to register commands".into());
    }
    let rest = DiscordRest::from_config(&config.discord)?;

    let guild = config.discord.guild_id.as_deref();
    let count = rest.register_commands(guild, &command_definitions()).await?;

    match guild {
        Some(guild) => {
            println!("✅ Registered {count} command(s) (guild {guild}, or global fallback)")
        }
        None => println!("✅ Registered {count} global command(s)"),
    }
    Ok(())
}
