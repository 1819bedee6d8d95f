//! `ironlog serve` — interactions endpoint plus the daily reminder.

use super::runtime::{self, CliResult};
use ironlog_channels::{DiscordRest, SignatureVerifier};
use ironlog_coach::ChannelScope;
use ironlog_core::clock::SystemClock;
use ironlog_core::interaction::Room;
use ironlog_gateway::GatewayState;
use ironlog_workflow::{Reminder, ReminderScheduler};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub async fn run(config_path: Option<&Path>, port_override: Option<u16>) -> CliResult<()> {
    let mut config = runtime::load_config(config_path)?;
    if let Some(port) = port_override {
        config.gateway.port = port;
    }
    config.validate_for_serve()?;

    let scope = ChannelScope::from_config(&config)
        .ok_or("channels.workout_channel_id and channels.diary_channel_id must be set")?;
    let public_key = config
        .discord
        .public_key
        .as_deref()
        .ok_or("discord.public_key must be set")?;
    let verifier = SignatureVerifier::from_hex(public_key)?;
    let rest = Arc::new(DiscordRest::from_config(&config.discord)?);

    let store = runtime::open_store(&config).await?;
    let controller = runtime::build_controller(&config, store.clone(), scope)?;

    let reminder = match Reminder::from_config(&config)? {
        Some(reminder) => {
            Some(ReminderScheduler::new(reminder, rest.clone(), Arc::new(SystemClock)).start())
        }
        None => {
            info!("Reminder disabled");
            None
        }
    };

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    println!("🏋️ IronLog");
    println!("   Interactions: http://{addr}/interactions");
    println!("   Workout channel: {}", controller.scope().channel_for(Room::Workout));
    println!("   Diary channel:   {}", controller.scope().channel_for(Room::Diary));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let state = Arc::new(GatewayState::new(controller, verifier, rest));
    let served = ironlog_gateway::serve(listener, state, runtime::shutdown_signal()).await;

    if let Some(handle) = reminder {
        handle.abort();
    }
    store.close().await;
    info!("IronLog stopped");

    served?;
    Ok(())
}
