//! Minimal Discord REST client.
//!
//! Covers the three calls IronLog makes outside the interaction response:
//! followup webhooks, channel messages (reminder) and command registration.

use ironlog_config::DiscordConfig;
use ironlog_core::error::ChannelError;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct DiscordRest {
    client: reqwest::Client,
    api_url: String,
    application_id: String,
    bot_token: Option<String>,
}

impl std::fmt::Debug for DiscordRest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordRest")
            .field("api_url", &self.api_url)
            .field("application_id", &self.application_id)
            .field("bot_token", &self.bot_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl DiscordRest {
    pub fn new(
        api_url: impl Into<String>,
        application_id: impl Into<String>,
        bot_token: Option<String>,
    ) -> Result<Self, ChannelError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ChannelError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            application_id: application_id.into(),
            bot_token,
        })
    }

    pub fn from_config(config: &DiscordConfig) -> Result<Self, ChannelError> {
        let application_id = config.application_id.clone().ok_or_else(|| {
            ChannelError::NotConfigured("discord.application_id is not set".into())
        })?;
        Self::new(&config.api_url, application_id, config.bot_token.clone())
    }

    fn bot_auth(&self) -> Result<String, ChannelError> {
        self.bot_token
            .as_ref()
            .map(|t| format!("Bot {t}"))
            .ok_or_else(|| ChannelError::NotConfigured("discord.bot_token is not set".into()))
    }

    /// Send the terminal message of a deferred interaction.
    pub async fn followup(
        &self,
        interaction_token: &str,
        content: &str,
    ) -> Result<(), ChannelError> {
        let url = format!(
            "{}/webhooks/{}/{}",
            self.api_url, self.application_id, interaction_token
        );
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await
            .map_err(|e| delivery("followup", e))?;

        check("followup", response).await?;
        debug!("Followup delivered");
        Ok(())
    }

    /// Post a plain message to a channel as the bot.
    pub async fn create_message(
        &self,
        channel_id: &str,
        content: &str,
    ) -> Result<(), ChannelError> {
        let url = format!("{}/channels/{}/messages", self.api_url, channel_id);
        let response = self
            .client
            .post(&url)
            .header("Authorization", self.bot_auth()?)
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await
            .map_err(|e| delivery("create_message", e))?;

        check("create_message", response).await?;
        debug!(channel_id, "Channel message delivered");
        Ok(())
    }

    /// Bulk-overwrite the guild's commands. Returns how many Discord accepted.
    pub async fn register_guild_commands(
        &self,
        guild_id: &str,
        commands: &Value,
    ) -> Result<usize, ChannelError> {
        let url = format!(
            "{}/applications/{}/guilds/{}/commands",
            self.api_url, self.application_id, guild_id
        );
        self.overwrite(&url, commands).await
    }

    /// Bulk-overwrite the global commands.
    pub async fn register_global_commands(&self, commands: &Value) -> Result<usize, ChannelError> {
        let url = format!("{}/applications/{}/commands", self.api_url, self.application_id);
        self.overwrite(&url, commands).await
    }

    /// Register to the guild; fall back to global registration when the
    /// guild accepted nothing.
    pub async fn register_commands(
        &self,
        guild_id: Option<&str>,
        commands: &Value,
    ) -> Result<usize, ChannelError> {
        if let Some(guild_id) = guild_id {
            let count = self.register_guild_commands(guild_id, commands).await?;
            if count > 0 {
                info!(guild_id, count, "Registered guild commands");
                return Ok(count);
            }
            warn!(guild_id, "Guild registration returned no commands; registering globally");
        }

        let count = self.register_global_commands(commands).await?;
        info!(count, "Registered global commands");
        Ok(count)
    }

    async fn overwrite(&self, url: &str, commands: &Value) -> Result<usize, ChannelError> {
        let response = self
            .client
            .put(url)
            .header("Authorization", self.bot_auth()?)
            .json(commands)
            .send()
            .await
            .map_err(|e| delivery("register", e))?;

        let response = check("register", response).await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| ChannelError::InvalidPayload(format!("register response: {e}")))?;
        Ok(body.as_array().map_or(0, Vec::len))
    }
}

fn delivery(call: &str, e: reqwest::Error) -> ChannelError {
    ChannelError::DeliveryFailed {
        channel: "discord".into(),
        reason: format!("{call}: {e}"),
    }
}

async fn check(call: &str, response: reqwest::Response) -> Result<reqwest::Response, ChannelError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!(call, status = status.as_u16(), body = %body, "Discord API error");
    Err(ChannelError::DeliveryFailed {
        channel: "discord".into(),
        reason: format!("{call}: HTTP {status}"),
    })
}
