//! Configuration loading, validation, and management for IronLog.
//!
//! Loads configuration from `~/.ironlog/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.ironlog/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Text generator API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Text generator endpoint and model
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Discord application credentials
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Designated channels per command group
    #[serde(default)]
    pub channels: ChannelsConfig,

    /// Persistence settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Interaction endpoint settings
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Daily reminder broadcast
    #[serde(default)]
    pub reminder: ReminderConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("discord", &self.discord)
            .field("channels", &self.channels)
            .field("store", &self.store)
            .field("gateway", &self.gateway)
            .field("reminder", &self.reminder)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_name")]
    pub name: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// HTTP request timeout for one generation call
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_provider_name() -> String {
    "openai".into()
}
fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_request_timeout() -> u64 {
    120
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider_name(),
            api_url: default_api_url(),
            model: default_model(),
            max_tokens: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,

    /// Hex-encoded Ed25519 public key from the Developer Portal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,

    /// Guild (server) that slash commands are registered to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,

    #[serde(default = "default_discord_api_url")]
    pub api_url: String,
}

fn default_discord_api_url() -> String {
    "https://discord.com/api/v10".into()
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("bot_token", &redact(&self.bot_token))
            .field("application_id", &self.application_id)
            .field("public_key", &self.public_key)
            .field("guild_id", &self.guild_id)
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelsConfig {
    /// Channel where workout commands are accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_channel_id: Option<String>,

    /// Channel where the diary command is accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diary_channel_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file; defaults to `~/.ironlog/ironlog.db`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Target channel; falls back to the workout channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,

    /// Local wall-clock time, `HH:MM`
    #[serde(default = "default_reminder_time")]
    pub time: String,

    /// Offset of local time from UTC, in minutes (JST = 540)
    #[serde(default = "default_utc_offset")]
    pub utc_offset_minutes: i32,

    #[serde(default = "default_reminder_message")]
    pub message: String,
}

fn default_reminder_time() -> String {
    "21:00".into()
}
fn default_utc_offset() -> i32 {
    540
}
fn default_reminder_message() -> String {
    "今日のトレーニングと英語日記は記録しましたか？ 💪📝".into()
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            channel_id: None,
            time: default_reminder_time(),
            utc_offset_minutes: default_utc_offset(),
            message: default_reminder_message(),
        }
    }
}

impl ReminderConfig {
    /// Parse `time` into `(hour, minute)`.
    pub fn target(&self) -> Result<(u32, u32), ConfigError> {
        let invalid = || ConfigError::ValidationError(format!(
            "reminder.time must be HH:MM, got '{}'",
            self.time
        ));
        let (h, m) = self.time.trim().split_once(':').ok_or_else(invalid)?;
        let hour: u32 = h.parse().map_err(|_| invalid())?;
        let minute: u32 = m.parse().map_err(|_| invalid())?;
        if hour > 23 || minute > 59 {
            return Err(invalid());
        }
        Ok((hour, minute))
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.ironlog/config.toml),
    /// then apply environment overrides:
    /// - `DISCORD_BOT_TOKEN`, `DISCORD_APPLICATION_ID`, `DISCORD_PUBLIC_KEY`
    /// - `SERVER_ID` (guild), `CHANNEL_ID` (workout), `DIARY_CHANNEL_ID`
    /// - `IRONLOG_API_KEY` (highest priority), `OPENAI_API_KEY`
    /// - `IRONLOG_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_path(&Self::config_dir().join("config.toml"))
    }

    /// Load from an explicit path, then apply environment overrides.
    pub fn load_path(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Overlay environment variables. Set variables win over the file.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let set = |slot: &mut Option<String>, key: &str| {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *slot = Some(value);
            }
        };

        set(&mut self.discord.bot_token, "DISCORD_BOT_TOKEN");
        set(&mut self.discord.application_id, "DISCORD_APPLICATION_ID");
        set(&mut self.discord.public_key, "DISCORD_PUBLIC_KEY");
        set(&mut self.discord.guild_id, "SERVER_ID");
        set(&mut self.channels.workout_channel_id, "CHANNEL_ID");
        set(&mut self.channels.diary_channel_id, "DIARY_CHANNEL_ID");

        if let Some(key) = lookup("IRONLOG_API_KEY").or_else(|| lookup("OPENAI_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(model) = lookup("IRONLOG_MODEL") {
            self.provider.model = model;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".ironlog")
    }

    /// The SQLite database location.
    pub fn database_path(&self) -> String {
        self.store.path.clone().unwrap_or_else(|| {
            Self::config_dir()
                .join("ironlog.db")
                .to_string_lossy()
                .into_owned()
        })
    }

    /// Where the reminder is posted, if anywhere.
    pub fn reminder_channel(&self) -> Option<&str> {
        self.reminder
            .channel_id
            .as_deref()
            .or(self.channels.workout_channel_id.as_deref())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "provider.request_timeout_secs must be > 0".into(),
            ));
        }

        if !(-720..=840).contains(&self.reminder.utc_offset_minutes) {
            return Err(ConfigError::ValidationError(
                "reminder.utc_offset_minutes must be between -720 and 840".into(),
            ));
        }

        self.reminder.target()?;
        Ok(())
    }

    /// Check that everything `ironlog serve` needs is present.
    ///
    /// Reports every missing setting at once.
    pub fn validate_for_serve(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();
        if self.api_key.is_none() {
            missing.push("api_key (OPENAI_API_KEY)");
        }
        if self.discord.application_id.is_none() {
            missing.push("discord.application_id (DISCORD_APPLICATION_ID)");
        }
        if self.discord.public_key.is_none() {
            missing.push("discord.public_key (DISCORD_PUBLIC_KEY)");
        }
        if self.channels.workout_channel_id.is_none() {
            missing.push("channels.workout_channel_id (CHANNEL_ID)");
        }
        if self.channels.diary_channel_id.is_none() {
            missing.push("channels.diary_channel_id (DIARY_CHANNEL_ID)");
        }
        if self.reminder.enabled {
            if self.discord.bot_token.is_none() {
                missing.push("discord.bot_token (DISCORD_BOT_TOKEN)");
            }
            if self.reminder_channel().is_none() {
                missing.push("reminder.channel_id");
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Missing(
                missing.into_iter().map(String::from).collect(),
            ))
        }
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: ProviderConfig::default(),
            discord: DiscordConfig {
                api_url: default_discord_api_url(),
                ..DiscordConfig::default()
            },
            channels: ChannelsConfig::default(),
            store: StoreConfig::default(),
            gateway: GatewayConfig::default(),
            reminder: ReminderConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required settings: {}", .0.join(", "))]
    Missing(Vec<String>),
}
