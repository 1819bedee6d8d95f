//! Daily reminder broadcast.
//!
//! Once a day, at a local wall-clock time, posts a fixed message to one
//! channel. The scheduler computes the time until the next target, sleeps
//! once, fires, and re-arms. It runs as its own task next to the gateway and
//! shares nothing with command handling but the configuration it was built
//! from.

use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Utc};
use ironlog_channels::DiscordRest;
use ironlog_config::{AppConfig, ConfigError};
use ironlog_core::clock::Clock;
use ironlog_core::error::ChannelError;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Where reminders are posted.
#[async_trait]
pub trait ReminderSink: Send + Sync {
    async fn post(&self, channel_id: &str, content: &str) -> Result<(), ChannelError>;
}

#[async_trait]
impl ReminderSink for DiscordRest {
    async fn post(&self, channel_id: &str, content: &str) -> Result<(), ChannelError> {
        self.create_message(channel_id, content).await
    }
}

/// A validated reminder schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub channel_id: String,
    pub message: String,
    pub at: NaiveTime,
    pub offset: FixedOffset,
}

impl Reminder {
    /// `Ok(None)` when the reminder is disabled.
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, ConfigError> {
        if !config.reminder.enabled {
            return Ok(None);
        }

        let channel_id = config.reminder_channel().ok_or_else(|| {
            ConfigError::ValidationError(
                "reminder.channel_id or channels.workout_channel_id must be set".into(),
            )
        })?;
        let (hour, minute) = config.reminder.target()?;
        let at = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
            ConfigError::ValidationError(format!("invalid reminder time {hour}:{minute}"))
        })?;
        let offset = FixedOffset::east_opt(config.reminder.utc_offset_minutes * 60).ok_or_else(
            || ConfigError::ValidationError("reminder.utc_offset_minutes out of range".into()),
        )?;

        Ok(Some(Self {
            channel_id: channel_id.to_string(),
            message: config.reminder.message.clone(),
            at,
            offset,
        }))
    }

    pub fn next_fire(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        next_fire(now, self.at, self.offset)
    }
}

/// The first instant strictly after `now` whose local time is `at`.
pub fn next_fire(now: DateTime<Utc>, at: NaiveTime, offset: FixedOffset) -> DateTime<Utc> {
    let local_date = now.with_timezone(&offset).date_naive();
    let local_target = local_date.and_time(at);
    // A fixed offset maps every local time to exactly one instant.
    let target = (local_target - Duration::seconds(i64::from(offset.local_minus_utc()))).and_utc();

    if target > now {
        target
    } else {
        target + Duration::days(1)
    }
}

pub struct ReminderScheduler {
    reminder: Reminder,
    sink: Arc<dyn ReminderSink>,
    clock: Arc<dyn Clock>,
}

impl ReminderScheduler {
    pub fn new(reminder: Reminder, sink: Arc<dyn ReminderSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            reminder,
            sink,
            clock,
        }
    }

    /// Start the background loop. Abort the handle to stop it.
    pub fn start(self) -> JoinHandle<()> {
        info!(
            channel_id = %self.reminder.channel_id,
            at = %self.reminder.at,
            offset = %self.reminder.offset,
            "Reminder scheduled"
        );

        tokio::spawn(async move {
            let mut last_fired: Option<DateTime<Utc>> = None;
            loop {
                let now = self.clock.now();
                // The sleep is monotonic; a lagging wall clock must not re-arm
                // the target that just fired.
                let from = last_fired.map_or(now, |fired| now.max(fired));
                let next = self.reminder.next_fire(from);
                let wait = (next - now).to_std().unwrap_or_default();
                debug!(next = %next, wait_secs = wait.as_secs(), "Sleeping until next reminder");

                tokio::time::sleep(wait).await;
                self.fire().await;
                last_fired = Some(next);
            }
        })
    }

    async fn fire(&self) {
        match self
            .sink
            .post(&self.reminder.channel_id, &self.reminder.message)
            .await
        {
            Ok(()) => info!(channel_id = %self.reminder.channel_id, "Reminder sent"),
            Err(e) => error!(channel_id = %self.reminder.channel_id, error = %e, "Reminder failed"),
        }
    }
}
