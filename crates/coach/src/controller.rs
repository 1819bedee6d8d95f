//! The interaction lifecycle controller.
//!
//! One controller serves every input surface. It checks scope, drives the
//! [`Lifecycle`] guard, runs the pipeline, and swallows every failure into
//! exactly one user-facing message plus a log line.

use crate::feedback::{format_feedback, parse_feedback};
use crate::generator::Generator;
use crate::lifecycle::{Lifecycle, Phase};
use crate::messages;
use crate::prompt;
use crate::recency::{Recency, track};
use ironlog_config::AppConfig;
use ironlog_core::clock::Clock;
use ironlog_core::diary::FeedbackRecord;
use ironlog_core::error::{Error, FeedbackError, ProviderError, StoreError, ValidationError};
use ironlog_core::interaction::{Command, Invocation, Responder, ResponseMode, Room, Visibility};
use ironlog_core::store::{DiaryStore, HISTORY_LIMIT, LogQuery, LogStore, RECENCY_WINDOW};
use ironlog_core::training::{NewLogEntry, WorkoutInput};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Which channel each command group is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelScope {
    workout: String,
    diary: String,
}

impl ChannelScope {
    pub fn new(workout: impl Into<String>, diary: impl Into<String>) -> Self {
        Self {
            workout: workout.into(),
            diary: diary.into(),
        }
    }

    /// `None` when either channel is unset.
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        Some(Self::new(
            config.channels.workout_channel_id.clone()?,
            config.channels.diary_channel_id.clone()?,
        ))
    }

    pub fn channel_for(&self, room: Room) -> &str {
        match room {
            Room::Workout => &self.workout,
            Room::Diary => &self.diary,
        }
    }

    pub fn allows(&self, room: Room, channel_id: &str) -> bool {
        self.channel_for(room) == channel_id
    }
}

/// How a pipeline run can end short of success.
enum Failure {
    /// Bad user input; the message is shown privately.
    Invalid(ValidationError),
    /// Store, generator or parser failure; the user only sees the generic text.
    External(Error),
}

macro_rules! external_failure {
    ($($err:ty),*) => {
        $(impl From<$err> for Failure {
            fn from(e: $err) -> Self {
                Failure::External(e.into())
            }
        })*
    };
}

external_failure!(StoreError, ProviderError, FeedbackError);

pub struct Controller {
    logs: Arc<dyn LogStore>,
    diaries: Arc<dyn DiaryStore>,
    generator: Generator,
    scope: ChannelScope,
    clock: Arc<dyn Clock>,
}

impl Controller {
    pub fn new(
        logs: Arc<dyn LogStore>,
        diaries: Arc<dyn DiaryStore>,
        generator: Generator,
        scope: ChannelScope,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            logs,
            diaries,
            generator,
            scope,
            clock,
        }
    }

    pub fn scope(&self) -> &ChannelScope {
        &self.scope
    }

    /// The private rejection notice when `room`'s commands may not run in
    /// `channel_id`, or `None` when they may.
    ///
    /// Adapters that answer without a full invocation (the diary form, usage
    /// hints) check this before answering.
    pub fn out_of_scope(
        &self,
        room: Room,
        command: &str,
        channel_id: &str,
        user_id: &str,
    ) -> Option<String> {
        if self.scope.allows(room, channel_id) {
            return None;
        }
        info!(user_id, channel_id, command, "Rejected command outside its channel");
        Some(messages::rejection_notice(room))
    }

    /// Handle one invocation to completion. Returns the final phase.
    pub async fn handle(&self, invocation: &Invocation, responder: &dyn Responder) -> Phase {
        let mut lifecycle = Lifecycle::new(responder);
        let command = invocation.command.name();
        let room = invocation.command.room();

        if let Some(notice) =
            self.out_of_scope(room, command, &invocation.channel_id, &invocation.user_id)
        {
            if let Err(e) = lifecycle.reject(&notice).await {
                error!(command, error = %e, "Failed to deliver rejection notice");
            }
            return lifecycle.phase();
        }

        // Acknowledgment is best-effort.
        if let Err(e) = lifecycle.acknowledge().await {
            warn!(command, error = %e, "Failed to acknowledge command");
        }

        match invocation.command.mode() {
            ResponseMode::Immediate => {
                let outcome = self.run_immediate(invocation).await;
                self.finish_immediate(invocation, &mut lifecycle, outcome).await;
            }
            ResponseMode::Deferred => {
                if let Err(notice) = preflight(&invocation.command) {
                    self.finish_immediate(invocation, &mut lifecycle, Err(Failure::Invalid(notice)))
                        .await;
                    return lifecycle.phase();
                }
                if let Err(e) = lifecycle.defer().await {
                    error!(command, error = %e, "Failed to defer command");
                    if let Err(e) = lifecycle.fail().await {
                        error!(command, error = %e, "Failed to deliver error followup");
                    }
                    return lifecycle.phase();
                }
                let outcome = self.run_deferred(invocation).await;
                self.finish_deferred(invocation, &mut lifecycle, outcome).await;
            }
        }

        lifecycle.phase()
    }

    async fn finish_immediate(
        &self,
        invocation: &Invocation,
        lifecycle: &mut Lifecycle<'_>,
        outcome: Result<String, Failure>,
    ) {
        let command = invocation.command.name();
        let sent = match outcome {
            Ok(text) => lifecycle.reply(&text, Visibility::Public).await,
            Err(Failure::Invalid(notice)) => {
                info!(
                    user_id = %invocation.user_id,
                    command,
                    reason = %notice,
                    "Rejected invalid input"
                );
                lifecycle.reply(&notice.to_string(), Visibility::Private).await
            }
            Err(Failure::External(e)) => {
                error!(user_id = %invocation.user_id, command, error = %e, "Command failed");
                lifecycle.fail().await
            }
        };

        match sent {
            Ok(()) => info!(
                user_id = %invocation.user_id,
                command,
                surface = %invocation.surface,
                "Replied"
            ),
            Err(e) => error!(command, error = %e, "Failed to deliver reply"),
        }
    }

    async fn finish_deferred(
        &self,
        invocation: &Invocation,
        lifecycle: &mut Lifecycle<'_>,
        outcome: Result<String, Failure>,
    ) {
        let command = invocation.command.name();
        let sent = match outcome {
            Ok(text) => lifecycle.followup(&text).await,
            Err(failure) => {
                let user_id = &invocation.user_id;
                match failure {
                    Failure::Invalid(e) => {
                        warn!(%user_id, command, reason = %e, "Invalid input after deferral")
                    }
                    Failure::External(e) => {
                        error!(%user_id, command, error = %e, "Command failed")
                    }
                }
                lifecycle.fail().await
            }
        };

        match sent {
            Ok(()) => info!(
                user_id = %invocation.user_id,
                command,
                surface = %invocation.surface,
                "Followup sent"
            ),
            Err(e) => error!(command, error = %e, "Failed to deliver followup"),
        }
    }

    async fn run_immediate(&self, invocation: &Invocation) -> Result<String, Failure> {
        match &invocation.command {
            Command::WorkoutLog(input) => self.log_workout(&invocation.user_id, input).await,
            Command::WorkoutHistory => self.history(&invocation.user_id).await,
            other => Err(Failure::External(Error::Internal(format!(
                "{} is not an immediate command",
                other.name()
            )))),
        }
    }

    async fn run_deferred(&self, invocation: &Invocation) -> Result<String, Failure> {
        match &invocation.command {
            Command::WorkoutRecommend => self.recommend(&invocation.user_id).await,
            Command::Diary { text } => self.diary(&invocation.user_id, text).await,
            other => Err(Failure::External(Error::Internal(format!(
                "{} is not a deferred command",
                other.name()
            )))),
        }
    }

    async fn log_workout(&self, user_id: &str, input: &WorkoutInput) -> Result<String, Failure> {
        let entry = NewLogEntry::parse(input).map_err(Failure::Invalid)?;
        let confirmation = messages::logged(&entry);
        self.logs.append(user_id, entry).await?;
        Ok(confirmation)
    }

    async fn history(&self, user_id: &str) -> Result<String, Failure> {
        let entries = self
            .logs
            .query(LogQuery::recent(user_id, HISTORY_LIMIT))
            .await?;

        if entries.is_empty() {
            return Ok(messages::NO_HISTORY.to_string());
        }

        let mut text = String::from(messages::HISTORY_HEADER);
        for entry in &entries {
            text.push_str(&messages::history_line(
                entry.timestamp.map(|ts| ts.format("%Y-%m-%d").to_string()),
                entry.category,
                &entry.exercise,
                entry.weight,
                entry.reps,
            ));
            text.push('\n');
        }
        Ok(text)
    }

    async fn recommend(&self, user_id: &str) -> Result<String, Failure> {
        let entries = self
            .logs
            .query(LogQuery::recent(user_id, RECENCY_WINDOW))
            .await?;

        let report = match track(&entries, self.clock.now()) {
            Recency::NoHistory => {
                info!(user_id, "No training history for recommendation");
                return Ok(messages::NO_HISTORY_FOR_RECOMMENDATION.to_string());
            }
            Recency::Report(report) => report,
        };

        let prompt = prompt::workout_prompt(report.recent_lines(), Some(report.least_trained()));
        let reply = self
            .generator
            .generate(prompt::TRAINER_PERSONA, &prompt, prompt::TRAINER_TEMPERATURE)
            .await?;

        Ok(format!("{}{reply}", messages::RECOMMENDATION_PREFIX))
    }

    async fn diary(&self, user_id: &str, diary_text: &str) -> Result<String, Failure> {
        let raw = self
            .generator
            .generate(
                prompt::COACH_PERSONA,
                &prompt::diary_prompt(diary_text),
                prompt::COACH_TEMPERATURE,
            )
            .await?;

        let feedback = parse_feedback(&raw)?;
        let message = format_feedback(&feedback);

        let record = FeedbackRecord::new(diary_text, raw, feedback, self.clock.now());
        self.diaries.append_diary(user_id, record).await?;
        Ok(message)
    }
}

/// Input checks for deferred commands, run before the placeholder goes out.
fn preflight(command: &Command) -> Result<(), ValidationError> {
    match command {
        Command::Diary { text } if text.trim().is_empty() => Err(ValidationError::EmptyDiary),
        _ => Ok(()),
    }
}
