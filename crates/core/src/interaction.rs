//! Command invocations and the responder capability.
//!
//! Every input surface (slash command, modal form, prefix message) turns its
//! payload into an [`Invocation`] and wraps its reply mechanism in a
//! [`Responder`]. The lifecycle controller sees nothing else.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ChannelError;
use crate::training::WorkoutInput;

/// A parsed command with its declared parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    WorkoutLog(WorkoutInput),
    WorkoutHistory,
    WorkoutRecommend,
    Diary { text: String },
}

/// Which designated channel a command is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Room {
    Workout,
    Diary,
}

/// How a command answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// Bounded work; one synchronous reply.
    Immediate,
    /// Unbounded work; placeholder first, then one followup.
    Deferred,
}

impl Command {
    /// Platform command name.
    pub fn name(&self) -> &'static str {
        match self {
            Command::WorkoutLog(_) => "workout_log",
            Command::WorkoutHistory => "workout_history",
            Command::WorkoutRecommend => "workout_recommend",
            Command::Diary { .. } => "diary",
        }
    }

    pub fn room(&self) -> Room {
        match self {
            Command::Diary { .. } => Room::Diary,
            _ => Room::Workout,
        }
    }

    pub fn mode(&self) -> ResponseMode {
        match self {
            Command::WorkoutLog(_) | Command::WorkoutHistory => ResponseMode::Immediate,
            Command::WorkoutRecommend | Command::Diary { .. } => ResponseMode::Deferred,
        }
    }
}

/// The input surface an invocation came from. Used for logging only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Slash,
    Modal,
    Prefix,
}

impl std::fmt::Display for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Surface::Slash => "slash",
            Surface::Modal => "modal",
            Surface::Prefix => "prefix",
        })
    }
}

/// One command invocation event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    /// Chat channel the command was issued in
    pub channel_id: String,
    /// Invoking user
    pub user_id: String,
    pub command: Command,
    pub surface: Surface,
}

/// Whether a direct reply is visible to everyone or only the invoker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

/// The acknowledge / defer / reply capability of an input surface.
///
/// Per invocation, exactly one of `reply` or the `defer` + `followup` pair
/// is used. The controller enforces that; implementations just deliver.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Signal receipt once the scope check has passed.
    async fn acknowledge(&self) -> Result<(), ChannelError> {
        Ok(())
    }

    /// Send the placeholder that extends the platform's reply deadline.
    async fn defer(&self) -> Result<(), ChannelError>;

    /// Answer directly; ends the interaction.
    async fn reply(&self, text: &str, visibility: Visibility) -> Result<(), ChannelError>;

    /// Send the terminal message after a deferral.
    async fn followup(&self, text: &str) -> Result<(), ChannelError>;
}
