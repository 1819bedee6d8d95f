//! Slash command adapter: application command payload → [`Invocation`].

use crate::commands::DIARY_TEXT_ID;
use crate::interaction::{Interaction, InteractionData};
use ironlog_core::error::ChannelError;
use ironlog_core::interaction::{Command, Invocation, Surface};
use ironlog_core::training::WorkoutInput;
use serde_json::Value;

/// What an application command asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashRequest {
    Invoke(Invocation),
    /// `/diary` without text: show the form instead, if the channel allows it.
    OpenDiaryModal { channel_id: String, user_id: String },
}

/// Parse an application command interaction.
pub fn parse(interaction: &Interaction) -> Result<SlashRequest, ChannelError> {
    let data = interaction
        .data
        .as_ref()
        .ok_or_else(|| invalid("command without data"))?;
    let name = data.name.as_deref().ok_or_else(|| invalid("command without name"))?;

    let command = match name {
        "workout_log" => Command::WorkoutLog(WorkoutInput {
            category: string_option(data, "category")?,
            exercise: string_option(data, "exercise")?,
            weight: integer_option(data, "weight")?,
            reps: integer_option(data, "reps")?,
        }),
        "workout_history" => Command::WorkoutHistory,
        "workout_recommend" => Command::WorkoutRecommend,
        "diary" => match data.option(DIARY_TEXT_ID).and_then(Value::as_str) {
            Some(text) => Command::Diary { text: text.to_string() },
            None => {
                let (channel_id, user_id) = origin(interaction)?;
                return Ok(SlashRequest::OpenDiaryModal {
                    channel_id,
                    user_id,
                });
            }
        },
        other => return Err(invalid(&format!("unknown command '{other}'"))),
    };

    Ok(SlashRequest::Invoke(invocation(interaction, command, Surface::Slash)?))
}

/// Wrap a command with the interaction's channel and user.
pub(crate) fn invocation(
    interaction: &Interaction,
    command: Command,
    surface: Surface,
) -> Result<Invocation, ChannelError> {
    let (channel_id, user_id) = origin(interaction)?;
    Ok(Invocation {
        channel_id,
        user_id,
        command,
        surface,
    })
}

/// The channel and user an interaction came from.
fn origin(interaction: &Interaction) -> Result<(String, String), ChannelError> {
    let channel_id = interaction
        .channel_id
        .clone()
        .ok_or_else(|| invalid("interaction without channel_id"))?;
    let user_id = interaction
        .user_id()
        .ok_or_else(|| invalid("interaction without user"))?
        .to_string();
    Ok((channel_id, user_id))
}

fn string_option(data: &InteractionData, name: &str) -> Result<String, ChannelError> {
    data.option(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| invalid(&format!("missing string option '{name}'")))
}

fn integer_option(data: &InteractionData, name: &str) -> Result<i64, ChannelError> {
    data.option(name)
        .and_then(Value::as_i64)
        .ok_or_else(|| invalid(&format!("missing integer option '{name}'")))
}

fn invalid(reason: &str) -> ChannelError {
    ChannelError::InvalidPayload(reason.to_string())
}
