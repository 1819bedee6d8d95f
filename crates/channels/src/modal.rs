//! Modal adapter: the submitted diary form → [`Invocation`].

use crate::commands::{DIARY_MODAL_ID, DIARY_TEXT_ID};
use crate::interaction::Interaction;
use crate::slash::invocation;
use ironlog_core::error::ChannelError;
use ironlog_core::interaction::{Command, Invocation, Surface};

pub fn parse(interaction: &Interaction) -> Result<Invocation, ChannelError> {
    let data = interaction
        .data
        .as_ref()
        .ok_or_else(|| ChannelError::InvalidPayload("modal submit without data".into()))?;

    if data.custom_id.as_deref() != Some(DIARY_MODAL_ID) {
        return Err(ChannelError::InvalidPayload(format!(
            "unknown modal '{}'",
            data.custom_id.as_deref().unwrap_or_default()
        )));
    }

    let text = data
        .text_input(DIARY_TEXT_ID)
        .ok_or_else(|| ChannelError::InvalidPayload("diary modal without text".into()))?;

    invocation(
        interaction,
        Command::Diary {
            text: text.to_string(),
        },
        Surface::Modal,
    )
}
