//! Channel trait — the abstraction over text-message surfaces.
//!
//! A Channel delivers plain text messages (CLI, legacy prefix commands) and
//! sends text back. Discord slash commands and modals do not flow through
//! here; they arrive as interactions at the gateway.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ChannelError;

/// Unique identifier for a channel instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message received from or sent to a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMessage {
    /// The channel this message belongs to
    pub channel_id: ChannelId,

    /// Sender identifier (platform-specific user ID)
    pub sender_id: String,

    /// Human-readable sender name (if available)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,

    /// The text content
    pub content: String,

    /// The chat room the message was posted in; used for command scoping
    pub chat_id: String,

    /// Platform message ID, for threading replies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name (e.g., "cli").
    fn name(&self) -> &str;

    /// Unique ID for this channel instance.
    fn id(&self) -> &ChannelId;

    /// Start listening for incoming messages.
    async fn start(
        &self,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<ChannelMessage, ChannelError>>,
        ChannelError,
    >;

    /// Send a message to a specific chat.
    async fn send(
        &self,
        chat_id: &str,
        content: &str,
        reply_to: Option<&str>,
    ) -> std::result::Result<(), ChannelError>;

    /// Send a typing indicator (if the platform supports it).
    async fn send_typing(&self, _chat_id: &str) -> std::result::Result<(), ChannelError> {
        Ok(())
    }

    /// Stop the channel gracefully.
    async fn stop(&self) -> std::result::Result<(), ChannelError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_message_creation() {
        let msg = ChannelMessage {
            channel_id: ChannelId("cli".into()),
            sender_id: "12345".into(),
            sender_name: Some("Alice".into()),
            content: "!workout_history".into(),
            chat_id: "67890".into(),
            message_id: None,
        };
        assert_eq!(msg.channel_id.0, "cli");
        assert_eq!(msg.content, "!workout_history");
    }

    #[test]
    fn optional_fields_are_skipped() {
        let msg = ChannelMessage {
            channel_id: ChannelId("cli".into()),
            sender_id: "1".into(),
            sender_name: None,
            content: "hi".into(),
            chat_id: "2".into(),
            message_id: None,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("sender_name"));
        assert!(!json.contains("message_id"));
    }
}
