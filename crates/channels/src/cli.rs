//! CLI channel — the prefix commands from a terminal.
//!
//! Reads lines from stdin and prints replies to stdout. Each line is posted
//! as if in `chat_id`, so `ironlog chat --channel <id>` can exercise both
//! the workout and the diary scopes locally.

use async_trait::async_trait;
use ironlog_core::channel::{Channel, ChannelId, ChannelMessage};
use ironlog_core::error::ChannelError;
use std::sync::Mutex;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

type Input = Box<dyn AsyncBufRead + Unpin + Send>;

pub struct CliChannel {
    id: ChannelId,
    chat_id: String,
    user_id: String,
    input: Mutex<Option<Input>>,
}

impl CliChannel {
    pub fn new(chat_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self::with_input(chat_id, user_id, BufReader::new(io::stdin()))
    }

    /// Read lines from `input` instead of stdin.
    pub fn with_input(
        chat_id: impl Into<String>,
        user_id: impl Into<String>,
        input: impl AsyncBufRead + Unpin + Send + 'static,
    ) -> Self {
        Self {
            id: ChannelId("cli".into()),
            chat_id: chat_id.into(),
            user_id: user_id.into(),
            input: Mutex::new(Some(Box::new(input))),
        }
    }
}

fn is_exit(line: &str) -> bool {
    matches!(line, "exit" | "quit" | "/exit" | "/quit" | ":q")
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    fn id(&self) -> &ChannelId {
        &self.id
    }

    async fn start(
        &self,
    ) -> Result<mpsc::Receiver<Result<ChannelMessage, ChannelError>>, ChannelError> {
        let input = self
            .input
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or_else(|| ChannelError::ConnectionLost("cli input already consumed".into()))?;

        let (tx, rx) = mpsc::channel(32);
        let channel_id = self.id.clone();
        let chat_id = self.chat_id.clone();
        let user_id = self.user_id.clone();

        tokio::spawn(async move {
            let mut lines = input.lines();
            let mut seq: u64 = 0;

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        if is_exit(line) {
                            break;
                        }

                        seq += 1;
                        let msg = ChannelMessage {
                            channel_id: channel_id.clone(),
                            sender_id: user_id.clone(),
                            sender_name: None,
                            content: line.to_string(),
                            chat_id: chat_id.clone(),
                            message_id: Some(seq.to_string()),
                        };

                        if tx.send(Ok(msg)).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF (Ctrl+D)
                    Err(e) => {
                        let _ = tx.send(Err(ChannelError::ConnectionLost(e.to_string()))).await;
                        break;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send(
        &self,
        _chat_id: &str,
        content: &str,
        _reply_to: Option<&str>,
    ) -> Result<(), ChannelError> {
        println!("{content}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_channel_properties() {
        let ch = CliChannel::with_input("gym", "me", &b""[..]);
        assert_eq!(ch.name(), "cli");
        assert_eq!(ch.id().0, "cli");
    }

    #[tokio::test]
    async fn lines_become_messages_until_exit() {
        let input = &b"!workout_history\n\n  !diary Hello.  \nquit\n!workout_recommend\n"[..];
        let ch = CliChannel::with_input("gym", "me", input);

        let mut rx = ch.start().await.unwrap();
        let first = rx.recv().await.unwrap().unwrap();
        let second = rx.recv().await.unwrap().unwrap();

        assert_eq!(first.content, "!workout_history");
        assert_eq!(first.chat_id, "gym");
        assert_eq!(first.sender_id, "me");
        assert_eq!(first.message_id.as_deref(), Some("1"));
        assert_eq!(second.content, "!diary Hello.");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn start_twice_fails() {
        let ch = CliChannel::with_input("gym", "me", &b""[..]);
        ch.start().await.unwrap();
        assert!(ch.start().await.is_err());
    }
}
