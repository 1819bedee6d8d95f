//! Prefix command adapter: `!command args` text messages over any [`Channel`].
//!
//! ```text
//! !workout_log Chest ベンチプレス 60 10
//! !workout_history
//! !workout_recommend
//! !diary Today I went to the gym.
//! ```

use crate::responder::ChannelResponder;
use ironlog_coach::{Controller, Phase};
use ironlog_core::channel::{Channel, ChannelMessage};
use ironlog_core::error::ChannelError;
use ironlog_core::interaction::{Command, Invocation, Room, Surface};
use ironlog_core::training::WorkoutInput;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const PREFIX: char = '!';
pub const WORKOUT_LOG_USAGE: &str = "使い方: !workout_log <部位> <種目> <重量> <回数>";

/// A known command whose arguments did not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Malformed {
    pub command: &'static str,
    pub room: Room,
    pub usage: &'static str,
}

const MALFORMED_WORKOUT_LOG: Malformed = Malformed {
    command: "workout_log",
    room: Room::Workout,
    usage: WORKOUT_LOG_USAGE,
};

/// Parse a message. `None` when it is not a known prefix command;
/// `Some(Err(_))` when it is one but the arguments are malformed.
pub fn parse(content: &str) -> Option<Result<Command, Malformed>> {
    let body = content.trim().strip_prefix(PREFIX)?;
    let (name, rest) = match body.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (body, ""),
    };

    let command = match name {
        "workout_log" => parse_workout_log(rest),
        "workout_history" => Ok(Command::WorkoutHistory),
        "workout_recommend" => Ok(Command::WorkoutRecommend),
        "diary" => Ok(Command::Diary {
            text: rest.to_string(),
        }),
        _ => return None,
    };
    Some(command)
}

/// `<category> <exercise words...> <weight> <reps>`
fn parse_workout_log(args: &str) -> Result<Command, Malformed> {
    let tokens: Vec<&str> = args.split_whitespace().collect();
    let [category, exercise @ .., weight, reps] = tokens.as_slice() else {
        return Err(MALFORMED_WORKOUT_LOG);
    };
    if exercise.is_empty() {
        return Err(MALFORMED_WORKOUT_LOG);
    }
    let weight = weight.parse().map_err(|_| MALFORMED_WORKOUT_LOG)?;
    let reps = reps.parse().map_err(|_| MALFORMED_WORKOUT_LOG)?;

    Ok(Command::WorkoutLog(WorkoutInput {
        category: (*category).to_string(),
        exercise: exercise.join(" "),
        weight,
        reps,
    }))
}

/// Reads a channel, handing every prefix command to the controller.
pub struct PrefixAdapter {
    channel: Arc<dyn Channel>,
    controller: Arc<Controller>,
}

impl PrefixAdapter {
    pub fn new(channel: Arc<dyn Channel>, controller: Arc<Controller>) -> Self {
        Self {
            channel,
            controller,
        }
    }

    /// Run until the channel closes.
    pub async fn run(&self) -> Result<(), ChannelError> {
        let mut rx = self.channel.start().await?;
        info!(channel = self.channel.name(), "Prefix adapter listening");

        while let Some(message) = rx.recv().await {
            match message {
                Ok(message) => {
                    self.dispatch(message).await;
                }
                Err(e) => {
                    warn!(channel = self.channel.name(), error = %e, "Channel error");
                    break;
                }
            }
        }

        self.channel.stop().await
    }

    /// Handle one message. Returns the controller's final phase, or `None`
    /// when the message was not handed to the controller.
    pub async fn dispatch(&self, message: ChannelMessage) -> Option<Phase> {
        let command = match parse(&message.content)? {
            Ok(command) => command,
            Err(malformed) => {
                debug!(
                    sender = %message.sender_id,
                    command = malformed.command,
                    "Malformed prefix command"
                );
                // Outside its channel the command gets the rejection, not the hint.
                let text = self
                    .controller
                    .out_of_scope(
                        malformed.room,
                        malformed.command,
                        &message.chat_id,
                        &message.sender_id,
                    )
                    .unwrap_or_else(|| malformed.usage.to_string());
                if let Err(e) = self
                    .channel
                    .send(&message.chat_id, &text, message.message_id.as_deref())
                    .await
                {
                    warn!(error = %e, "Failed to answer malformed command");
                }
                return None;
            }
        };

        let responder = ChannelResponder::new(
            self.channel.clone(),
            message.chat_id.clone(),
            message.message_id.clone(),
        );
        let invocation = Invocation {
            channel_id: message.chat_id,
            user_id: message.sender_id,
            command,
            surface: Surface::Prefix,
        };
        Some(self.controller.handle(&invocation, &responder).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ironlog_coach::{ChannelScope, Generator};
    use ironlog_core::channel::ChannelId;
    use ironlog_core::clock::SystemClock;
    use ironlog_core::error::ProviderError;
    use ironlog_core::message::Message;
    use ironlog_core::provider::{Provider, ProviderRequest, ProviderResponse};
    use ironlog_core::store::{LogQuery, LogStore};
    use ironlog_store::InMemoryStore;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    #[test]
    fn parse_workout_log_with_spaced_exercise() {
        let command = parse("!workout_log Back ベントオーバー ロウ 30 12").unwrap().unwrap();
        assert_eq!(
            command,
            Command::WorkoutLog(WorkoutInput {
                category: "Back".into(),
                exercise: "ベントオーバー ロウ".into(),
                weight: 30,
                reps: 12,
            })
        );
    }

    #[test]
    fn parse_malformed_workout_log() {
        for input in [
            "!workout_log Chest 60 10",
            "!workout_log Chest press heavy 10",
            "!workout_log",
        ] {
            let malformed = parse(input).unwrap().unwrap_err();
            assert_eq!(malformed.usage, WORKOUT_LOG_USAGE, "{input}");
            assert_eq!(malformed.room, Room::Workout);
        }
    }

    #[test]
    fn parse_simple_commands() {
        assert_eq!(parse("!workout_history"), Some(Ok(Command::WorkoutHistory)));
        assert_eq!(parse("  !workout_recommend  "), Some(Ok(Command::WorkoutRecommend)));
        assert_eq!(
            parse("!diary I slept well."),
            Some(Ok(Command::Diary { text: "I slept well.".into() }))
        );
    }

    #[test]
    fn non_commands_are_ignored() {
        assert_eq!(parse("hello"), None);
        assert_eq!(parse("!dance"), None);
        assert_eq!(parse(""), None);
    }

    /// A channel that records sends; inbound messages come from `inbox`.
    struct TestChannel {
        id: ChannelId,
        inbox: Mutex<Option<mpsc::Receiver<Result<ChannelMessage, ChannelError>>>>,
        sent: Mutex<Vec<(String, String)>>,
        typing_fails: bool,
    }

    impl TestChannel {
        fn new() -> (Arc<Self>, mpsc::Sender<Result<ChannelMessage, ChannelError>>) {
            Self::build(false)
        }

        /// A channel whose typing indicator always errors.
        fn without_typing() -> Arc<Self> {
            Self::build(true).0
        }

        fn build(
            typing_fails: bool,
        ) -> (Arc<Self>, mpsc::Sender<Result<ChannelMessage, ChannelError>>) {
            let (tx, rx) = mpsc::channel(8);
            let channel = Arc::new(Self {
                id: ChannelId("test".into()),
                inbox: Mutex::new(Some(rx)),
                sent: Mutex::new(Vec::new()),
                typing_fails,
            });
            (channel, tx)
        }
    }

    #[async_trait]
    impl Channel for TestChannel {
        fn name(&self) -> &str {
            "test"
        }

        fn id(&self) -> &ChannelId {
            &self.id
        }

        async fn start(
            &self,
        ) -> Result<mpsc::Receiver<Result<ChannelMessage, ChannelError>>, ChannelError> {
            self.inbox
                .lock()
                .unwrap()
                .take()
                .ok_or_else(|| ChannelError::ConnectionLost("already started".into()))
        }

        async fn send(
            &self,
            chat_id: &str,
            content: &str,
            _: Option<&str>,
        ) -> Result<(), ChannelError> {
            self.sent.lock().unwrap().push((chat_id.into(), content.into()));
            Ok(())
        }

        async fn send_typing(&self, _chat_id: &str) -> Result<(), ChannelError> {
            if self.typing_fails {
                return Err(ChannelError::DeliveryFailed {
                    channel: "test".into(),
                    reason: "typing unavailable".into(),
                });
            }
            Ok(())
        }
    }

    struct EchoProvider;

    #[async_trait]
    impl Provider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, _: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            Ok(ProviderResponse {
                message: Message::assistant("腕立て伏せ 3セット"),
                usage: None,
                model: "mock-model".into(),
            })
        }
    }

    fn message(chat_id: &str, content: &str) -> ChannelMessage {
        ChannelMessage {
            channel_id: ChannelId("test".into()),
            sender_id: "u1".into(),
            sender_name: None,
            content: content.into(),
            chat_id: chat_id.into(),
            message_id: None,
        }
    }

    fn controller(store: Arc<InMemoryStore>) -> Arc<Controller> {
        Arc::new(Controller::new(
            store.clone(),
            store,
            Generator::new(Arc::new(EchoProvider), "gpt-4o"),
            ChannelScope::new("gym", "journal"),
            Arc::new(SystemClock),
        ))
    }

    #[tokio::test]
    async fn run_handles_commands_until_channel_closes() {
        let store = Arc::new(InMemoryStore::new());
        let (channel, tx) = TestChannel::new();
        let adapter = PrefixAdapter::new(channel.clone(), controller(store.clone()));

        tx.send(Ok(message("gym", "!workout_log Chest ベンチプレス 60 10"))).await.unwrap();
        tx.send(Ok(message("gym", "just chatting"))).await.unwrap();
        tx.send(Ok(message("gym", "!workout_recommend"))).await.unwrap();
        tx.send(Ok(message("journal", "!workout_history"))).await.unwrap();
        drop(tx);

        adapter.run().await.unwrap();

        let sent = channel.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0], ("gym".into(), "胸 - ベンチプレス 60kg x 10回 記録しました！".into()));
        assert!(sent[1].1.starts_with("💡 今日のおすすめメニュー:\n腕立て伏せ"));
        assert!(sent[2].1.contains("筋トレチャンネルでのみ"));

        assert_eq!(store.query(LogQuery::recent("u1", 5)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_command_gets_usage_hint() {
        let store = Arc::new(InMemoryStore::new());
        let (channel, _tx) = TestChannel::new();
        let adapter = PrefixAdapter::new(channel.clone(), controller(store));

        let phase = adapter.dispatch(message("gym", "!workout_log Chest")).await;

        assert_eq!(phase, None);
        assert_eq!(
            *channel.sent.lock().unwrap(),
            vec![("gym".to_string(), WORKOUT_LOG_USAGE.to_string())]
        );
    }

    #[tokio::test]
    async fn malformed_command_outside_its_channel_is_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let (channel, _tx) = TestChannel::new();
        let adapter = PrefixAdapter::new(channel.clone(), controller(store));

        let phase = adapter.dispatch(message("journal", "!workout_log Chest")).await;

        assert_eq!(phase, None);
        assert_eq!(
            *channel.sent.lock().unwrap(),
            vec![(
                "journal".to_string(),
                "このコマンドは指定の筋トレチャンネルでのみ利用できます。".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn failing_typing_indicator_does_not_drop_the_command() {
        let store = Arc::new(InMemoryStore::new());
        let channel = TestChannel::without_typing();
        let adapter = PrefixAdapter::new(channel.clone(), controller(store));

        let history = adapter.dispatch(message("gym", "!workout_history")).await;
        let recommend = adapter.dispatch(message("gym", "!workout_recommend")).await;

        assert_eq!(history, Some(Phase::Replied));
        assert_eq!(recommend, Some(Phase::Completed));
        let sent = channel.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].1, ironlog_coach::messages::NO_HISTORY);
        assert_eq!(sent[1].1, ironlog_coach::messages::GENERIC_ERROR);
    }
}
