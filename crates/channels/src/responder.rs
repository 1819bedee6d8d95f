//! [`Responder`] implementations for the two delivery paths.
//!
//! - [`InteractionResponder`]: the initial answer goes back as the HTTP
//!   response to Discord's POST; followups go through the REST webhook.
//!   When the HTTP handler gives up waiting it answers with a deferral on
//!   the responder's behalf, and a late reply becomes a followup.
//! - [`ChannelResponder`]: every answer is a plain message on a [`Channel`].

use crate::interaction::InteractionResponse;
use crate::rest::DiscordRest;
use async_trait::async_trait;
use ironlog_core::channel::Channel;
use ironlog_core::error::ChannelError;
use ironlog_core::interaction::{Responder, Visibility};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::warn;

/// Where followups for an interaction are posted.
#[async_trait]
pub trait FollowupSink: Send + Sync {
    async fn followup(&self, interaction_token: &str, content: &str) -> Result<(), ChannelError>;
}

#[async_trait]
impl FollowupSink for DiscordRest {
    async fn followup(&self, interaction_token: &str, content: &str) -> Result<(), ChannelError> {
        DiscordRest::followup(self, interaction_token, content).await
    }
}

/// Who owns the initial HTTP response.
enum Initial {
    /// The handler is waiting for the responder.
    Pending(oneshot::Sender<InteractionResponse>),
    /// The responder has answered.
    Sent,
    /// The handler deferred on the responder's behalf.
    Deferred,
}

type SharedInitial = Arc<Mutex<Initial>>;

/// How an initial answer went out.
enum Delivery {
    Inline,
    /// The interaction was already deferred; the answer must be a followup.
    Late,
}

pub struct InteractionResponder {
    initial: SharedInitial,
    followups: Arc<dyn FollowupSink>,
    token: String,
}

impl InteractionResponder {
    /// Returns the responder and the handle the HTTP handler resolves.
    pub fn new(
        followups: Arc<dyn FollowupSink>,
        token: impl Into<String>,
    ) -> (Self, PendingResponse) {
        let (tx, rx) = oneshot::channel();
        let initial = Arc::new(Mutex::new(Initial::Pending(tx)));
        let responder = Self {
            initial: initial.clone(),
            followups,
            token: token.into(),
        };
        (responder, PendingResponse { rx, initial })
    }

    fn respond(&self, response: InteractionResponse) -> Result<Delivery, ChannelError> {
        let mut initial = self.initial.lock().unwrap_or_else(|e| e.into_inner());
        match std::mem::replace(&mut *initial, Initial::Sent) {
            Initial::Pending(sender) => sender
                .send(response)
                .map(|()| Delivery::Inline)
                .map_err(|_| ChannelError::DeliveryFailed {
                    channel: "discord".into(),
                    reason: "interaction request is gone".into(),
                }),
            Initial::Deferred => Ok(Delivery::Late),
            Initial::Sent => Err(ChannelError::DeliveryFailed {
                channel: "discord".into(),
                reason: "initial response already sent".into(),
            }),
        }
    }
}

impl Drop for InteractionResponder {
    fn drop(&mut self) {
        // Close the handler's receiver if nothing was ever sent.
        let mut initial = self.initial.lock().unwrap_or_else(|e| e.into_inner());
        if matches!(*initial, Initial::Pending(_)) {
            *initial = Initial::Sent;
        }
    }
}

#[async_trait]
impl Responder for InteractionResponder {
    async fn defer(&self) -> Result<(), ChannelError> {
        self.respond(InteractionResponse::deferred()).map(|_| ())
    }

    async fn reply(&self, text: &str, visibility: Visibility) -> Result<(), ChannelError> {
        let response = InteractionResponse::message(text, visibility == Visibility::Private);
        match self.respond(response)? {
            Delivery::Inline => Ok(()),
            Delivery::Late => self.followups.followup(&self.token, text).await,
        }
    }

    async fn followup(&self, text: &str) -> Result<(), ChannelError> {
        self.followups.followup(&self.token, text).await
    }
}

/// The HTTP handler's side of an [`InteractionResponder`].
pub struct PendingResponse {
    rx: oneshot::Receiver<InteractionResponse>,
    initial: SharedInitial,
}

impl PendingResponse {
    /// Wait up to `deadline` for the responder's first answer. Past the
    /// deadline the answer is a deferral made on the responder's behalf.
    /// `None` when the responder went away without answering.
    pub async fn resolve(mut self, deadline: Duration) -> Option<InteractionResponse> {
        match tokio::time::timeout(deadline, &mut self.rx).await {
            Ok(response) => response.ok(),
            Err(_) => {
                let mut initial = self.initial.lock().unwrap_or_else(|e| e.into_inner());
                if matches!(*initial, Initial::Pending(_)) {
                    warn!("No initial response before the deadline; deferring");
                    *initial = Initial::Deferred;
                    return Some(InteractionResponse::deferred());
                }
                drop(initial);
                self.rx.try_recv().ok()
            }
        }
    }
}

/// Answers prefix commands on the text channel they came from.
///
/// Text channels cannot hide a message, so private replies are sent as
/// ordinary replies to the invoking message.
pub struct ChannelResponder {
    channel: Arc<dyn Channel>,
    chat_id: String,
    reply_to: Option<String>,
}

impl ChannelResponder {
    pub fn new(
        channel: Arc<dyn Channel>,
        chat_id: impl Into<String>,
        reply_to: Option<String>,
    ) -> Self {
        Self {
            channel,
            chat_id: chat_id.into(),
            reply_to,
        }
    }
}

#[async_trait]
impl Responder for ChannelResponder {
    async fn acknowledge(&self) -> Result<(), ChannelError> {
        self.channel.send_typing(&self.chat_id).await
    }

    async fn defer(&self) -> Result<(), ChannelError> {
        self.channel.send_typing(&self.chat_id).await
    }

    async fn reply(&self, text: &str, _visibility: Visibility) -> Result<(), ChannelError> {
        self.channel
            .send(&self.chat_id, text, self.reply_to.as_deref())
            .await
    }

    async fn followup(&self, text: &str) -> Result<(), ChannelError> {
        self.channel
            .send(&self.chat_id, text, self.reply_to.as_deref())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl FollowupSink for RecordingSink {
        async fn followup(&self, token: &str, content: &str) -> Result<(), ChannelError> {
            self.sent.lock().unwrap().push((token.into(), content.into()));
            Ok(())
        }
    }

    const WAIT: Duration = Duration::from_secs(3);

    #[tokio::test]
    async fn reply_becomes_http_response() {
        let sink = Arc::new(RecordingSink::default());
        let (responder, pending) = InteractionResponder::new(sink, "tok");

        responder.reply("記録しました", Visibility::Private).await.unwrap();

        let response = pending.resolve(WAIT).await.unwrap();
        assert_eq!(response, InteractionResponse::message("記録しました", true));
    }

    #[tokio::test]
    async fn defer_then_followup_uses_webhook() {
        let sink = Arc::new(RecordingSink::default());
        let (responder, pending) = InteractionResponder::new(sink.clone(), "tok");

        responder.defer().await.unwrap();
        assert_eq!(pending.resolve(WAIT).await.unwrap(), InteractionResponse::deferred());

        responder.followup("done").await.unwrap();
        assert_eq!(*sink.sent.lock().unwrap(), vec![("tok".to_string(), "done".to_string())]);
    }

    #[tokio::test]
    async fn second_initial_response_fails() {
        let sink = Arc::new(RecordingSink::default());
        let (responder, _pending) = InteractionResponder::new(sink, "tok");
        responder.defer().await.unwrap();
        assert!(responder.reply("again", Visibility::Public).await.is_err());
    }

    #[tokio::test]
    async fn dropped_request_is_delivery_failure() {
        let sink = Arc::new(RecordingSink::default());
        let (responder, pending) = InteractionResponder::new(sink, "tok");
        drop(pending);
        assert!(matches!(
            responder.defer().await,
            Err(ChannelError::DeliveryFailed { .. })
        ));
    }

    #[tokio::test]
    async fn dropped_responder_resolves_to_none() {
        let sink = Arc::new(RecordingSink::default());
        let (responder, pending) = InteractionResponder::new(sink, "tok");
        drop(responder);
        assert_eq!(pending.resolve(WAIT).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn late_reply_becomes_followup() {
        let sink = Arc::new(RecordingSink::default());
        let (responder, pending) = InteractionResponder::new(sink.clone(), "tok");

        let response = pending.resolve(Duration::from_millis(50)).await;
        assert_eq!(response, Some(InteractionResponse::deferred()));

        responder.reply("記録しました", Visibility::Public).await.unwrap();
        assert_eq!(
            *sink.sent.lock().unwrap(),
            vec![("tok".to_string(), "記録しました".to_string())]
        );
        assert!(responder.reply("again", Visibility::Public).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn late_deferral_is_already_done() {
        let sink = Arc::new(RecordingSink::default());
        let (responder, pending) = InteractionResponder::new(sink.clone(), "tok");

        pending.resolve(Duration::from_millis(50)).await;

        responder.defer().await.unwrap();
        responder.followup("menu").await.unwrap();
        assert_eq!(*sink.sent.lock().unwrap(), vec![("tok".to_string(), "menu".to_string())]);
    }
}
