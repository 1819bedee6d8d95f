//! The per-invocation send guard.
//!
//! Wraps a [`Responder`] and tracks where the interaction stands:
//!
//! ```text
//! Received ─┬─> Rejected
//!           └─> Acknowledged ─┬─> Replied
//!                             └─> Deferred ──> Completed
//! ```
//!
//! `Rejected`, `Replied` and `Completed` are terminal. Any send attempted
//! from a terminal phase is refused and logged instead of delivered.
//! A phase is entered when its send is attempted, so a failed acknowledgment
//! or placeholder still leaves the terminal message to be sent.
//! All outbound text passes through [`truncate`].

use crate::messages::GENERIC_ERROR;
use crate::text::truncate;
use ironlog_core::error::{Error, LifecycleError};
use ironlog_core::interaction::{Responder, Visibility};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Received,
    Rejected,
    Acknowledged,
    Replied,
    Deferred,
    Completed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Rejected | Phase::Replied | Phase::Completed)
    }
}

pub struct Lifecycle<'a> {
    responder: &'a dyn Responder,
    phase: Phase,
}

impl<'a> Lifecycle<'a> {
    pub fn new(responder: &'a dyn Responder) -> Self {
        Self {
            responder,
            phase: Phase::Received,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether the placeholder has gone out.
    pub fn is_deferred(&self) -> bool {
        self.phase == Phase::Deferred
    }

    fn guard_terminal(&self) -> Result<(), Error> {
        if self.phase.is_terminal() {
            warn!(phase = ?self.phase, "Refusing to send after terminal message");
            return Err(LifecycleError::AlreadyTerminated.into());
        }
        Ok(())
    }

    /// Scope check failed: private notice, then stop.
    pub async fn reject(&mut self, notice: &str) -> Result<(), Error> {
        self.guard_terminal()?;
        if self.phase != Phase::Received {
            return Err(LifecycleError::AlreadyAcknowledged.into());
        }
        self.phase = Phase::Rejected;
        self.responder
            .reply(truncate(notice), Visibility::Private)
            .await?;
        Ok(())
    }

    pub async fn acknowledge(&mut self) -> Result<(), Error> {
        self.guard_terminal()?;
        if self.phase != Phase::Received {
            return Err(LifecycleError::AlreadyAcknowledged.into());
        }
        self.phase = Phase::Acknowledged;
        self.responder.acknowledge().await?;
        Ok(())
    }

    /// Answer directly. Allowed once, before any deferral.
    pub async fn reply(&mut self, text: &str, visibility: Visibility) -> Result<(), Error> {
        self.guard_terminal()?;
        if self.phase == Phase::Deferred {
            return Err(LifecycleError::AlreadyAcknowledged.into());
        }
        self.phase = Phase::Replied;
        self.responder.reply(truncate(text), visibility).await?;
        Ok(())
    }

    pub async fn defer(&mut self) -> Result<(), Error> {
        self.guard_terminal()?;
        if self.phase == Phase::Deferred {
            return Err(LifecycleError::AlreadyAcknowledged.into());
        }
        self.phase = Phase::Deferred;
        self.responder.defer().await?;
        Ok(())
    }

    /// The terminal message after a deferral.
    pub async fn followup(&mut self, text: &str) -> Result<(), Error> {
        self.guard_terminal()?;
        if self.phase != Phase::Deferred {
            return Err(LifecycleError::NotDeferred.into());
        }
        self.phase = Phase::Completed;
        self.responder.followup(truncate(text)).await?;
        Ok(())
    }

    /// Deliver the generic error through whichever path is still open.
    pub async fn fail(&mut self) -> Result<(), Error> {
        if self.is_deferred() {
            self.followup(GENERIC_ERROR).await
        } else {
            self.reply(GENERIC_ERROR, Visibility::Private).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ironlog_core::error::ChannelError;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Responder for Recorder {
        async fn defer(&self) -> Result<(), ChannelError> {
            self.sent.lock().unwrap().push("defer".into());
            Ok(())
        }

        async fn reply(&self, text: &str, visibility: Visibility) -> Result<(), ChannelError> {
            self.sent.lock().unwrap().push(format!("reply:{visibility:?}:{text}"));
            Ok(())
        }

        async fn followup(&self, text: &str) -> Result<(), ChannelError> {
            self.sent.lock().unwrap().push(format!("followup:{text}"));
            Ok(())
        }
    }

    #[tokio::test]
    async fn second_reply_is_refused() {
        let recorder = Recorder::default();
        let mut lc = Lifecycle::new(&recorder);
        lc.acknowledge().await.unwrap();
        lc.reply("one", Visibility::Public).await.unwrap();

        let err = lc.reply("two", Visibility::Public).await.unwrap_err();
        assert!(matches!(err, Error::Lifecycle(LifecycleError::AlreadyTerminated)));
        assert!(lc.fail().await.is_err());
        assert_eq!(*recorder.sent.lock().unwrap(), vec!["reply:Public:one"]);
    }

    #[tokio::test]
    async fn followup_requires_deferral() {
        let recorder = Recorder::default();
        let mut lc = Lifecycle::new(&recorder);
        lc.acknowledge().await.unwrap();
        let err = lc.followup("late").await.unwrap_err();
        assert!(matches!(err, Error::Lifecycle(LifecycleError::NotDeferred)));
        assert!(recorder.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn fail_after_defer_uses_followup() {
        let recorder = Recorder::default();
        let mut lc = Lifecycle::new(&recorder);
        lc.acknowledge().await.unwrap();
        lc.defer().await.unwrap();
        lc.fail().await.unwrap();
        assert_eq!(lc.phase(), Phase::Completed);
        assert_eq!(
            *recorder.sent.lock().unwrap(),
            vec!["defer".to_string(), format!("followup:{GENERIC_ERROR}")]
        );
    }

    #[tokio::test]
    async fn fail_before_defer_replies_privately() {
        let recorder = Recorder::default();
        let mut lc = Lifecycle::new(&recorder);
        lc.acknowledge().await.unwrap();
        lc.fail().await.unwrap();
        assert_eq!(lc.phase(), Phase::Replied);
        assert_eq!(
            *recorder.sent.lock().unwrap(),
            vec![format!("reply:Private:{GENERIC_ERROR}")]
        );
    }

    #[tokio::test]
    async fn rejection_is_terminal() {
        let recorder = Recorder::default();
        let mut lc = Lifecycle::new(&recorder);
        lc.reject("wrong channel").await.unwrap();
        assert!(lc.acknowledge().await.is_err());
        assert!(lc.defer().await.is_err());
        assert_eq!(recorder.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn outbound_text_is_truncated() {
        let recorder = Recorder::default();
        let mut lc = Lifecycle::new(&recorder);
        lc.acknowledge().await.unwrap();
        lc.defer().await.unwrap();
        lc.followup(&"x".repeat(5000)).await.unwrap();
        let sent = recorder.sent.lock().unwrap();
        assert_eq!(sent[1].chars().count(), "followup:".len() + crate::MAX_MESSAGE_CHARS);
    }

    /// Placeholder sends fail; terminal sends work.
    struct NoTyping(Recorder);

    #[async_trait]
    impl Responder for NoTyping {
        async fn acknowledge(&self) -> Result<(), ChannelError> {
            Err(ChannelError::DeliveryFailed {
                channel: "test".into(),
                reason: "typing unavailable".into(),
            })
        }

        async fn defer(&self) -> Result<(), ChannelError> {
            Err(ChannelError::DeliveryFailed {
                channel: "test".into(),
                reason: "typing unavailable".into(),
            })
        }

        async fn reply(&self, text: &str, visibility: Visibility) -> Result<(), ChannelError> {
            self.0.reply(text, visibility).await
        }

        async fn followup(&self, text: &str) -> Result<(), ChannelError> {
            self.0.followup(text).await
        }
    }

    #[tokio::test]
    async fn failed_placeholders_leave_terminal_path_open() {
        let responder = NoTyping(Recorder::default());
        let mut lc = Lifecycle::new(&responder);
        assert!(lc.acknowledge().await.is_err());
        assert_eq!(lc.phase(), Phase::Acknowledged);
        assert!(lc.defer().await.is_err());
        assert!(lc.is_deferred());

        lc.fail().await.unwrap();
        assert_eq!(lc.phase(), Phase::Completed);
        assert_eq!(
            *responder.0.sent.lock().unwrap(),
            vec![format!("followup:{GENERIC_ERROR}")]
        );
    }
}
