//! Recording notifier for tests.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::ActorId,
    ports::{NotificationEvent, Notifier, NotifierError},
};

/// Who a recorded notification was addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentTo {
    /// A single actor.
    Actor(ActorId),
    /// The administrator audience.
    Admins,
}

/// Notifier that records every dispatched event instead of delivering it.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<RwLock<Vec<(SentTo, NotificationEvent)>>>,
}

impl RecordingNotifier {
    /// Creates an empty recording notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of everything dispatched so far.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError`] when the lock is poisoned.
    pub fn sent(&self) -> Result<Vec<(SentTo, NotificationEvent)>, NotifierError> {
        Ok(self.read()?.clone())
    }

    /// Returns the events dispatched to a specific actor.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError`] when the lock is poisoned.
    pub fn sent_to(&self, actor: &ActorId) -> Result<Vec<NotificationEvent>, NotifierError> {
        Ok(self
            .read()?
            .iter()
            .filter(|(recipient, _)| matches!(recipient, SentTo::Actor(a) if a == actor))
            .map(|(_, event)| event.clone())
            .collect())
    }

    /// Returns the events dispatched to the administrator audience.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError`] when the lock is poisoned.
    pub fn sent_to_admins(&self) -> Result<Vec<NotificationEvent>, NotifierError> {
        Ok(self
            .read()?
            .iter()
            .filter(|(recipient, _)| matches!(recipient, SentTo::Admins))
            .map(|(_, event)| event.clone())
            .collect())
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, Vec<(SentTo, NotificationEvent)>>, NotifierError>
    {
        self.sent
            .read()
            .map_err(|err| NotifierError::delivery(std::io::Error::other(err.to_string())))
    }

    fn push(&self, recipient: SentTo, event: NotificationEvent) -> Result<(), NotifierError> {
        self.sent
            .write()
            .map_err(|err| NotifierError::delivery(std::io::Error::other(err.to_string())))?
            .push((recipient, event));
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        recipient: &ActorId,
        event: NotificationEvent,
    ) -> Result<(), NotifierError> {
        self.push(SentTo::Actor(recipient.clone()), event)
    }

    async fn notify_admins(&self, event: NotificationEvent) -> Result<(), NotifierError> {
        self.push(SentTo::Admins, event)
    }
}
