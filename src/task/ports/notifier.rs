//! Notification port for lifecycle events.
//!
//! Dispatch is fire-and-forget: the service logs failures and never lets
//! them fail the primary state transition.

use crate::task::domain::{ActorId, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// A lifecycle event worth telling somebody about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    /// A work offer is awaiting the recipient's accept/reject response.
    OfferExtended {
        /// Task being offered.
        task_id: TaskId,
        /// Display name of the task.
        task_name: String,
    },
    /// An assignee accepted the offer.
    OfferAccepted {
        /// Task that was accepted.
        task_id: TaskId,
        /// Display name of the task.
        task_name: String,
        /// Actor that accepted.
        accepted_by: ActorId,
    },
    /// Every configured assignee rejected; manual assignment is required.
    AssignmentExhausted {
        /// Task whose automatic assignment failed.
        task_id: TaskId,
        /// Display name of the task.
        task_name: String,
        /// Lifetime rejection count at the time of exhaustion.
        rejection_count: u32,
    },
    /// Work was submitted and awaits the recipient's review.
    InspectionRequested {
        /// Task awaiting review.
        task_id: TaskId,
        /// Display name of the task.
        task_name: String,
    },
    /// A reviewer sent the work back for revisions.
    RevisionsRequested {
        /// Task requiring revisions.
        task_id: TaskId,
        /// Display name of the task.
        task_name: String,
        /// Reviewer comments, if any.
        comments: Option<String>,
    },
}

/// Notification delivery contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers an event to a single recipient.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError`] when delivery fails; callers treat this as
    /// log-and-continue.
    async fn notify(&self, recipient: &ActorId, event: NotificationEvent)
    -> Result<(), NotifierError>;

    /// Delivers an event to the administrator audience.
    ///
    /// # Errors
    ///
    /// Returns [`NotifierError`] when delivery fails; callers treat this as
    /// log-and-continue.
    async fn notify_admins(&self, event: NotificationEvent) -> Result<(), NotifierError>;
}

/// Errors returned by notifier implementations.
#[derive(Debug, Clone, Error)]
#[error("notification dispatch failed: {0}")]
pub struct NotifierError(Arc<dyn std::error::Error + Send + Sync>);

impl NotifierError {
    /// Wraps a delivery error.
    pub fn delivery(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
