//! Activity-log port recording who did what to a task.

use crate::task::domain::{ActorId, TaskId, TaskStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// A recorded action on a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityAction {
    /// A checklist item's completion flag changed.
    ChecklistItemToggled {
        /// Index of the item.
        index: usize,
        /// New completion value.
        completed: bool,
    },
    /// An offer was accepted.
    OfferAccepted,
    /// An offer was rejected.
    OfferRejected,
    /// The work status changed.
    StatusChanged {
        /// Status before the change.
        from: TaskStatus,
        /// Status after the change.
        to: TaskStatus,
    },
    /// The task was deleted.
    TaskDeleted,
}

/// A single activity-log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    /// Task the action applied to.
    pub task_id: TaskId,
    /// Actor that performed the action.
    pub actor: ActorId,
    /// What happened.
    pub action: ActivityAction,
    /// When it happened.
    pub at: DateTime<Utc>,
}

/// Activity recording contract.
#[async_trait]
pub trait ActivityLog: Send + Sync {
    /// Records an entry.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityLogError`] when recording fails; callers treat this
    /// as log-and-continue.
    async fn record(&self, entry: ActivityEntry) -> Result<(), ActivityLogError>;
}

/// Errors returned by activity-log implementations.
#[derive(Debug, Clone, Error)]
#[error("activity recording failed: {0}")]
pub struct ActivityLogError(Arc<dyn std::error::Error + Send + Sync>);

impl ActivityLogError {
    /// Wraps a recording error.
    pub fn recording(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
