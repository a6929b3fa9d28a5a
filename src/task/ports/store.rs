//! Store port for task persistence with optimistic concurrency.

use crate::task::domain::{PropertyId, TaskId, TaskRecord};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task store operations.
pub type TaskStoreResult<T> = Result<T, TaskStoreError>;

/// Task persistence contract.
///
/// Records are written whole; concurrent writers are serialised per task via
/// the revision token. The core performs no locking of its own.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Stores a new task record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::DuplicateTask`] when the identifier already
    /// exists.
    async fn insert(&self, task: &TaskRecord) -> TaskStoreResult<()>;

    /// Replaces an existing record, conditional on its stored revision.
    ///
    /// `expected_revision` is the revision the caller read before mutating;
    /// the passed record carries the bumped successor revision.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist and
    /// [`TaskStoreError::RevisionConflict`] when another writer got there
    /// first.
    async fn update(&self, task: &TaskRecord, expected_revision: u64) -> TaskStoreResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<TaskRecord>>;

    /// Returns all tasks belonging to a property.
    async fn list_for_property(&self, property_id: PropertyId) -> TaskStoreResult<Vec<TaskRecord>>;

    /// Deletes a task record.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] when the task does not exist.
    async fn delete(&self, id: TaskId) -> TaskStoreResult<()>;
}

/// Errors returned by task store implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskStoreError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The record changed since it was read; the write was not applied.
    #[error("stale revision for task {0}, record was modified concurrently")]
    RevisionConflict(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
