//! In-memory task store for tests and local runs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{PropertyId, TaskId, TaskRecord},
    ports::{TaskStore, TaskStoreError, TaskStoreResult},
};

/// Thread-safe in-memory task store with revision-checked updates.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskStore {
    state: Arc<RwLock<HashMap<TaskId, TaskRecord>>>,
}

impl InMemoryTaskStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the lock is poisoned.
    pub fn len(&self) -> TaskStoreResult<usize> {
        Ok(self.read_state()?.len())
    }

    /// Whether the store holds no records.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Persistence`] when the lock is poisoned.
    pub fn is_empty(&self) -> TaskStoreResult<bool> {
        Ok(self.read_state()?.is_empty())
    }

    fn read_state(
        &self,
    ) -> TaskStoreResult<std::sync::RwLockReadGuard<'_, HashMap<TaskId, TaskRecord>>> {
        self.state
            .read()
            .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write_state(
        &self,
    ) -> TaskStoreResult<std::sync::RwLockWriteGuard<'_, HashMap<TaskId, TaskRecord>>> {
        self.state
            .write()
            .map_err(|err| TaskStoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn insert(&self, task: &TaskRecord) -> TaskStoreResult<()> {
        let mut state = self.write_state()?;
        if state.contains_key(&task.id()) {
            return Err(TaskStoreError::DuplicateTask(task.id()));
        }
        state.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &TaskRecord, expected_revision: u64) -> TaskStoreResult<()> {
        let mut state = self.write_state()?;
        let stored = state
            .get(&task.id())
            .ok_or(TaskStoreError::NotFound(task.id()))?;
        if stored.revision() != expected_revision {
            return Err(TaskStoreError::RevisionConflict(task.id()));
        }
        state.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskStoreResult<Option<TaskRecord>> {
        Ok(self.read_state()?.get(&id).cloned())
    }

    async fn list_for_property(&self, property_id: PropertyId) -> TaskStoreResult<Vec<TaskRecord>> {
        Ok(self
            .read_state()?
            .values()
            .filter(|task| task.property_id() == property_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: TaskId) -> TaskStoreResult<()> {
        let mut state = self.write_state()?;
        state
            .remove(&id)
            .map(|_| ())
            .ok_or(TaskStoreError::NotFound(id))
    }
}
