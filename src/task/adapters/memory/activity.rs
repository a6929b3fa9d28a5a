//! Recording activity log for tests.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::task::ports::{ActivityEntry, ActivityLog, ActivityLogError};

/// Activity log that keeps entries in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingActivityLog {
    entries: Arc<RwLock<Vec<ActivityEntry>>>,
}

impl RecordingActivityLog {
    /// Creates an empty recording activity log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded entries.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityLogError`] when the lock is poisoned.
    pub fn entries(&self) -> Result<Vec<ActivityEntry>, ActivityLogError> {
        Ok(self
            .entries
            .read()
            .map_err(|err| ActivityLogError::recording(std::io::Error::other(err.to_string())))?
            .clone())
    }
}

#[async_trait]
impl ActivityLog for RecordingActivityLog {
    async fn record(&self, entry: ActivityEntry) -> Result<(), ActivityLogError> {
        self.entries
            .write()
            .map_err(|err| ActivityLogError::recording(std::io::Error::other(err.to_string())))?
            .push(entry);
        Ok(())
    }
}
