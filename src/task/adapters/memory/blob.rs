//! In-memory blob store for tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::ports::{BlobStore, BlobStoreError, BlobStoreResult};

/// Blob store that keeps uploads in memory and hands out `mem://` URLs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryBlobStore {
    /// Creates an empty in-memory blob store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored bytes for a previously issued URL.
    ///
    /// # Errors
    ///
    /// Returns [`BlobStoreError`] when the lock is poisoned.
    pub fn get(&self, url: &str) -> BlobStoreResult<Option<Vec<u8>>> {
        Ok(self
            .blobs
            .read()
            .map_err(|err| BlobStoreError::storage(std::io::Error::other(err.to_string())))?
            .get(url)
            .cloned())
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> BlobStoreResult<String> {
        let url = format!("mem://{path}");
        self.blobs
            .write()
            .map_err(|err| BlobStoreError::storage(std::io::Error::other(err.to_string())))?
            .insert(url.clone(), bytes);
        Ok(url)
    }
}
