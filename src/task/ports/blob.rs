//! Blob-store port for durable proof storage.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for blob store operations.
pub type BlobStoreResult<T> = Result<T, BlobStoreError>;

/// Proof blob storage contract: store bytes, get a durable URL back.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under a store-chosen location derived from `path` and
    /// returns the durable URL.
    ///
    /// # Errors
    ///
    /// Returns [`BlobStoreError`] when the blob cannot be stored.
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> BlobStoreResult<String>;
}

/// Errors returned by blob store implementations.
#[derive(Debug, Clone, Error)]
#[error("blob storage failed: {0}")]
pub struct BlobStoreError(Arc<dyn std::error::Error + Send + Sync>);

impl BlobStoreError {
    /// Wraps a storage error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
