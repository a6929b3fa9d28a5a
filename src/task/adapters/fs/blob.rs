//! Filesystem blob store scoped to a capability directory handle.

use async_trait::async_trait;
use cap_std::fs_utf8::Dir;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::task::ports::{BlobStore, BlobStoreError, BlobStoreResult};

/// Blob store writing proof files under a capability-scoped directory.
///
/// Stored names carry a content-hash prefix so re-uploads of different bytes
/// under the same path never overwrite one another; the returned URL is
/// `{base_url}/{hashed object name}`.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    dir: Arc<Dir>,
    base_url: String,
}

impl FsBlobStore {
    /// Creates a blob store rooted at `dir`, issuing URLs under `base_url`.
    #[must_use]
    pub fn new(dir: Dir, base_url: impl Into<String>) -> Self {
        Self {
            dir: Arc::new(dir),
            base_url: base_url.into(),
        }
    }
}

/// Derives the stored object name: parent directories are preserved and the
/// file name gains a short content-hash prefix.
fn object_name(path: &str, bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let prefix: String = digest.iter().take(4).map(|b| format!("{b:02x}")).collect();
    let trimmed = path.trim_matches('/');
    match trimmed.rsplit_once('/') {
        Some((parent, file)) => format!("{parent}/{prefix}-{file}"),
        None => format!("{prefix}-{trimmed}"),
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> BlobStoreResult<String> {
        let object = object_name(path, &bytes);
        let url = format!("{}/{object}", self.base_url);
        let dir = Arc::clone(&self.dir);
        tokio::task::spawn_blocking(move || -> BlobStoreResult<()> {
            if let Some((parent, _)) = object.rsplit_once('/') {
                dir.create_dir_all(parent).map_err(BlobStoreError::storage)?;
            }
            dir.write(&object, &bytes).map_err(BlobStoreError::storage)
        })
        .await
        .map_err(BlobStoreError::storage)??;
        Ok(url)
    }
}
