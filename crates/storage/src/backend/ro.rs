//! Read-only storage backend.
//!
//! Wraps another backend and drops every mutating operation while reporting
//! success, so a pipeline can be rehearsed without touching disk.

use crate::backend::{BoxSyncRead, Entry};
use crate::error::Result;
use crate::{BackendHandle, StorageBackend};
use async_trait::async_trait;
use std::path::Path;

/// Forwards reads to `inner`; folder creation and removal only emit an
/// `info` event.
#[derive(Clone)]
pub struct ReadOnlyBackend {
    inner: BackendHandle,
}

impl ReadOnlyBackend {
    pub fn new(inner: BackendHandle) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl StorageBackend for ReadOnlyBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn list(&self, dir: &Path) -> Result<Vec<Entry>> {
        self.inner.list(dir).await
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        self.inner.exists(path).await
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.inner.read(path).await
    }

    async fn reader(&self, path: &Path) -> Result<BoxSyncRead> {
        self.inner.reader(path).await
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        tracing::info!(path = %path.display(), "Skipping folder creation during read-only mode");
        Ok(())
    }

    async fn remove_dir_all(&self, path: &Path) -> Result<()> {
        tracing::info!(path = %path.display(), "Skipping folder removal during read-only mode");
        Ok(())
    }
}
