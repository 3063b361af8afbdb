//! Local filesystem storage backend.
//!
//! Accessed using standard filesystem operations via `tokio::fs` for async
//! I/O.

use crate::StorageBackend;
use crate::backend::{BoxSyncRead, Entry, EntryKind};
use crate::error::{ErrorKind, Result, map_io_error};
use async_trait::async_trait;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;
use tokio::fs::{self, DirEntry};

/// Local filesystem storage backend.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use mapshelf_storage::{BackendHandle, backend::LocalBackend};
///
/// let backend: BackendHandle = Arc::new(LocalBackend::new("local"));
/// ```
#[derive(Debug, Clone)]
pub struct LocalBackend {
    name: String,
}

impl LocalBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn require_absolute(path: &Path) -> Result<()> {
        if !path.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
        }
        Ok(())
    }

    async fn process_entry(entry: DirEntry) -> Result<Option<Entry>> {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        // `fs::metadata` follows symlinks, unlike `DirEntry::metadata`.
        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Skipping broken symlink");
                return Ok(None);
            },
            Err(e) => return Err(map_io_error(e, "stat", &path)),
        };
        let kind = if metadata.is_dir() {
            EntryKind::Directory
        } else if metadata.is_file() {
            EntryKind::File
        } else {
            return Ok(None);
        };
        Ok(Some(Entry { path, name, kind }))
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list(&self, dir: &Path) -> Result<Vec<Entry>> {
        Self::require_absolute(dir)?;
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(map_io_error(e, "read_dir", dir)),
        };
        let mut listed = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| map_io_error(e, "read_dir", dir))? {
            if let Some(entry) = Self::process_entry(entry).await? {
                listed.push(entry);
            }
        }
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listed)
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        Self::require_absolute(path)?;
        fs::try_exists(path).await.map_err(|e| map_io_error(e, "stat", path))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        Self::require_absolute(path)?;
        fs::read(path).await.map_err(|e| map_io_error(e, "read", path))
    }

    async fn reader(&self, path: &Path) -> Result<BoxSyncRead> {
        Self::require_absolute(path)?;
        let file = fs::File::open(path).await.map_err(|e| map_io_error(e, "open", path))?;
        Ok(Box::new(file.into_std().await))
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        Self::require_absolute(path)?;
        fs::create_dir_all(path).await.map_err(|e| map_io_error(e, "create_dir", path))
    }

    async fn remove_dir_all(&self, path: &Path) -> Result<()> {
        Self::require_absolute(path)?;
        let metadata = fs::symlink_metadata(path).await.map_err(|e| map_io_error(e, "stat", path))?;
        if metadata.is_symlink() {
            return remove_link(path).await;
        }
        if !metadata.is_dir() {
            exn::bail!(ErrorKind::NotADirectory(path.to_path_buf()));
        }
        fs::remove_dir_all(path).await.map_err(|e| map_io_error(e, "remove_dir", path))
    }
}

/// Unix removes a symlink as a file; Windows directory links are removed as
/// directories.
async fn remove_link(path: &Path) -> Result<()> {
    let removed = match fs::remove_file(path).await {
        Err(e) if cfg!(windows) && e.kind() != IoErrorKind::NotFound => fs::remove_dir(path).await,
        other => other,
    };
    removed.map_err(|e| map_io_error(e, "unlink", path))
}
