//! Storage backend trait and implementations.
//!
//! Every pipeline reads map folders through a [`StorageBackend`] rather than
//! calling the filesystem directly, which lets tests observe (or forbid)
//! reads, and lets a dry run swap in [`ReadOnlyBackend`].

mod local;
mod ro;

pub use self::local::LocalBackend;
pub use self::ro::ReadOnlyBackend;
use crate::error::Result;
use async_trait::async_trait;
use std::io::Read;
use std::path::{Path, PathBuf};

pub type BoxSyncRead = Box<dyn Read + Send + 'static>;

/// What a directory entry turned out to be, after following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Full path: the listed directory joined with [`name`](Self::name).
    pub path: PathBuf,
    pub name: String,
    pub kind: EntryKind,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Unified interface over the filesystem holding map folders.
///
/// Paths are absolute. Map folders live in several asset roots (one per game
/// version plus the shared pool), so a backend isn't bound to one root.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// # use mapshelf_storage::{backend::StorageBackend, error::Result};
/// async fn count_map_folders(backend: &dyn StorageBackend, root: &Path) -> Result<usize> {
///     let entries = backend.list(root).await?;
///     Ok(entries.iter().filter(|e| e.is_dir()).count())
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the backend, for logging only.
    fn name(&self) -> &str;

    /// List the immediate children of `dir`, sorted by name.
    ///
    /// Symlinks are followed, so a linked folder is reported as a
    /// [`Directory`](EntryKind::Directory). Broken links and special files
    /// are dropped. A directory that doesn't exist lists as empty.
    async fn list(&self, dir: &Path) -> Result<Vec<Entry>>;

    /// Check if a file or folder exists (following symlinks).
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Read file contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Open a file for streaming reads.
    ///
    /// Returns a `'static` boxed [`Read`](std::io::Read) suitable for use
    /// inside [`spawn_blocking`](tokio::task::spawn_blocking). The file is
    /// opened before returning.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::io::Read;
    /// use std::path::Path;
    /// # use mapshelf_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let mut reader = backend.reader(Path::new("/maps/1a2b (Song)/Expert.dat")).await?;
    /// let size = tokio::task::spawn_blocking(move || {
    ///     let mut buf = Vec::new();
    ///     reader.read_to_end(&mut buf).map(|_| buf.len())
    /// }).await.unwrap();
    /// # Ok(())
    /// # }
    /// ```
    async fn reader(&self, path: &Path) -> Result<BoxSyncRead>;

    /// Create a folder and any missing parents.
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Recursively delete a folder.
    ///
    /// A symlinked folder is unlinked, never followed. Returns
    /// [`NotFound`](crate::error::ErrorKind::NotFound) if nothing is there.
    async fn remove_dir_all(&self, path: &Path) -> Result<()>;
}
