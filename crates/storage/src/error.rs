//! Storage Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::{Error as IoError, ErrorKind as IoErrorKind};
use std::path::{Path, PathBuf};

/// A storage error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// File or folder does not exist
    #[display("not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Access denied
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// Something is already where a new folder or link should go
    #[display("already exists: {}", _0.display())]
    AlreadyExists(#[error(not(source))] PathBuf),
    /// Expected a directory and found something else
    #[display("not a directory: {}", _0.display())]
    NotADirectory(#[error(not(source))] PathBuf),
    /// Path contains invalid characters or escapes its root
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    /// A version folder is not in the linked/unlinked state the operation needs
    #[display("version folder is {}: {}", if *linked { "already linked" } else { "not linked" }, path.display())]
    LinkState {
        #[error(not(source))]
        path: PathBuf,
        #[error(not(source))]
        linked: bool,
    },
    /// Folder linking isn't available on this platform
    #[display("folder links are not supported on this platform")]
    Unsupported,
    /// Underlying I/O error (the `std::io::Error` is kept as a child frame)
    #[display("I/O error during {op}: {}", path.display())]
    Io {
        #[error(not(source))]
        op: &'static str,
        #[error(not(source))]
        path: PathBuf,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}

/// Classify an I/O error, keeping it as the child of the returned error tree.
#[track_caller]
pub(crate) fn map_io_error(e: IoError, op: &'static str, path: &Path) -> Error {
    let kind = match e.kind() {
        IoErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
        IoErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
        IoErrorKind::AlreadyExists => ErrorKind::AlreadyExists(path.to_path_buf()),
        _ => ErrorKind::Io { op, path: path.to_path_buf() },
    };
    exn::Exn::new(e).raise(kind)
}
