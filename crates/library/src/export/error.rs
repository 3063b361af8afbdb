//! Error types for the [`export`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An export error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of an export failure.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A folder asked for doesn't exist.
    #[display("no such map folder: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Checking a folder through the storage backend failed.
    #[display("could not read {}", _0.display())]
    Storage(#[error(not(source))] PathBuf),
    /// Writing the archive failed.
    #[display("could not write archive {}", _0.display())]
    Archive(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Archive(_))
    }
}
