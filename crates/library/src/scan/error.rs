//! Error types for the [`scan`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A scan error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for scan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a scan failure.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The path has no final component to use as a folder name.
    #[display("not a map folder path: {}", _0.display())]
    InvalidFolder(#[error(not(source))] PathBuf),
    /// Listing or reading through the storage backend failed.
    #[display("could not read {}", _0.display())]
    Storage(#[error(not(source))] PathBuf),
    /// The manifest exists but doesn't parse.
    #[display("invalid manifest in {}", _0.display())]
    Manifest(#[error(not(source))] PathBuf),
    /// A file the manifest references is missing, unreadable, or points
    /// outside the folder.
    #[display("could not hash {}", _0.display())]
    Hash(#[error(not(source))] PathBuf),
    /// The blocking hash worker panicked or was cancelled.
    #[display("hash worker failed")]
    Worker,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}
