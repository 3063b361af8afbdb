//! Error types for the [`delete`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A delete error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for delete operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a delete failure.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Checking for or removing the folder failed.
    #[display("could not delete {}", _0.display())]
    Storage(#[error(not(source))] PathBuf),
    /// Scanning the root to find folders by hash failed.
    #[display("could not scan for maps to delete")]
    Scan,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}
