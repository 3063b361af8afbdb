//! Manifest Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A manifest error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for manifest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The manifest is not JSON, or matches neither supported schema.
    #[display("malformed manifest: {_0}")]
    Parse(#[error(not(source))] String),
    /// A file referenced by the manifest is missing or unreadable.
    #[display("cannot hash referenced file: {}", _0.display())]
    Hash(#[error(not(source))] PathBuf),
    /// The folder holding the manifest could not be read.
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = ErrorKind::Hash(PathBuf::from("/maps/1a2b/Expert.dat"));
        assert_eq!(err.to_string(), "cannot hash referenced file: /maps/1a2b/Expert.dat");
        let err = ErrorKind::Io { op: "read_dir", path: PathBuf::from("/maps") };
        assert_eq!(err.to_string(), "I/O error during read_dir: /maps");
    }

    #[test]
    fn test_is_retryable() {
        assert!(!ErrorKind::Parse("eof".into()).is_retryable());
        assert!(!ErrorKind::Hash(PathBuf::from("x")).is_retryable());
        assert!(ErrorKind::Io { op: "read", path: PathBuf::from("x") }.is_retryable());
    }
}
