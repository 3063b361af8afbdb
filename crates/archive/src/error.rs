//! Archive Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An archive error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The file could not be opened, or is not a zip archive at all.
    #[display("cannot open archive: {}", _0.display())]
    Open(#[error(not(source))] PathBuf),
    /// The archive is readable but an entry is corrupt. Don't retry with the same input.
    #[display("invalid or corrupted archive entry: {_0}")]
    InvalidEntry(#[error(not(source))] String),
    /// The requested entry does not exist in the archive.
    #[display("entry not found: {_0}")]
    EntryNotFound(#[error(not(source))] String),
    /// Creating the output archive failed.
    #[display("cannot write archive: {}", _0.display())]
    Write(#[error(not(source))] PathBuf),
    /// An I/O operation on the local filesystem failed.
    #[display("I/O error: {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
    /// The blocking worker thread panicked or was cancelled.
    #[display("archive worker stopped unexpectedly")]
    Worker,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Io(_) | ErrorKind::Write(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exn::ResultExt;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::EntryNotFound("Info.dat".to_string()).to_string(), "entry not found: Info.dat");
        assert_eq!(ErrorKind::Open(PathBuf::from("/tmp/a.zip")).to_string(), "cannot open archive: /tmp/a.zip");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(!ErrorKind::InvalidEntry("x".to_string()).is_retryable());
        assert!(!ErrorKind::Open(PathBuf::from("a.zip")).is_retryable());
        assert!(ErrorKind::Io(PathBuf::from("a")).is_retryable());
    }

    #[test]
    fn error_from_result() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"));
        let err: Result<()> = result.or_raise(|| ErrorKind::Open(PathBuf::from("missing.zip")));
        let exn = err.unwrap_err();
        assert_eq!(*exn, ErrorKind::Open(PathBuf::from("missing.zip")));
    }
}
