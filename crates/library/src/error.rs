//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Each pipeline module has its own `ErrorKind`; the kinds here only say
//! which pipeline failed, with the module's error tree as the child.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("scan failed")]
    Scan,
    #[display("import failed")]
    Import,
    #[display("export failed")]
    Export,
    #[display("delete failed")]
    Delete,
    #[display("download failed")]
    Download,
    /// Resolving or linking a version folder failed.
    #[display("version folder operation failed")]
    Storage,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Download)
    }
}
