//! Error types for the [`download`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A download error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for download operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a download failure.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fetching the archive failed, or the transport stopped before finishing.
    #[display("could not fetch {_0}")]
    Transport(#[error(not(source))] String),
    /// The descriptor lists no downloadable version.
    #[display("map {_0} has no versions to download")]
    NoVersion(#[error(not(source))] String),
    /// The fetched archive could not be installed.
    #[display("could not install downloaded map")]
    Install,
    /// A local filesystem operation failed (temporary file, destination).
    #[display("I/O error: {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
    /// Working out the destination folder for the version failed.
    #[display("could not resolve destination folder")]
    Resolve,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Io(_))
    }
}
