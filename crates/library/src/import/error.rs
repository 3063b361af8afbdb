//! Error types for the [`import`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// An import error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for import operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of an import failure.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// None of the archives contained a map. Fatal to the whole import.
    #[display("no maps found in any archive")]
    NoAssetsFound,
    /// The archive could not be opened or an entry could not be extracted.
    #[display("could not extract {}", _0.display())]
    Archive(#[error(not(source))] PathBuf),
    /// An entry name would land outside the destination folder.
    #[display("refusing to extract unsafe entry: {_0}")]
    UnsafeEntry(#[error(not(source))] String),
    /// Creating or inspecting the destination folder failed.
    #[display("could not prepare {}", _0.display())]
    Storage(#[error(not(source))] PathBuf),
    /// Extraction finished but the folder has no manifest.
    #[display("no manifest after extracting into {}", _0.display())]
    MissingManifest(#[error(not(source))] PathBuf),
    /// The extracted folder failed to load (bad manifest, missing charts).
    #[display("extracted folder failed to load: {}", _0.display())]
    Load(#[error(not(source))] PathBuf),
    /// The blocking extraction worker panicked or was cancelled.
    #[display("extraction worker failed")]
    Worker,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Worker)
    }
}
