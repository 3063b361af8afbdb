//! CLI Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A CLI error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for CLI commands.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("invalid game version: {_0}")]
    InvalidVersion(#[error(not(source))] String),
    /// The named command failed; the library error is the child.
    #[display("{_0} failed")]
    Command(#[error(not(source))] &'static str),
    #[display("could not read map descriptor {}", _0.display())]
    Descriptor(#[error(not(source))] PathBuf),
    #[display("could not write output")]
    Output,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Output)
    }
}
