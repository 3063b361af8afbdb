//! Zip archive access for map packages.
//!
//! Map packages travel as zip archives. This crate wraps the [`zip`] crate
//! behind two small types:
//!
//! - [`ArchiveReader`] lists entries (optionally filtered by a [`Regex`](regex::Regex)),
//!   reads them into memory, or streams them straight to disk.
//! - [`ArchiveWriter`] collects directories to bundle and, on
//!   [`finalize`](ArchiveWriter::finalize), writes the archive on a blocking
//!   thread while streaming [`WriteEvent`] progress back to the caller.
//!
//! Entry names are always `/`-separated, regardless of platform.

pub mod error;
mod reader;
mod writer;

pub use crate::reader::ArchiveReader;
pub use crate::writer::{ArchiveWriter, WriteEvent};
