//! Loading map folders.
//!
//! [`load_one`] is the single read path for a map folder: scans, imports and
//! downloads all go through it, and it alone computes content hashes and
//! fills the cache. [`scan`] runs it over every folder in an asset root.

pub mod error;
mod file;
mod stream;

pub(crate) use self::file::load_one_inner;
pub use self::file::load_one;
pub(crate) use self::stream::scan_inner;
pub use self::stream::{ScanEvent, scan};
