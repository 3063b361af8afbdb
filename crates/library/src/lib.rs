//! Pipelines over installed maps.
//!
//! Every long-running operation is a lazily polled [`Stream`](futures::Stream)
//! of progress events that ends in a completion event or an `Err`. Dropping
//! the stream cancels the operation; blocking filesystem work already handed
//! to a worker thread still runs to completion.
//!
//! - [`scan`]: load every map folder in an asset root, through the cache.
//! - [`import`]: unpack map archives into an asset root.
//! - [`export`]: bundle map folders into one archive.
//! - [`delete`]: remove map folders, by record or by content hash.
//! - [`download`]: fetch a map from a remote registry and install it.
//!
//! Import and download both finish by calling [`scan::load_one`], so content
//! hashing only ever happens in one place.

mod context;
pub mod delete;
pub mod download;
pub mod enrich;
pub mod error;
pub mod export;
mod guard;
pub mod import;
mod library;
mod progress;
mod record;
pub mod scan;

pub use crate::context::Context;
pub use crate::enrich::{AssetDetails, Enrichment, EnrichmentHandle, NoEnrichment, StaticEnrichment};
pub use crate::library::Library;
pub use crate::progress::Progress;
pub use crate::record::AssetRecord;
use std::time::Duration;

/// Map folders loaded concurrently per scan batch.
pub const DEFAULT_SCAN_CHUNK_SIZE: usize = 50;
/// How long a scan waits for the enrichment source before going without.
pub const DEFAULT_ENRICHMENT_TIMEOUT: Duration = Duration::from_secs(5);
