//! In-memory metadata cache for installed maps.
//!
//! The cache is not the source of truth; the map folders on disk are. It
//! remembers what was learned the last time a folder was loaded so that a
//! re-scan doesn't have to re-read and re-hash every chart file.
//!
//! # Architecture
//! Two indexes are kept side by side:
//! - **by folder name**: the primary index, holding a [`CacheEntry`] per
//!   loaded folder. Folder names are unique within one asset root.
//! - **by content hash**: a reverse index from content hash to the folder
//!   name that last produced it, used to resolve deletions by hash.
//!
//! Nothing here touches the filesystem. A cached entry stays valid until the
//! caller evicts it, which every deletion path does.

mod repo;

pub use crate::repo::{CacheEntry, MetadataCache};
