//! Optional metadata from a remote map registry.
//!
//! Records are built from what's on disk; an [`Enrichment`] source can add
//! what only the registry knows (ratings, uploader, ranked status), keyed by
//! content hash. Sources that fill a local index in the background report
//! when they're ready through [`wait_until_ready`](Enrichment::wait_until_ready).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Registry metadata for one map version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDetails {
    /// Registry key of the map (not of the version).
    pub id: String,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub upvotes: u64,
    #[serde(default)]
    pub downvotes: u64,
    #[serde(default)]
    pub ranked: bool,
}

#[async_trait]
pub trait Enrichment: Send + Sync {
    /// Details for the map with this content hash, if known.
    async fn details(&self, content_hash: &str) -> Option<AssetDetails>;

    /// Wait up to `timeout` for the source to finish warming up. Returns
    /// `false` on timeout.
    async fn wait_until_ready(&self, timeout: Duration) -> bool;
}

pub type EnrichmentHandle = Arc<dyn Enrichment>;

/// Knows nothing and is always ready.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEnrichment;

#[async_trait]
impl Enrichment for NoEnrichment {
    async fn details(&self, _content_hash: &str) -> Option<AssetDetails> {
        None
    }

    async fn wait_until_ready(&self, _timeout: Duration) -> bool {
        true
    }
}

/// A fixed, in-memory table of details, e.g. loaded from a registry dump.
#[derive(Debug, Clone, Default)]
pub struct StaticEnrichment {
    by_hash: HashMap<String, AssetDetails>,
}

impl StaticEnrichment {
    pub fn new(entries: impl IntoIterator<Item = (String, AssetDetails)>) -> Self {
        let by_hash = entries.into_iter().map(|(hash, details)| (hash.to_ascii_lowercase(), details)).collect();
        Self { by_hash }
    }
}

#[async_trait]
impl Enrichment for StaticEnrichment {
    async fn details(&self, content_hash: &str) -> Option<AssetDetails> {
        self.by_hash.get(&content_hash.to_ascii_lowercase()).cloned()
    }

    async fn wait_until_ready(&self, _timeout: Duration) -> bool {
        true
    }
}
