use crate::enrich::{EnrichmentHandle, NoEnrichment};
use crate::{DEFAULT_ENRICHMENT_TIMEOUT, DEFAULT_SCAN_CHUNK_SIZE};
use mapshelf_cache::MetadataCache;
use mapshelf_storage::BackendHandle;
use std::sync::Arc;
use std::time::Duration;

/// Everything a pipeline needs besides its arguments.
///
/// Cheap to clone; the backend, cache and enrichment source are shared.
#[derive(Clone)]
pub struct Context {
    pub backend: BackendHandle,
    pub cache: Arc<MetadataCache>,
    pub enrichment: EnrichmentHandle,
    pub chunk_size: usize,
    pub enrichment_timeout: Duration,
}

impl Context {
    pub fn new(backend: BackendHandle, cache: Arc<MetadataCache>) -> Self {
        Self {
            backend,
            cache,
            enrichment: Arc::new(NoEnrichment),
            chunk_size: DEFAULT_SCAN_CHUNK_SIZE,
            enrichment_timeout: DEFAULT_ENRICHMENT_TIMEOUT,
        }
    }

    pub fn with_enrichment(mut self, enrichment: EnrichmentHandle) -> Self {
        self.enrichment = enrichment;
        self
    }

    /// Zero is treated as one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_enrichment_timeout(mut self, timeout: Duration) -> Self {
        self.enrichment_timeout = timeout;
        self
    }
}
