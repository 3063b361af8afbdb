use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::progress::Tracker;
use crate::record::AssetRecord;
use crate::scan::error::{ErrorKind, Result};
use crate::scan::file::load_one_inner;
use crate::{Context, Progress};
use async_stream::stream;
use exn::ResultExt;
use futures::stream::FuturesUnordered;
use futures::{Stream, StreamExt};
use std::path::{Path, PathBuf};

/// Progress events emitted by [`scan`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started) exactly once.
/// 2. [`DiscoveryComplete`](Self::DiscoveryComplete) exactly once, with the
///    number of subfolders found.
/// 3. [`Loaded`](Self::Loaded) once per subfolder, in completion order.
/// 4. [`Complete`](Self::Complete) exactly once, with every map loaded.
///
/// Only a failure to list the root ends the stream early with an `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    Started,
    DiscoveryComplete(u64),
    /// A subfolder has been processed. `item` is `None` for folders without
    /// a manifest and folders that failed to load.
    Loaded(Progress<AssetRecord>),
    Complete(Vec<AssetRecord>),
}

/// Streams [`ScanEvent`]s while loading every immediate subfolder of `root`.
///
/// First waits (up to the context's timeout) for the enrichment source, so
/// that records come back with details attached. Subfolders are then loaded
/// in batches of the context's chunk size: every load within a batch runs
/// concurrently, batches run one after another. A folder that fails to load
/// is logged and left out. A missing `root` scans as empty.
pub fn scan<'a>(ctx: &'a Context, root: &'a Path) -> impl Stream<Item = LibraryResult<ScanEvent>> + 'a {
    stream! {
        for await event in scan_inner(ctx, root) {
            yield event.or_raise(|| LibraryErrorKind::Scan);
        }
    }
}

pub(crate) fn scan_inner<'a>(ctx: &'a Context, root: &'a Path) -> impl Stream<Item = Result<ScanEvent>> + 'a {
    stream!({
        yield Ok(ScanEvent::Started);

        if !ctx.enrichment.wait_until_ready(ctx.enrichment_timeout).await {
            tracing::warn!(timeout = ?ctx.enrichment_timeout, "Enrichment source not ready; scanning without it");
        }

        let entries = match ctx.backend.list(root).await.or_raise(|| ErrorKind::Storage(root.to_path_buf())) {
            Ok(entries) => entries,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        let folders: Vec<PathBuf> = entries.into_iter().filter(|e| e.is_dir()).map(|e| e.path).collect();
        let mut tracker = Tracker::new(folders.len());
        yield Ok(ScanEvent::DiscoveryComplete(tracker.total()));
        tracing::info!(root = %root.display(), folders = folders.len(), "Scanning map folders");

        let mut records = Vec::with_capacity(folders.len());
        for batch in folders.chunks(ctx.chunk_size.max(1)) {
            let mut loading: FuturesUnordered<_> =
                batch.iter().map(|folder| async move { (folder, load_one_inner(ctx, folder).await) }).collect();
            while let Some((folder, result)) = loading.next().await {
                let record = match result {
                    Ok(record) => record,
                    Err(e) => {
                        tracing::warn!(folder = %folder.display(), error = ?e, "Skipping map folder that failed to load");
                        None
                    },
                };
                if let Some(record) = &record {
                    records.push(record.clone());
                }
                yield Ok(ScanEvent::Loaded(tracker.advance(record)));
            }
        }

        tracing::info!(root = %root.display(), maps = records.len(), "Scan complete");
        yield Ok(ScanEvent::Complete(records));
    })
}
