//! Removing map folders and their cache entries.
//!
//! Both entry points stream one [`Progress`] per candidate folder, whether or
//! not there was anything on disk to remove, so `current` always reaches
//! `total`. The first failure ends the stream; folders already removed stay
//! removed.

pub mod error;

use crate::delete::error::{ErrorKind, Result};
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::progress::Tracker;
use crate::record::AssetRecord;
use crate::scan::{ScanEvent, scan_inner};
use crate::{Context, Progress};
use async_stream::stream;
use exn::ResultExt;
use futures::{Stream, StreamExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::pin::pin;

/// Delete the folders of `records`.
///
/// Each item is the removed folder, or `None` if it was already gone.
pub fn delete_assets<'a>(
    ctx: &'a Context,
    records: &'a [AssetRecord],
) -> impl Stream<Item = LibraryResult<Progress<PathBuf>>> + 'a {
    stream! {
        let candidates = records.iter().map(|record| Some(record.folder_path().to_path_buf())).collect();
        for await event in delete_candidates(ctx, candidates) {
            yield event.or_raise(|| LibraryErrorKind::Delete);
        }
    }
}

/// Delete every folder under `root` holding a map with one of `hashes`.
///
/// Only folders directly under `root` are candidates: `root` is scanned,
/// which costs nothing beyond a listing for folders the cache already knows.
/// Every folder carrying a matching hash is removed, duplicates included. A
/// hash that matches no folder still counts towards the total, with a `None`
/// item.
pub fn delete_by_hashes<'a>(
    ctx: &'a Context,
    hashes: &'a [String],
    root: &'a Path,
) -> impl Stream<Item = LibraryResult<Progress<PathBuf>>> + 'a {
    stream! {
        for await event in delete_by_hashes_inner(ctx, hashes, root) {
            yield event.or_raise(|| LibraryErrorKind::Delete);
        }
    }
}

fn delete_by_hashes_inner<'a>(
    ctx: &'a Context,
    hashes: &'a [String],
    root: &'a Path,
) -> impl Stream<Item = Result<Progress<PathBuf>>> + 'a {
    stream!({
        let candidates = match resolve_hashes(ctx, hashes, root).await {
            Ok(candidates) => candidates,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        for await event in delete_candidates(ctx, candidates) {
            yield event;
        }
    })
}

async fn resolve_hashes(ctx: &Context, hashes: &[String], root: &Path) -> Result<Vec<Option<PathBuf>>> {
    let mut scanned = scan_hashes(ctx, root).await?;
    let mut candidates = Vec::with_capacity(hashes.len());
    for hash in hashes {
        match scanned.remove(&hash.to_ascii_lowercase()) {
            Some(folders) => candidates.extend(folders.into_iter().map(Some)),
            None => candidates.push(None),
        }
    }
    Ok(candidates)
}

/// Folders under `root`, grouped by content hash.
async fn scan_hashes(ctx: &Context, root: &Path) -> Result<HashMap<String, Vec<PathBuf>>> {
    let mut events = pin!(scan_inner(ctx, root));
    let mut by_hash: HashMap<String, Vec<PathBuf>> = HashMap::new();
    while let Some(event) = events.next().await {
        if let ScanEvent::Complete(records) = event.or_raise(|| ErrorKind::Scan)? {
            for record in records {
                by_hash.entry(record.content_hash().to_string()).or_default().push(record.folder_path().to_path_buf());
            }
        }
    }
    Ok(by_hash)
}

fn delete_candidates(ctx: &Context, candidates: Vec<Option<PathBuf>>) -> impl Stream<Item = Result<Progress<PathBuf>>> + '_ {
    stream!({
        let mut tracker = Tracker::new(candidates.len());
        tracing::info!(folders = candidates.len(), "Deleting maps");
        for candidate in candidates {
            let removed = match candidate {
                Some(path) => match remove_folder(ctx, &path).await {
                    Ok(true) => Some(path),
                    Ok(false) => None,
                    Err(e) => {
                        yield Err(e);
                        return;
                    },
                },
                None => None,
            };
            yield Ok(tracker.advance(removed));
        }
    })
}

/// Returns whether there was a folder to remove.
async fn remove_folder(ctx: &Context, path: &Path) -> Result<bool> {
    if !ctx.backend.exists(path).await.or_raise(|| ErrorKind::Storage(path.to_path_buf()))? {
        tracing::debug!(folder = %path.display(), "Already gone");
        return Ok(false);
    }
    ctx.backend.remove_dir_all(path).await.or_raise(|| ErrorKind::Storage(path.to_path_buf()))?;
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        ctx.cache.delete(name);
    }
    tracing::info!(folder = %path.display(), "Deleted map");
    Ok(true)
}
