use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::import::error::{ErrorKind, Result};
use crate::import::plan::{ImportUnit, plan_all};
use crate::import::unit::install;
use crate::progress::Tracker;
use crate::record::AssetRecord;
use crate::{Context, Progress};
use async_stream::stream;
use exn::ResultExt;
use futures::Stream;
use std::path::{Path, PathBuf};

/// Progress events emitted by [`import`].
///
/// Events follow a strict ordering:
/// 1. [`Planned`](Self::Planned) exactly once, after every archive has been
///    inspected.
/// 2. [`Imported`](Self::Imported) once per map, in planning order. A map
///    that failed is preceded by its `Err` item and has no `item`.
/// 3. [`Complete`](Self::Complete) exactly once.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportEvent {
    Planned { total: u64 },
    Imported(Progress<AssetRecord>),
    Complete(Vec<AssetRecord>),
}

/// Streams [`ImportEvent`]s while unpacking `archives` into `destination`.
///
/// Archives may hold one map (manifest at the root, extracted into a folder
/// named after the archive) or many (extracted into folders named after
/// their innermost folder in the archive). Unreadable archives and archives
/// without maps are skipped; if that leaves nothing to import the stream
/// ends with [`NoAssetsFound`](ErrorKind::NoAssetsFound).
pub fn import<'a>(
    ctx: &'a Context,
    archives: &'a [PathBuf],
    destination: &'a Path,
) -> impl Stream<Item = LibraryResult<ImportEvent>> + 'a {
    stream! {
        for await event in import_inner(ctx, archives, destination) {
            yield event.or_raise(|| LibraryErrorKind::Import);
        }
    }
}

fn import_inner<'a>(
    ctx: &'a Context,
    archives: &'a [PathBuf],
    destination: &'a Path,
) -> impl Stream<Item = Result<ImportEvent>> + 'a {
    stream!({
        let plans = match plan_all(archives.to_vec()).await {
            Ok(plans) => plans,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        let units: Vec<ImportUnit> = plans.iter().flat_map(|plan| plan.units()).collect();
        if units.is_empty() {
            yield Err(exn::Exn::from(ErrorKind::NoAssetsFound));
            return;
        }

        let mut tracker = Tracker::new(units.len());
        tracing::info!(archives = plans.len(), maps = units.len(), destination = %destination.display(), "Import planned");
        yield Ok(ImportEvent::Planned { total: tracker.total() });

        let mut records = Vec::with_capacity(units.len());
        for unit in &units {
            let record = match install(ctx, unit, destination).await {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(archive = %unit.archive.display(), folder = %unit.folder_name, error = ?e, "Map failed to import");
                    yield Err(e);
                    None
                },
            };
            if let Some(record) = &record {
                records.push(record.clone());
            }
            yield Ok(ImportEvent::Imported(tracker.advance(record)));
        }

        tracing::info!(imported = records.len(), failed = units.len() - records.len(), "Import complete");
        yield Ok(ImportEvent::Complete(records));
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use mapshelf_cache::MetadataCache;
    use mapshelf_storage::backend::LocalBackend;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_nothing_to_import() {
        let dir = tempfile::tempdir().unwrap();
        let garbage = dir.path().join("garbage.zip");
        std::fs::write(&garbage, b"not a zip").unwrap();
        let missing = dir.path().join("missing.zip");
        let ctx = Context::new(Arc::new(LocalBackend::new("local")), Arc::new(MetadataCache::new()));

        let archives = vec![garbage, missing];
        let err = import_inner(&ctx, &archives, dir.path()).try_collect::<Vec<_>>().await.unwrap_err();
        assert_eq!(*err, ErrorKind::NoAssetsFound);
        let err = import_inner(&ctx, &[], dir.path()).try_collect::<Vec<_>>().await.unwrap_err();
        assert_eq!(*err, ErrorKind::NoAssetsFound);
    }
}
