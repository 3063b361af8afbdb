use crate::Context;
use crate::guard::NewFolderGuard;
use crate::import::error::{ErrorKind, Result};
use crate::import::plan::ImportUnit;
use crate::record::AssetRecord;
use crate::scan::load_one_inner;
use exn::{OptionExt, ResultExt};
use mapshelf_archive::ArchiveReader;
use mapshelf_storage::validate_path;
use std::path::{Path, PathBuf};

/// Extract one map into `<destination>/<unit.folder_name>` and load it.
///
/// A destination that already exists is written over in place, never
/// cleared first. A destination created here is removed again if anything
/// fails, so a failed install leaves no half-extracted folder behind.
#[tracing::instrument(level = "debug", skip_all, fields(archive = %unit.archive.display(), folder = %unit.folder_name))]
pub(crate) async fn install(ctx: &Context, unit: &ImportUnit, destination: &Path) -> Result<AssetRecord> {
    let folder_name = validate_path(&unit.folder_name).or_raise(|| ErrorKind::UnsafeEntry(unit.folder_name.clone()))?;
    let folder = destination.join(folder_name);

    let existed = ctx.backend.exists(&folder).await.or_raise(|| ErrorKind::Storage(folder.clone()))?;
    let guard = match existed {
        true => None,
        false => {
            ctx.backend.create_dir_all(&folder).await.or_raise(|| ErrorKind::Storage(folder.clone()))?;
            Some(NewFolderGuard::new(folder.clone()))
        },
    };

    match extract_and_load(ctx, unit, &folder).await {
        Ok(record) => {
            if let Some(guard) = guard {
                guard.dismiss();
            }
            tracing::info!(folder = %folder.display(), hash = record.content_hash(), "Installed map");
            Ok(record)
        },
        Err(e) => {
            match guard {
                Some(guard) => guard.rollback(&ctx.backend).await,
                None => tracing::warn!(folder = %folder.display(), "Install failed; leaving the existing folder as it is"),
            }
            Err(e)
        },
    }
}

async fn extract_and_load(ctx: &Context, unit: &ImportUnit, folder: &Path) -> Result<AssetRecord> {
    let files = extract(unit.clone(), folder.to_path_buf()).await?;
    tracing::debug!(folder = %folder.display(), files, "Extracted archive entries");

    // Whatever was cached under this name described the old contents.
    ctx.cache.delete(&unit.folder_name);
    load_one_inner(ctx, folder)
        .await
        .or_raise(|| ErrorKind::Load(folder.to_path_buf()))?
        .ok_or_raise(|| ErrorKind::MissingManifest(folder.to_path_buf()))
}

/// Copy every entry under the unit's prefix into `folder`, on a blocking
/// thread. Returns the number of files written.
///
/// Entries are written straight to the local filesystem: the storage backend
/// has no file-write operation.
async fn extract(unit: ImportUnit, folder: PathBuf) -> Result<usize> {
    let worker = tokio::task::spawn_blocking(move || -> Result<usize> {
        let mut reader = ArchiveReader::open(&unit.archive).or_raise(|| ErrorKind::Archive(unit.archive.clone()))?;
        let entries = reader.entries_under(&unit.prefix);
        for name in &entries {
            let relative = name.strip_prefix(unit.prefix.as_str()).unwrap_or(name);
            let relative = validate_path(relative).or_raise(|| ErrorKind::UnsafeEntry(name.clone()))?;
            reader.extract_entry(name, &folder.join(relative)).or_raise(|| ErrorKind::Archive(unit.archive.clone()))?;
        }
        Ok(entries.len())
    });
    worker.await.or_raise(|| ErrorKind::Worker)?
}
