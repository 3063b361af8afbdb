use crate::Context;
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::record::AssetRecord;
use crate::scan::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use mapshelf_manifest::error::ErrorKind as ManifestErrorKind;
use mapshelf_manifest::{compute_hash, is_manifest_name, parse};
use mapshelf_storage::validate_path;
use std::path::Path;

/// Load the map in `folder`.
///
/// A cache hit on the folder's name returns straight away without touching
/// the manifest or any chart file; the cache is trusted to be current.
/// Otherwise the manifest is located (matching `info.dat`
/// case-insensitively), parsed and hashed, and the result cached.
///
/// Returns `Ok(None)` when the folder has no manifest, which is how a
/// non-map folder looks.
pub async fn load_one(ctx: &Context, folder: &Path) -> LibraryResult<Option<AssetRecord>> {
    load_one_inner(ctx, folder).await.or_raise(|| LibraryErrorKind::Scan)
}

#[tracing::instrument(level = "debug", skip_all, fields(folder = %folder.display()))]
pub(crate) async fn load_one_inner(ctx: &Context, folder: &Path) -> Result<Option<AssetRecord>> {
    let folder_name = folder
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_raise(|| ErrorKind::InvalidFolder(folder.to_path_buf()))?;

    if let Some(entry) = ctx.cache.get(folder_name) {
        tracing::debug!(hash = %entry.content_hash, "Cache hit");
        let details = ctx.enrichment.details(&entry.content_hash).await;
        let record = AssetRecord::new(folder.to_path_buf(), entry.manifest.clone(), entry.content_hash.clone(), details);
        return Ok(Some(record));
    }

    let entries = ctx.backend.list(folder).await.or_raise(|| ErrorKind::Storage(folder.to_path_buf()))?;
    let Some(manifest_entry) = entries.into_iter().find(|e| e.is_file() && is_manifest_name(&e.name)) else {
        tracing::debug!("No manifest; not a map folder");
        return Ok(None);
    };
    let raw = ctx.backend.read(&manifest_entry.path).await.or_raise(|| ErrorKind::Storage(manifest_entry.path.clone()))?;
    let manifest = parse(&raw).or_raise(|| ErrorKind::Manifest(folder.to_path_buf()))?;
    let content_hash = hash_folder(ctx, folder, raw).await?;

    ctx.cache.put(folder_name, manifest.clone(), &content_hash);
    let details = ctx.enrichment.details(&content_hash).await;
    tracing::debug!(hash = %content_hash, "Loaded map");
    Ok(Some(AssetRecord::new(folder.to_path_buf(), manifest, content_hash, details)))
}

/// Hash the map on a blocking thread, opening each referenced file through
/// the context's backend.
async fn hash_folder(ctx: &Context, folder: &Path, raw: Vec<u8>) -> Result<String> {
    let backend = ctx.backend.clone();
    let runtime = tokio::runtime::Handle::current();
    let root = folder.to_path_buf();
    let worker = tokio::task::spawn_blocking(move || {
        compute_hash(&root, &raw, |name| {
            let path = validate_path(name)
                .map(|relative| root.join(relative))
                .or_raise(|| ManifestErrorKind::Hash(root.join(name)))?;
            runtime.block_on(backend.reader(&path)).or_raise(|| ManifestErrorKind::Hash(path.clone()))
        })
    });
    worker
        .await
        .or_raise(|| ErrorKind::Worker)?
        .or_raise(|| ErrorKind::Hash(folder.to_path_buf()))
}
