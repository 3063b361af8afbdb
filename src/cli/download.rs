use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use mapshelf_library::Library;
use mapshelf_library::download::{HttpTransport, RemoteAsset};
use mapshelf_storage::Version;
use std::path::Path;
use std::sync::Arc;

pub async fn run(
    library: &Library,
    descriptor: &Path,
    version: Option<&Version>,
    one_click: bool,
    temp_suffix_len: usize,
) -> Result<()> {
    let raw = tokio::fs::read(descriptor).await.or_raise(|| ErrorKind::Descriptor(descriptor.to_path_buf()))?;
    let asset: RemoteAsset = serde_json::from_slice(&raw).or_raise(|| ErrorKind::Descriptor(descriptor.to_path_buf()))?;

    let downloader = library.downloader(Arc::new(HttpTransport::default()), temp_suffix_len);
    let record = match one_click {
        true => downloader.one_click_download(&asset, version).await,
        false => downloader.download(&asset, version).await,
    }
    .or_raise(|| ErrorKind::Command("download"))?;
    tracing::info!(folder = %record.folder_path().display(), hash = record.content_hash(), "Download complete");
    Ok(())
}
