use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use futures::StreamExt;
use mapshelf_library::Library;
use mapshelf_library::export::ExportEvent;
use mapshelf_storage::Version;
use std::path::{Path, PathBuf};
use std::pin::pin;

pub async fn run(library: &Library, folders: &[PathBuf], version: Option<&Version>, output: &Path) -> Result<()> {
    let mut events = pin!(library.export(folders, version, output));
    while let Some(event) = events.next().await {
        match event.or_raise(|| ErrorKind::Command("export"))? {
            ExportEvent::Started { total } => tracing::info!(total, output = %output.display(), "Exporting files"),
            ExportEvent::Written(progress) => {
                tracing::debug!(progress.current, progress.total, name = progress.item.as_deref(), "Written")
            },
            ExportEvent::Complete { path, bytes } => tracing::info!(path = %path.display(), bytes, "Export complete"),
        }
    }
    Ok(())
}
