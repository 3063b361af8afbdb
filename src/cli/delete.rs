use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use futures::StreamExt;
use mapshelf_library::Library;
use mapshelf_storage::Version;
use std::pin::pin;

pub async fn run(library: &Library, hashes: &[String], version: Option<&Version>) -> Result<()> {
    let mut progress = pin!(library.delete_by_hashes(hashes, version));
    let mut deleted = 0usize;
    while let Some(step) = progress.next().await {
        let step = step.or_raise(|| ErrorKind::Command("delete"))?;
        match &step.item {
            Some(folder) => {
                deleted += 1;
                tracing::info!(step.current, step.total, folder = %folder.display(), "Deleted");
            },
            None => tracing::info!(step.current, step.total, "Nothing to delete"),
        }
    }
    tracing::info!(deleted, requested = hashes.len(), "Delete complete");
    Ok(())
}
