use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use futures::StreamExt;
use mapshelf_library::Library;
use mapshelf_library::import::ImportEvent;
use mapshelf_storage::Version;
use std::path::PathBuf;
use std::pin::pin;

pub async fn run(library: &Library, archives: &[PathBuf], version: Option<&Version>) -> Result<()> {
    let mut events = pin!(library.import(archives, version));
    let mut planned = false;
    let mut failed = 0usize;
    while let Some(event) = events.next().await {
        let event = match event {
            Ok(event) => event,
            // Once planned, errors are per map and the import carries on.
            Err(e) if planned => {
                tracing::error!(error = ?e, "Map failed to import");
                failed += 1;
                continue;
            },
            Err(e) => return Err(e).or_raise(|| ErrorKind::Command("import")),
        };
        match event {
            ImportEvent::Planned { total } => {
                planned = true;
                tracing::info!(total, "Importing maps");
            },
            ImportEvent::Imported(progress) => match progress.item {
                Some(record) => tracing::info!(
                    progress.current,
                    progress.total,
                    folder = record.folder_name().unwrap_or("?"),
                    "Imported"
                ),
                None => tracing::info!(progress.current, progress.total, "Skipped"),
            },
            ImportEvent::Complete(records) => tracing::info!(imported = records.len(), failed, "Import complete"),
        }
    }
    Ok(())
}
