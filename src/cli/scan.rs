use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use futures::StreamExt;
use mapshelf_library::scan::ScanEvent;
use mapshelf_library::{AssetRecord, Library};
use mapshelf_storage::Version;
use std::pin::pin;

pub async fn run(library: &Library, version: Option<&Version>, json: bool) -> Result<()> {
    let mut events = pin!(library.scan(version));
    let mut records = Vec::new();
    while let Some(event) = events.next().await {
        match event.or_raise(|| ErrorKind::Command("scan"))? {
            ScanEvent::Started => tracing::info!(version = version.map(Version::as_str), "Scanning"),
            ScanEvent::DiscoveryComplete(total) => tracing::info!(total, "Found folders"),
            ScanEvent::Loaded(progress) => tracing::debug!(progress.current, progress.total, "Loaded folder"),
            ScanEvent::Complete(loaded) => records = loaded,
        }
    }

    if json {
        let out = serde_json::to_string_pretty(&records).or_raise(|| ErrorKind::Output)?;
        println!("{out}");
        return Ok(());
    }
    for record in &records {
        println!("{}", summary(record));
    }
    tracing::info!(maps = records.len(), "Scan complete");
    Ok(())
}

fn summary(record: &AssetRecord) -> String {
    let manifest = record.manifest();
    let mut line = format!("{}  {}  {} - {}", record.content_hash(), record.folder_name().unwrap_or("?"), manifest.artist, manifest.title);
    if !manifest.mapper.is_empty() {
        line.push_str(&format!(" [{}]", manifest.mapper));
    }
    line
}
