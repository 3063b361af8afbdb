//! Bundling map folders into a single zip archive.

pub mod error;

use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::export::error::{ErrorKind, Result};
use crate::{Context, Progress};
use async_stream::stream;
use exn::ResultExt;
use futures::Stream;
use mapshelf_archive::{ArchiveWriter, WriteEvent};
use std::path::{Path, PathBuf};

/// Progress events emitted by [`export`].
///
/// [`Started`](Self::Started) once, [`Written`](Self::Written) once per file
/// (its `item` is the name inside the archive), then
/// [`Complete`](Self::Complete) once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportEvent {
    Started { total: u64 },
    Written(Progress<String>),
    Complete { path: PathBuf, bytes: u64 },
}

impl From<WriteEvent> for ExportEvent {
    fn from(event: WriteEvent) -> Self {
        match event {
            WriteEvent::Started { total } => Self::Started { total },
            WriteEvent::Written { current, total, name } => Self::Written(Progress { total, current, item: Some(name) }),
            WriteEvent::Complete { path, bytes } => Self::Complete { path, bytes },
        }
    }
}

/// Streams [`ExportEvent`]s while writing `folders` into a zip at `output`.
///
/// Each folder is stored under its own name. Relative folder paths are taken
/// relative to `version_root`. An empty `folders` exports everything in
/// `version_root`, laid out as it is on disk.
pub fn export<'a>(
    ctx: &'a Context,
    folders: &'a [PathBuf],
    version_root: &'a Path,
    output: &'a Path,
) -> impl Stream<Item = LibraryResult<ExportEvent>> + 'a {
    stream! {
        for await event in export_inner(ctx, folders, version_root, output) {
            yield event.or_raise(|| LibraryErrorKind::Export);
        }
    }
}

fn export_inner<'a>(
    ctx: &'a Context,
    folders: &'a [PathBuf],
    version_root: &'a Path,
    output: &'a Path,
) -> impl Stream<Item = Result<ExportEvent>> + 'a {
    stream!({
        let writer = match prepare(ctx, folders, version_root, output).await {
            Ok(writer) => writer,
            Err(e) => {
                yield Err(e);
                return;
            },
        };
        tracing::info!(output = %output.display(), folders = folders.len(), "Exporting maps");
        for await event in writer.finalize() {
            yield event.map(ExportEvent::from).or_raise(|| ErrorKind::Archive(output.to_path_buf()));
        }
    })
}

async fn prepare(ctx: &Context, folders: &[PathBuf], version_root: &Path, output: &Path) -> Result<ArchiveWriter> {
    let mut writer = ArchiveWriter::new(output);
    if folders.is_empty() {
        writer.add_directory(version_root, None, true);
        return Ok(writer);
    }
    for folder in folders {
        let path = version_root.join(folder);
        if !ctx.backend.exists(&path).await.or_raise(|| ErrorKind::Storage(path.clone()))? {
            exn::bail!(ErrorKind::NotFound(path));
        }
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        writer.add_directory(&path, name.as_deref(), true);
    }
    Ok(writer)
}
