use crate::error::{ErrorKind, Result};
use async_stream::stream;
use exn::ResultExt;
use futures::Stream;
use std::fs::{File, create_dir_all};
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Enough buffered events to keep the writer thread from stalling on a slow
/// consumer, without holding the whole file list in the channel.
const EVENT_BUFFER: usize = 32;

/// Progress events emitted by [`ArchiveWriter::finalize`].
///
/// Events follow a strict ordering: [`Started`](Self::Started) once,
/// [`Written`](Self::Written) once per file, then [`Complete`](Self::Complete)
/// once. An error terminates the stream early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteEvent {
    /// Every source has been walked; the number of files to write is known.
    Started { total: u64 },
    /// A file has been added to the archive.
    Written { current: u64, total: u64, name: String },
    /// The archive has been flushed to disk.
    Complete { path: PathBuf, bytes: u64 },
}

struct Source {
    path: PathBuf,
    prefix: Option<String>,
    recurse: bool,
}

/// Builds an outbound zip archive from directories on disk.
///
/// ```no_run
/// use futures::TryStreamExt;
/// use mapshelf_archive::{ArchiveWriter, WriteEvent};
///
/// # async fn example() -> mapshelf_archive::error::Result<()> {
/// let mut writer = ArchiveWriter::new("/tmp/export.zip");
/// writer.add_directory("/games/1.29.1/CustomLevels/1a2b (Song)", Some("1a2b (Song)"), true);
/// let events: Vec<WriteEvent> = writer.finalize().try_collect().await?;
/// # Ok(())
/// # }
/// ```
pub struct ArchiveWriter {
    output: PathBuf,
    sources: Vec<Source>,
}

impl ArchiveWriter {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self { output: output.into(), sources: Vec::new() }
    }

    /// Queue a directory for inclusion. Its files are stored under `prefix`
    /// (or at the archive root when `None`). Without `recurse`, only the
    /// files directly inside `path` are included.
    pub fn add_directory(&mut self, path: impl Into<PathBuf>, prefix: Option<&str>, recurse: bool) -> &mut Self {
        let prefix = prefix.map(|p| p.trim_matches('/').to_string()).filter(|p| !p.is_empty());
        self.sources.push(Source { path: path.into(), prefix, recurse });
        self
    }

    /// Write the archive on a blocking thread, streaming progress.
    ///
    /// Nothing happens until the stream is first polled. Dropping the stream
    /// stops the writer after the file currently being copied; the partially
    /// written archive is left on disk.
    pub fn finalize(self) -> impl Stream<Item = Result<WriteEvent>> + Send + 'static {
        stream! {
            let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);
            let worker = tokio::task::spawn_blocking(move || {
                if let Err(e) = self.write_all(&tx) {
                    // Receiver gone means nobody is listening for the error either.
                    _ = tx.blocking_send(Err(e));
                }
            });
            while let Some(event) = rx.recv().await {
                yield event;
            }
            if let Err(e) = worker.await {
                let stopped: Result<WriteEvent> = Err(e).or_raise(|| ErrorKind::Worker);
                yield stopped;
            }
        }
    }

    fn collect(&self) -> Result<Vec<(PathBuf, String)>> {
        let mut files = Vec::new();
        for source in &self.sources {
            let walker = WalkDir::new(&source.path).follow_links(true).sort_by_file_name();
            let walker = if source.recurse { walker } else { walker.max_depth(1) };
            for entry in walker {
                let entry = entry.or_raise(|| ErrorKind::Io(source.path.clone()))?;
                if !entry.file_type().is_file() || entry.path() == self.output.as_path() {
                    continue;
                }
                let relative = entry.path().strip_prefix(&source.path).or_raise(|| ErrorKind::Io(entry.path().to_path_buf()))?;
                files.push((entry.path().to_path_buf(), entry_name(source.prefix.as_deref(), relative)));
            }
        }
        Ok(files)
    }

    fn write_all(self, tx: &mpsc::Sender<Result<WriteEvent>>) -> Result<()> {
        let files = self.collect()?;
        let total = u64::try_from(files.len()).unwrap_or(u64::MAX);
        if tx.blocking_send(Ok(WriteEvent::Started { total })).is_err() {
            return Ok(());
        }

        if let Some(parent) = self.output.parent() {
            create_dir_all(parent).or_raise(|| ErrorKind::Io(parent.to_path_buf()))?;
        }
        let output = File::create(&self.output).or_raise(|| ErrorKind::Write(self.output.clone()))?;
        let mut zip = ZipWriter::new(output);
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        for (current, (path, name)) in (1..).zip(files) {
            zip.start_file(name.as_str(), options).or_raise(|| ErrorKind::Write(self.output.clone()))?;
            let mut input = File::open(&path).or_raise(|| ErrorKind::Io(path.clone()))?;
            io::copy(&mut input, &mut zip).or_raise(|| ErrorKind::Write(self.output.clone()))?;
            if tx.blocking_send(Ok(WriteEvent::Written { current, total, name })).is_err() {
                tracing::debug!(output = %self.output.display(), "Archive consumer dropped; stopping early");
                return Ok(());
            }
        }

        zip.finish().or_raise(|| ErrorKind::Write(self.output.clone()))?;
        let bytes = std::fs::metadata(&self.output).or_raise(|| ErrorKind::Io(self.output.clone()))?.len();
        tracing::info!(output = %self.output.display(), files = total, bytes, "Archive written");
        _ = tx.blocking_send(Ok(WriteEvent::Complete { path: self.output, bytes }));
        Ok(())
    }
}

/// Zip entry names always use forward slashes.
fn entry_name(prefix: Option<&str>, relative: &Path) -> String {
    let relative = relative.components().map(|c| c.as_os_str().to_string_lossy()).collect::<Vec<_>>().join("/");
    match prefix {
        Some(prefix) => format!("{prefix}/{relative}"),
        None => relative,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArchiveReader;
    use futures::TryStreamExt;
    use rstest::rstest;

    fn populate(root: &Path) {
        std::fs::create_dir_all(root.join("SongA/sub")).unwrap();
        std::fs::create_dir_all(root.join("SongB")).unwrap();
        std::fs::write(root.join("SongA/Info.dat"), b"{}").unwrap();
        std::fs::write(root.join("SongA/sub/extra.dat"), b"x").unwrap();
        std::fs::write(root.join("SongB/Info.dat"), b"{}").unwrap();
    }

    #[rstest]
    #[case(None, "a/b.dat", "a/b.dat")]
    #[case(Some("Song"), "Info.dat", "Song/Info.dat")]
    #[case(Some("Song"), "sub/extra.dat", "Song/sub/extra.dat")]
    fn test_entry_name(#[case] prefix: Option<&str>, #[case] relative: &str, #[case] expected: &str) {
        assert_eq!(entry_name(prefix, Path::new(relative)), expected);
    }

    #[tokio::test]
    async fn test_finalize_writes_selected_directories() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());
        let output = dir.path().join("out/export.zip");
        let mut writer = ArchiveWriter::new(&output);
        writer.add_directory(dir.path().join("SongA"), Some("SongA"), true);
        let events: Vec<WriteEvent> = writer.finalize().try_collect().await.unwrap();

        assert_eq!(events.first(), Some(&WriteEvent::Started { total: 2 }));
        assert!(matches!(events.last(), Some(WriteEvent::Complete { path, bytes }) if path == &output && *bytes > 0));
        assert_eq!(events.len(), 4);

        let reader = ArchiveReader::open(&output).unwrap();
        let mut names = reader.entries_under("");
        names.sort();
        assert_eq!(names, vec!["SongA/Info.dat", "SongA/sub/extra.dat"]);
    }

    #[tokio::test]
    async fn test_finalize_without_recursion() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());
        let output = dir.path().join("flat.zip");
        let mut writer = ArchiveWriter::new(&output);
        writer.add_directory(dir.path().join("SongA"), None, false);
        let _: Vec<WriteEvent> = writer.finalize().try_collect().await.unwrap();
        let reader = ArchiveReader::open(&output).unwrap();
        assert_eq!(reader.entries_under(""), vec!["Info.dat"]);
    }

    #[tokio::test]
    async fn test_finalize_missing_source_errors() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ArchiveWriter::new(dir.path().join("x.zip"));
        writer.add_directory(dir.path().join("nope"), None, true);
        let result: Result<Vec<WriteEvent>> = writer.finalize().try_collect().await;
        assert!(matches!(&*result.unwrap_err(), ErrorKind::Io(_)));
    }
}
