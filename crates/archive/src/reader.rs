use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use regex::Regex;
use std::fs::{File, create_dir_all};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Read access to an inbound zip archive.
///
/// All operations are synchronous; callers on an async runtime should move
/// the reader into [`spawn_blocking`](tokio::task::spawn_blocking).
pub struct ArchiveReader {
    path: PathBuf,
    archive: ZipArchive<File>,
}

impl ArchiveReader {
    /// Open the archive at `path`, reading its central directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).or_raise(|| ErrorKind::Open(path.clone()))?;
        let archive = ZipArchive::new(file).or_raise(|| ErrorKind::Open(path.clone()))?;
        Ok(Self { path, archive })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries, directories included.
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }

    /// Names of every file entry (directories excluded) matching `pattern`,
    /// in central directory order.
    pub fn entries_matching(&self, pattern: &Regex) -> Vec<String> {
        self.file_names().filter(|name| pattern.is_match(name)).map(str::to_string).collect()
    }

    /// Names of every file entry (directories excluded) that begin with
    /// `prefix`. An empty prefix selects every file in the archive.
    pub fn entries_under(&self, prefix: &str) -> Vec<String> {
        self.file_names().filter(|name| name.starts_with(prefix)).map(str::to_string).collect()
    }

    /// Read a single entry fully into memory.
    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut entry = self.archive.by_name(name).or_raise(|| ErrorKind::EntryNotFound(name.to_string()))?;
        let mut buffer = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry.read_to_end(&mut buffer).or_raise(|| ErrorKind::InvalidEntry(name.to_string()))?;
        Ok(buffer)
    }

    /// Stream a single entry to `destination`, creating parent directories
    /// and overwriting any existing file. Returns the number of bytes written.
    ///
    /// The caller is responsible for making sure `destination` is somewhere
    /// it's allowed to write to; entry names are not interpreted here.
    pub fn extract_entry(&mut self, name: &str, destination: &Path) -> Result<u64> {
        let mut entry = self.archive.by_name(name).or_raise(|| ErrorKind::EntryNotFound(name.to_string()))?;
        if let Some(parent) = destination.parent() {
            create_dir_all(parent).or_raise(|| ErrorKind::Io(parent.to_path_buf()))?;
        }
        let mut output = File::create(destination).or_raise(|| ErrorKind::Io(destination.to_path_buf()))?;
        let written = io::copy(&mut entry, &mut output).or_raise(|| ErrorKind::InvalidEntry(name.to_string()))?;
        tracing::trace!(entry = name, bytes = written, "Extracted archive entry");
        Ok(written)
    }

    fn file_names(&self) -> impl Iterator<Item = &str> {
        // Directory entries are stored with a trailing separator.
        self.archive.file_names().filter(|name| !name.ends_with('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn build_archive(path: &Path, entries: &[(&str, &[u8])]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default();
        for (name, data) in entries {
            if name.ends_with('/') {
                zip.add_directory(*name, options).unwrap();
            } else {
                zip.start_file(*name, options).unwrap();
                zip.write_all(data).unwrap();
            }
        }
        zip.finish().unwrap();
    }

    fn fixture() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pack.zip");
        build_archive(
            &path,
            &[
                ("Pack/", b""),
                ("Pack/SongA/Info.dat", b"{}"),
                ("Pack/SongA/Expert.dat", b"expert"),
                ("Pack/SongB/info.DAT", b"{}"),
                ("readme.txt", b"hello"),
            ],
        );
        (dir, path)
    }

    #[test]
    fn test_open_rejects_non_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.zip");
        std::fs::write(&path, b"definitely not a zip").unwrap();
        let err = ArchiveReader::open(&path).err().unwrap();
        assert_eq!(*err, ErrorKind::Open(path));
    }

    #[rstest]
    #[case(r"(?i)(^|/)info\.dat$", vec!["Pack/SongA/Info.dat", "Pack/SongB/info.DAT"])]
    #[case(r"\.txt$", vec!["readme.txt"])]
    #[case(r"^Pack/$", vec![])]
    fn test_entries_matching(#[case] pattern: &str, #[case] expected: Vec<&str>) {
        let (_dir, path) = fixture();
        let reader = ArchiveReader::open(&path).unwrap();
        let mut found = reader.entries_matching(&Regex::new(pattern).unwrap());
        found.sort();
        assert_eq!(found, expected);
    }

    #[test]
    fn test_entries_under_excludes_directories() {
        let (_dir, path) = fixture();
        let reader = ArchiveReader::open(&path).unwrap();
        let mut under = reader.entries_under("Pack/SongA/");
        under.sort();
        assert_eq!(under, vec!["Pack/SongA/Expert.dat", "Pack/SongA/Info.dat"]);
        assert_eq!(reader.entries_under("").len(), 4);
    }

    #[test]
    fn test_read_and_extract_entry() {
        let (dir, path) = fixture();
        let mut reader = ArchiveReader::open(&path).unwrap();
        assert_eq!(reader.read_entry("Pack/SongA/Expert.dat").unwrap(), b"expert");
        let target = dir.path().join("out/nested/Expert.dat");
        assert_eq!(reader.extract_entry("Pack/SongA/Expert.dat", &target).unwrap(), 6);
        assert_eq!(std::fs::read(&target).unwrap(), b"expert");
        let err = reader.read_entry("Pack/SongC/Info.dat").unwrap_err();
        assert_eq!(*err, ErrorKind::EntryNotFound("Pack/SongC/Info.dat".to_string()));
    }
}
