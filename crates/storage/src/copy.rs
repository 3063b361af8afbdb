use crate::error::{ErrorKind, Result, map_io_error};
use exn::ResultExt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively copy the contents of `from` into `to`, overwriting files that
/// already exist. Returns the number of files copied.
///
/// Symlinks inside `from` are followed. Blocking; see [`copy_dir`].
pub fn copy_dir_all(from: &Path, to: &Path) -> Result<u64> {
    fs::create_dir_all(to).map_err(|e| map_io_error(e, "create_dir", to))?;
    let mut copied = 0;
    for entry in WalkDir::new(from).follow_links(true).min_depth(1) {
        let entry = entry.or_raise(|| ErrorKind::Io { op: "walk", path: from.to_path_buf() })?;
        let relative = entry.path().strip_prefix(from).or_raise(|| ErrorKind::InvalidPath(entry.path().to_path_buf()))?;
        let destination = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination).map_err(|e| map_io_error(e, "create_dir", &destination))?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &destination).map_err(|e| map_io_error(e, "copy", &destination))?;
            copied += 1;
        }
    }
    tracing::debug!(from = %from.display(), to = %to.display(), files = copied, "Copied folder");
    Ok(copied)
}

/// [`copy_dir_all`] on a blocking thread.
pub async fn copy_dir(from: &Path, to: &Path) -> Result<u64> {
    let (from, to): (PathBuf, PathBuf) = (from.to_path_buf(), to.to_path_buf());
    let worker_path = to.clone();
    tokio::task::spawn_blocking(move || copy_dir_all(&from, &to))
        .await
        .or_raise(|| ErrorKind::Io { op: "copy", path: worker_path })?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_copy_dir_overwrites_and_counts() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("from");
        let to = dir.path().join("to");
        fs::create_dir_all(from.join("nested")).unwrap();
        fs::write(from.join("Info.dat"), b"new").unwrap();
        fs::write(from.join("nested/Hard.dat"), b"hard").unwrap();
        fs::create_dir_all(&to).unwrap();
        fs::write(to.join("Info.dat"), b"old").unwrap();
        fs::write(to.join("extra.txt"), b"untouched").unwrap();

        assert_eq!(copy_dir(&from, &to).await.unwrap(), 2);
        assert_eq!(fs::read(to.join("Info.dat")).unwrap(), b"new");
        assert_eq!(fs::read(to.join("nested/Hard.dat")).unwrap(), b"hard");
        assert_eq!(fs::read(to.join("extra.txt")).unwrap(), b"untouched");
    }

    #[test]
    fn test_copy_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = copy_dir_all(&dir.path().join("missing"), &dir.path().join("to")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Io { op: "walk", .. }));
    }
}
