//! Folder linking between a game version and the shared pool.

use crate::copy::copy_dir;
use crate::error::{ErrorKind, Result, map_io_error};
use async_trait::async_trait;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// How a version folder is attached to or detached from the shared pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkOptions {
    /// Linking: move the folder's existing maps into the pool first.
    /// Unlinking: copy the pool's maps back into the new real folder.
    pub keep_contents: bool,
    /// Link to this subfolder of the pool instead of the pool itself.
    pub intermediate_folder: Option<String>,
}

/// Replaces a folder with a link to shared storage, and back.
#[async_trait]
pub trait FolderLinker: Send + Sync {
    async fn link(&self, path: &Path, options: &LinkOptions) -> Result<()>;
    async fn unlink(&self, path: &Path, options: &LinkOptions) -> Result<()>;
}

/// [`FolderLinker`] backed by directory symlinks.
#[derive(Debug, Clone)]
pub struct SymlinkLinker {
    shared_root: PathBuf,
}

impl SymlinkLinker {
    pub fn new(shared_root: impl Into<PathBuf>) -> Self {
        Self { shared_root: shared_root.into() }
    }

    fn target(&self, options: &LinkOptions) -> Result<PathBuf> {
        match options.intermediate_folder.as_deref() {
            Some(sub) => Ok(self.shared_root.join(crate::path::validate(sub)?)),
            None => Ok(self.shared_root.clone()),
        }
    }
}

async fn is_symlink(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path).await {
        Ok(metadata) => Ok(metadata.is_symlink()),
        Err(e) if e.kind() == IoErrorKind::NotFound => Ok(false),
        Err(e) => Err(map_io_error(e, "stat", path)),
    }
}

/// Move every child of `from` into `to`, leaving children whose name is
/// already taken in `to` behind.
async fn move_children(from: &Path, to: &Path) -> Result<()> {
    let mut entries = fs::read_dir(from).await.map_err(|e| map_io_error(e, "read_dir", from))?;
    while let Some(entry) = entries.next_entry().await.map_err(|e| map_io_error(e, "read_dir", from))? {
        let destination = to.join(entry.file_name());
        if fs::try_exists(&destination).await.map_err(|e| map_io_error(e, "stat", &destination))? {
            tracing::warn!(path = %entry.path().display(), "Already present in shared folder; discarding local copy");
            continue;
        }
        let source = entry.path();
        if let Err(e) = fs::rename(&source, &destination).await {
            // Probably crossing filesystems: fall back to copy and delete.
            tracing::debug!(path = %source.display(), error = %e, "Rename failed; copying instead");
            copy_dir(&source, &destination).await?;
        }
    }
    Ok(())
}

#[cfg(unix)]
async fn create_link(target: &Path, link: &Path) -> Result<()> {
    fs::symlink(target, link).await.map_err(|e| map_io_error(e, "symlink", link))
}

#[cfg(windows)]
async fn create_link(target: &Path, link: &Path) -> Result<()> {
    fs::symlink_dir(target, link).await.map_err(|e| map_io_error(e, "symlink", link))
}

#[cfg(not(any(unix, windows)))]
async fn create_link(_target: &Path, _link: &Path) -> Result<()> {
    exn::bail!(ErrorKind::Unsupported)
}

#[async_trait]
impl FolderLinker for SymlinkLinker {
    #[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
    async fn link(&self, path: &Path, options: &LinkOptions) -> Result<()> {
        if is_symlink(path).await? {
            exn::bail!(ErrorKind::LinkState { path: path.to_path_buf(), linked: true });
        }
        let target = self.target(options)?;
        fs::create_dir_all(&target).await.map_err(|e| map_io_error(e, "create_dir", &target))?;

        match fs::metadata(path).await {
            Ok(metadata) if !metadata.is_dir() => exn::bail!(ErrorKind::NotADirectory(path.to_path_buf())),
            Ok(_) => {
                if options.keep_contents {
                    move_children(path, &target).await?;
                }
                fs::remove_dir_all(path).await.map_err(|e| map_io_error(e, "remove_dir", path))?;
            },
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent).await.map_err(|e| map_io_error(e, "create_dir", parent))?;
                }
            },
            Err(e) => return Err(map_io_error(e, "stat", path)),
        }

        create_link(&target, path).await?;
        tracing::info!(path = %path.display(), target = %target.display(), "Linked folder to shared storage");
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
    async fn unlink(&self, path: &Path, options: &LinkOptions) -> Result<()> {
        if !is_symlink(path).await? {
            exn::bail!(ErrorKind::LinkState { path: path.to_path_buf(), linked: false });
        }
        let target = fs::read_link(path).await.map_err(|e| map_io_error(e, "read_link", path))?;
        let target = match target.is_absolute() {
            true => target,
            false => path.parent().map(|p| p.join(&target)).unwrap_or(target),
        };

        let removed = match fs::remove_file(path).await {
            Err(e) if cfg!(windows) => fs::remove_dir(path).await.or(Err(e)),
            other => other,
        };
        removed.map_err(|e| map_io_error(e, "unlink", path))?;
        fs::create_dir_all(path).await.map_err(|e| map_io_error(e, "create_dir", path))?;

        if options.keep_contents && fs::try_exists(&target).await.map_err(|e| map_io_error(e, "stat", &target))? {
            let copied = copy_dir(&target, path).await?;
            tracing::info!(path = %path.display(), files = copied, "Copied shared maps back into folder");
        }
        tracing::info!(path = %path.display(), "Unlinked folder from shared storage");
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use rstest::rstest;

    fn setup() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let version = dir.path().join("1.29.1/Beat Saber_Data/CustomLevels");
        let shared = dir.path().join("SharedMaps");
        std::fs::create_dir_all(version.join("Local Song")).unwrap();
        std::fs::write(version.join("Local Song/Info.dat"), b"{}").unwrap();
        (dir, version, shared)
    }

    #[rstest]
    #[case(true, true)]
    #[case(false, false)]
    #[tokio::test]
    async fn test_link(#[case] keep_contents: bool, #[case] moved: bool) {
        let (_dir, version, shared) = setup();
        let linker = SymlinkLinker::new(&shared);
        let options = LinkOptions { keep_contents, intermediate_folder: None };
        linker.link(&version, &options).await.unwrap();

        assert!(std::fs::symlink_metadata(&version).unwrap().is_symlink());
        assert_eq!(std::fs::read_link(&version).unwrap(), shared);
        assert_eq!(shared.join("Local Song/Info.dat").exists(), moved);
        assert_eq!(version.join("Local Song/Info.dat").exists(), moved);
    }

    #[tokio::test]
    async fn test_link_intermediate_folder_and_conflicts() {
        let (_dir, version, shared) = setup();
        std::fs::create_dir_all(shared.join("Pool/Local Song")).unwrap();
        std::fs::write(shared.join("Pool/Local Song/Info.dat"), b"shared").unwrap();
        let linker = SymlinkLinker::new(&shared);
        let options = LinkOptions { keep_contents: true, intermediate_folder: Some("Pool".into()) };
        linker.link(&version, &options).await.unwrap();

        assert_eq!(std::fs::read_link(&version).unwrap(), shared.join("Pool"));
        // The pool's copy wins.
        assert_eq!(std::fs::read(version.join("Local Song/Info.dat")).unwrap(), b"shared");

        let err = linker.link(&version, &options).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::LinkState { linked: true, .. }));
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    #[tokio::test]
    async fn test_unlink(#[case] keep_contents: bool) {
        let (_dir, version, shared) = setup();
        let linker = SymlinkLinker::new(&shared);
        let options = LinkOptions { keep_contents: true, intermediate_folder: None };
        linker.link(&version, &options).await.unwrap();

        let options = LinkOptions { keep_contents, intermediate_folder: None };
        linker.unlink(&version, &options).await.unwrap();
        let metadata = std::fs::symlink_metadata(&version).unwrap();
        assert!(metadata.is_dir() && !metadata.is_symlink());
        assert_eq!(version.join("Local Song/Info.dat").exists(), keep_contents);
        assert!(shared.join("Local Song/Info.dat").exists());

        let err = linker.unlink(&version, &options).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::LinkState { linked: false, .. }));
    }
}
