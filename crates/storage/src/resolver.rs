//! Maps game versions to the folders their custom maps live in.

use crate::error::{ErrorKind, Result, map_io_error};
use crate::link::{FolderLinker, LinkOptions};
use derive_more::Display;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

/// Relative path from a version's installation folder to its maps.
const LEVELS_SUBPATH: [&str; 2] = ["Beat Saber_Data", "CustomLevels"];

/// Name of an installed game version, which is also the name of its
/// installation folder (`1.29.1`, `1.34.2`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub struct Version(String);

impl Version {
    /// A version name must be a single, plain path segment.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let plain = !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\', '\0']);
        if !plain {
            exn::bail!(ErrorKind::InvalidPath(PathBuf::from(name)));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Resolves where maps live for each game version.
///
/// ```text
/// <installations>/<version>/Beat Saber_Data/CustomLevels   one folder per version
/// <shared_pool>                                            maps shared between versions
/// ```
///
/// A version whose folder is a symlink into the shared pool is *linked*;
/// anything written through it lands in the pool.
#[derive(Clone)]
pub struct Resolver {
    installations: PathBuf,
    shared_pool: PathBuf,
    linker: Arc<dyn FolderLinker>,
}

impl Resolver {
    /// Both roots must be absolute; [`LocalBackend`](crate::backend::LocalBackend)
    /// rejects relative paths.
    pub fn new(installations: impl Into<PathBuf>, shared_pool: impl Into<PathBuf>, linker: Arc<dyn FolderLinker>) -> Self {
        Self { installations: installations.into(), shared_pool: shared_pool.into(), linker }
    }

    pub fn installations(&self) -> &Path {
        &self.installations
    }

    pub fn shared_pool(&self) -> &Path {
        &self.shared_pool
    }

    /// Maps folder of `version`, whether or not it exists.
    pub fn levels_path(&self, version: &Version) -> PathBuf {
        LEVELS_SUBPATH.iter().fold(self.installations.join(version.as_str()), |path, part| path.join(part))
    }

    /// Maps folder of `version`, or the shared pool for `None`.
    ///
    /// The shared pool is created on first access; version folders are not.
    pub async fn assets_dir(&self, version: Option<&Version>) -> Result<PathBuf> {
        match version {
            Some(version) => Ok(self.levels_path(version)),
            None => {
                fs::create_dir_all(&self.shared_pool).await.map_err(|e| map_io_error(e, "create_dir", &self.shared_pool))?;
                Ok(self.shared_pool.clone())
            },
        }
    }

    /// [`assets_dir`](Self::assets_dir) with symlinks resolved, for telling
    /// whether two versions actually write to the same place.
    pub async fn canonical_assets_dir(&self, version: Option<&Version>) -> Result<PathBuf> {
        let path = self.assets_dir(version).await?;
        fs::canonicalize(&path).await.map_err(|e| map_io_error(e, "canonicalize", &path))
    }

    /// Only a symlink counts; a missing folder is not linked.
    pub async fn is_linked(&self, version: &Version) -> bool {
        fs::symlink_metadata(self.levels_path(version)).await.is_ok_and(|m| m.is_symlink())
    }

    /// Installed versions, sorted by name. Every subfolder of the
    /// installations root counts. No installations root means no versions.
    pub async fn list_versions(&self) -> Result<Vec<Version>> {
        let mut entries = match fs::read_dir(&self.installations).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(map_io_error(e, "read_dir", &self.installations)),
        };
        let mut versions = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| map_io_error(e, "read_dir", &self.installations))? {
            if !fs::metadata(entry.path()).await.is_ok_and(|m| m.is_dir()) {
                continue;
            }
            match Version::new(entry.file_name().to_string_lossy()) {
                Ok(version) => versions.push(version),
                Err(_) => tracing::debug!(path = %entry.path().display(), "Skipping unusable version folder name"),
            }
        }
        versions.sort();
        Ok(versions)
    }

    pub async fn link_version(&self, version: &Version, options: &LinkOptions) -> Result<()> {
        let path = self.levels_path(version);
        tracing::info!(%version, path = %path.display(), "Linking version to shared pool");
        self.linker.link(&path, options).await
    }

    pub async fn unlink_version(&self, version: &Version, options: &LinkOptions) -> Result<()> {
        let path = self.levels_path(version);
        tracing::info!(%version, path = %path.display(), "Unlinking version from shared pool");
        self.linker.unlink(&path, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::SymlinkLinker;
    use rstest::rstest;

    fn resolver(root: &Path) -> Resolver {
        let shared = root.join("SharedMaps");
        Resolver::new(root.join("Instances"), &shared, Arc::new(SymlinkLinker::new(&shared)))
    }

    #[rstest]
    #[case("1.29.1", true)]
    #[case("1.34.2 (modded)", true)]
    #[case("", false)]
    #[case("..", false)]
    #[case("a/b", false)]
    #[case("a\\b", false)]
    fn test_version_names(#[case] name: &str, #[case] valid: bool) {
        assert_eq!(Version::new(name).is_ok(), valid);
    }

    #[tokio::test]
    async fn test_assets_dir() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = resolver(dir.path());
        let version = Version::new("1.29.1").unwrap();
        assert_eq!(
            resolver.assets_dir(Some(&version)).await.unwrap(),
            dir.path().join("Instances/1.29.1/Beat Saber_Data/CustomLevels")
        );
        assert!(!dir.path().join("SharedMaps").exists());
        assert_eq!(resolver.assets_dir(None).await.unwrap(), dir.path().join("SharedMaps"));
        assert!(dir.path().join("SharedMaps").is_dir());
    }

    #[tokio::test]
    async fn test_list_versions() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = resolver(dir.path());
        assert!(resolver.list_versions().await.unwrap().is_empty());
        std::fs::create_dir_all(dir.path().join("Instances/1.34.2")).unwrap();
        std::fs::create_dir_all(dir.path().join("Instances/1.29.1")).unwrap();
        std::fs::write(dir.path().join("Instances/notes.txt"), b"").unwrap();
        let versions: Vec<String> = resolver.list_versions().await.unwrap().iter().map(ToString::to_string).collect();
        assert_eq!(versions, vec!["1.29.1", "1.34.2"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_link_round_trip_and_detection() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = resolver(dir.path());
        let linked = Version::new("1.29.1").unwrap();
        let plain = Version::new("1.34.2").unwrap();
        std::fs::create_dir_all(resolver.levels_path(&linked)).unwrap();
        std::fs::create_dir_all(resolver.levels_path(&plain)).unwrap();

        assert!(!resolver.is_linked(&linked).await);
        resolver.link_version(&linked, &LinkOptions::default()).await.unwrap();
        assert!(resolver.is_linked(&linked).await);
        assert!(!resolver.is_linked(&plain).await);
        assert!(!resolver.is_linked(&Version::new("9.9.9").unwrap()).await);

        let shared = resolver.canonical_assets_dir(None).await.unwrap();
        assert_eq!(resolver.canonical_assets_dir(Some(&linked)).await.unwrap(), shared);
        assert_ne!(resolver.canonical_assets_dir(Some(&plain)).await.unwrap(), shared);

        resolver.unlink_version(&linked, &LinkOptions::default()).await.unwrap();
        assert!(!resolver.is_linked(&linked).await);
    }
}
