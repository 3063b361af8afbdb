use crate::import::error::{ErrorKind, Result};
use exn::ResultExt;
use mapshelf_archive::ArchiveReader;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Manifest entries anywhere in an archive.
static MANIFEST_ENTRY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(^|/)info\.dat$").unwrap());

/// What one archive holds, worked out before anything is extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportPlan {
    pub path: PathBuf,
    /// The manifest sits at the archive root: the whole archive is one map.
    pub is_single_asset: bool,
    /// For multi-map archives, the folder (inside the archive) of every map,
    /// without a trailing `/`. Empty for single-map archives.
    pub internal_folders: Vec<String>,
}

/// One map to extract: where it comes from and the folder it goes into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportUnit {
    pub(crate) archive: PathBuf,
    /// Only entries starting with this are extracted, with it stripped.
    pub(crate) prefix: String,
    /// Name of the folder created under the destination.
    pub(crate) folder_name: String,
}

impl ImportUnit {
    /// Extract every entry of `archive` into `folder_name`.
    pub(crate) fn whole_archive(archive: impl Into<PathBuf>, folder_name: impl Into<String>) -> Self {
        Self { archive: archive.into(), prefix: String::new(), folder_name: folder_name.into() }
    }
}

impl ImportPlan {
    /// Inspect the archive at `path`. Returns `Ok(None)` when it holds no
    /// manifest at all.
    ///
    /// Blocking.
    pub fn from_archive(path: &Path) -> Result<Option<Self>> {
        let reader = ArchiveReader::open(path).or_raise(|| ErrorKind::Archive(path.to_path_buf()))?;
        let manifests = reader.entries_matching(&MANIFEST_ENTRY);
        Ok(Self::from_manifest_entries(path, &manifests))
    }

    fn from_manifest_entries(path: &Path, manifests: &[String]) -> Option<Self> {
        if manifests.is_empty() {
            return None;
        }
        if manifests.iter().all(|name| !name.contains('/')) {
            return Some(Self { path: path.to_path_buf(), is_single_asset: true, internal_folders: Vec::new() });
        }
        let mut internal_folders = Vec::new();
        for name in manifests {
            match name.rsplit_once('/') {
                Some((folder, _)) if !internal_folders.iter().any(|f| f == folder) => {
                    internal_folders.push(folder.to_string());
                },
                Some(_) => {},
                None => tracing::warn!(archive = %path.display(), "Ignoring top-level manifest in a multi-map archive"),
            }
        }
        Some(Self { path: path.to_path_buf(), is_single_asset: false, internal_folders })
    }

    /// One unit per map, in archive order.
    pub(crate) fn units(&self) -> Vec<ImportUnit> {
        if self.is_single_asset {
            let stem = self.path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
            return vec![ImportUnit::whole_archive(&self.path, stem)];
        }
        self.internal_folders
            .iter()
            .map(|folder| ImportUnit {
                archive: self.path.clone(),
                prefix: format!("{folder}/"),
                folder_name: folder.rsplit('/').next().unwrap_or(folder).to_string(),
            })
            .collect()
    }
}

/// Plan every archive, on a blocking thread. Archives that can't be read or
/// hold no map are logged and left out.
pub(crate) async fn plan_all(archives: Vec<PathBuf>) -> Result<Vec<ImportPlan>> {
    let worker = tokio::task::spawn_blocking(move || {
        archives
            .iter()
            .filter_map(|path| match ImportPlan::from_archive(path) {
                Ok(Some(plan)) => Some(plan),
                Ok(None) => {
                    tracing::warn!(archive = %path.display(), "No maps in archive; skipping");
                    None
                },
                Err(e) => {
                    tracing::warn!(archive = %path.display(), error = ?e, "Unreadable archive; skipping");
                    None
                },
            })
            .collect()
    });
    worker.await.or_raise(|| ErrorKind::Worker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn plan(manifests: &[&str]) -> Option<ImportPlan> {
        let manifests: Vec<String> = manifests.iter().map(ToString::to_string).collect();
        ImportPlan::from_manifest_entries(Path::new("/downloads/MyMap.zip"), &manifests)
    }

    #[rstest]
    #[case("Info.dat", true)]
    #[case("info.DAT", true)]
    #[case("Pack/Song/Info.dat", true)]
    #[case("Pack/Song/NotInfo.dat", false)]
    #[case("Info.dat.bak", false)]
    fn test_manifest_pattern(#[case] name: &str, #[case] matches: bool) {
        assert_eq!(MANIFEST_ENTRY.is_match(name), matches);
    }

    #[test]
    fn test_single_asset_uses_archive_stem() {
        let plan = plan(&["Info.dat"]).unwrap();
        assert!(plan.is_single_asset);
        assert_eq!(plan.units(), vec![ImportUnit::whole_archive("/downloads/MyMap.zip", "MyMap")]);
    }

    #[test]
    fn test_multi_asset_uses_innermost_folders() {
        let plan = plan(&["Pack/SongA/Info.dat", "Pack/Deep/SongB/info.dat", "Info.dat"]).unwrap();
        assert!(!plan.is_single_asset);
        assert_eq!(plan.internal_folders, vec!["Pack/SongA", "Pack/Deep/SongB"]);
        let units = plan.units();
        assert_eq!(units[0].prefix, "Pack/SongA/");
        assert_eq!(units[0].folder_name, "SongA");
        assert_eq!(units[1].prefix, "Pack/Deep/SongB/");
        assert_eq!(units[1].folder_name, "SongB");
    }

    #[test]
    fn test_no_manifest_is_no_plan() {
        assert_eq!(plan(&[]), None);
    }
}
