//! Configuration loading and validation.
//!
//! Sources are merged in increasing order of precedence:
//!
//! 1. Built-in defaults (platform data directory via `directories`)
//! 2. `config.toml`, `config.yaml` and `config.json` in the platform config
//!    directory, whichever exist
//! 3. An explicit config file (`--config`), format picked by extension
//! 4. `MAPSHELF_`-prefixed environment variables, `__` separating nested
//!    keys (`MAPSHELF_SCAN__CHUNK_SIZE=100`)

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "MAPSHELF_";
pub const DEFAULT_SCAN_CHUNK_SIZE: usize = 50;
pub const DEFAULT_ENRICHMENT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_TEMP_SUFFIX_LEN: usize = 8;
/// Longer suffixes only make temporary archive names unwieldy.
const MAX_TEMP_SUFFIX_LEN: usize = 32;

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "mapshelf")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Folder holding one subfolder per installed game version.
    pub installations: PathBuf,
    /// Folder holding maps shared between linked versions.
    pub shared_pool: PathBuf,
    pub scan: ScanConfig,
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Folders loaded concurrently per batch.
    pub chunk_size: usize,
    /// How long a scan waits for the enrichment source to warm up.
    pub enrichment_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Random characters appended to temporary download filenames.
    pub temp_suffix_len: usize,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = project_dirs().map(|dirs| dirs.data_dir().to_path_buf()).unwrap_or_default();
        Self {
            installations: data_dir.join("BSInstances"),
            shared_pool: data_dir.join("SharedContent").join("SharedMaps"),
            scan: ScanConfig::default(),
            download: DownloadConfig::default(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_SCAN_CHUNK_SIZE, enrichment_timeout_ms: DEFAULT_ENRICHMENT_TIMEOUT_MS }
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self { temp_suffix_len: DEFAULT_TEMP_SUFFIX_LEN }
    }
}

impl ScanConfig {
    pub fn enrichment_timeout(&self) -> Duration {
        Duration::from_millis(self.enrichment_timeout_ms)
    }
}

impl Config {
    /// Load, merge and validate every configuration source.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config_dir = project_dirs().map(|dirs| dirs.config_dir().to_path_buf());
        Self::from_figment(Self::figment(config_dir.as_deref(), explicit)?)
    }

    /// Build the layered [`Figment`] without extracting it.
    pub fn figment(config_dir: Option<&Path>, explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(dir) = config_dir {
            tracing::debug!(dir = %dir.display(), "Looking for platform config files");
            figment = figment
                .merge(Toml::file(dir.join("config.toml")))
                .merge(Yaml::file(dir.join("config.yaml")))
                .merge(Json::file(dir.join("config.json")));
        }
        if let Some(path) = explicit {
            figment = merge_explicit(figment, path)?;
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extract and validate. Relative folders are resolved against the
    /// working directory.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let mut config: Self = figment.extract().or_raise(|| ErrorKind::Load)?;
        config.installations = absolute(&config.installations, "installations")?;
        config.shared_pool = absolute(&config.shared_pool, "shared_pool")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.installations.is_absolute() {
            exn::bail!(ErrorKind::Invalid("installations"));
        }
        if !self.shared_pool.is_absolute() {
            exn::bail!(ErrorKind::Invalid("shared_pool"));
        }
        if self.scan.chunk_size == 0 {
            exn::bail!(ErrorKind::Invalid("scan.chunk_size"));
        }
        if !(1..=MAX_TEMP_SUFFIX_LEN).contains(&self.download.temp_suffix_len) {
            exn::bail!(ErrorKind::Invalid("download.temp_suffix_len"));
        }
        Ok(())
    }
}

fn absolute(path: &Path, field: &'static str) -> Result<PathBuf> {
    std::path::absolute(path).or_raise(|| ErrorKind::Invalid(field))
}

/// Unlike the platform files, an explicit file must exist.
fn merge_explicit(figment: Figment, path: &Path) -> Result<Figment> {
    if !path.is_file() {
        exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
    }
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    let figment = match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file_exact(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
    };
    tracing::debug!(path = %path.display(), "Merged explicit config file");
    Ok(figment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    fn load_in(jail: &Jail, explicit: Option<&str>) -> Result<Config> {
        Config::from_figment(Config::figment(Some(jail.directory()), explicit.map(Path::new))?)
    }

    #[test]
    fn test_defaults() {
        Jail::expect_with(|jail| {
            let config = load_in(jail, None).map_err(|e| e.to_string())?;
            assert_eq!(config.scan.chunk_size, 50);
            assert_eq!(config.scan.enrichment_timeout(), Duration::from_secs(5));
            assert_eq!(config.download.temp_suffix_len, 8);
            assert!(config.installations.ends_with("BSInstances"));
            assert!(config.shared_pool.ends_with("SharedContent/SharedMaps"));
            Ok(())
        });
    }

    #[test]
    fn test_layering() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "installations = \"/games\"\n[scan]\nchunk_size = 10\n")?;
            jail.create_file("override.yaml", "scan:\n  enrichment_timeout_ms: 250\n")?;
            jail.set_env("MAPSHELF_SCAN__CHUNK_SIZE", "20");
            jail.set_env("MAPSHELF_SHARED_POOL", "/pool");
            let config = load_in(jail, Some("override.yaml")).map_err(|e| e.to_string())?;
            assert_eq!(config.installations, PathBuf::from("/games"));
            assert_eq!(config.shared_pool, PathBuf::from("/pool"));
            assert_eq!(config.scan.chunk_size, 20);
            assert_eq!(config.scan.enrichment_timeout_ms, 250);
            Ok(())
        });
    }

    #[rstest]
    #[case("MAPSHELF_SCAN__CHUNK_SIZE", "0", "scan.chunk_size")]
    #[case("MAPSHELF_DOWNLOAD__TEMP_SUFFIX_LEN", "0", "download.temp_suffix_len")]
    #[case("MAPSHELF_DOWNLOAD__TEMP_SUFFIX_LEN", "64", "download.temp_suffix_len")]
    fn test_validation(#[case] key: &str, #[case] value: &str, #[case] field: &'static str) {
        Jail::expect_with(|jail| {
            jail.set_env(key, value);
            let err = load_in(jail, None).unwrap_err();
            assert_eq!(*err, ErrorKind::Invalid(field));
            Ok(())
        });
    }

    #[rstest]
    #[case::relative("installations = \"Instances\"", Some("Instances"))]
    #[case::empty("installations = \"\"", None)]
    fn test_installations_resolved_against_working_dir(#[case] toml: &str, #[case] expected: Option<&str>) {
        Jail::expect_with(|jail| {
            jail.create_file("paths.toml", toml)?;
            let cwd = std::env::current_dir().map_err(|e| e.to_string())?;
            match (load_in(jail, Some("paths.toml")), expected) {
                (Ok(config), Some(relative)) => {
                    assert!(config.installations.is_absolute());
                    assert_eq!(config.installations, cwd.join(relative));
                },
                (Err(err), None) => assert_eq!(*err, ErrorKind::Invalid("installations")),
                (other, _) => panic!("unexpected result: {other:?}"),
            }
            Ok(())
        });
    }

    #[rstest]
    #[case::installations(PathBuf::from("Instances"), std::env::temp_dir().join("pool"), "installations")]
    #[case::shared_pool(std::env::temp_dir().join("games"), PathBuf::from("SharedMaps"), "shared_pool")]
    fn test_validate_rejects_relative_folders(
        #[case] installations: PathBuf,
        #[case] shared_pool: PathBuf,
        #[case] field: &'static str,
    ) {
        let config = Config { installations, shared_pool, ..Config::default() };
        assert_eq!(*config.validate().unwrap_err(), ErrorKind::Invalid(field));
    }

    #[test]
    fn test_explicit_file_errors() {
        Jail::expect_with(|jail| {
            let err = load_in(jail, Some("missing.toml")).unwrap_err();
            assert_eq!(*err, ErrorKind::NotFound(PathBuf::from("missing.toml")));

            jail.create_file("config.ini", "chunk_size = 1")?;
            let err = load_in(jail, Some("config.ini")).unwrap_err();
            assert_eq!(*err, ErrorKind::UnsupportedFormat(PathBuf::from("config.ini")));

            jail.create_file("broken.toml", "scan = \"not a table\"")?;
            let err = load_in(jail, Some("broken.toml")).unwrap_err();
            assert_eq!(*err, ErrorKind::Load);
            Ok(())
        });
    }
}
