use crate::enrich::AssetDetails;
use mapshelf_manifest::AssetManifest;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A loaded map folder.
///
/// Only [`scan::load_one`](crate::scan::load_one) builds these, so the
/// content hash always comes from the hasher. Two records with the same
/// hash hold the same map, wherever their folders are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRecord {
    manifest: AssetManifest,
    content_hash: String,
    folder_path: PathBuf,
    cover_path: PathBuf,
    audio_path: PathBuf,
    details: Option<AssetDetails>,
}

impl AssetRecord {
    pub(crate) fn new(
        folder_path: PathBuf,
        manifest: AssetManifest,
        content_hash: String,
        details: Option<AssetDetails>,
    ) -> Self {
        let cover_path = folder_path.join(&manifest.cover_filename);
        let audio_path = folder_path.join(&manifest.audio_filename);
        Self { manifest, content_hash, folder_path, cover_path, audio_path, details }
    }

    pub fn manifest(&self) -> &AssetManifest {
        &self.manifest
    }

    /// Lowercase hex SHA-1.
    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn folder_path(&self) -> &Path {
        &self.folder_path
    }

    /// Last component of [`folder_path`](Self::folder_path), which is also
    /// the cache key.
    pub fn folder_name(&self) -> Option<&str> {
        self.folder_path.file_name().and_then(|n| n.to_str())
    }

    pub fn cover_path(&self) -> &Path {
        &self.cover_path
    }

    pub fn audio_path(&self) -> &Path {
        &self.audio_path
    }

    pub fn details(&self) -> Option<&AssetDetails> {
        self.details.as_ref()
    }
}
