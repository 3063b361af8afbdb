use serde::{Deserialize, Serialize};

/// Characters Windows refuses in file names; stripped everywhere so folder
/// names stay portable between installations.
const FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// A map as listed by a remote registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAsset {
    pub id: String,
    pub name: String,
    /// Newest first.
    pub versions: Vec<RemoteVersion>,
}

/// One published version of a [`RemoteAsset`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteVersion {
    /// Content hash the registry computed for this version.
    pub hash: String,
    pub download_url: String,
}

impl RemoteAsset {
    /// `"{id} ({name})"`, without characters that aren't allowed in folder
    /// names.
    pub fn folder_name(&self) -> String {
        let raw = format!("{} ({})", self.id, self.name);
        let cleaned: String = raw.chars().filter(|c| !FORBIDDEN.contains(c) && !c.is_control()).collect();
        cleaned.trim_end_matches(['.', ' ']).to_string()
    }

    /// The version to fetch.
    pub fn latest(&self) -> Option<&RemoteVersion> {
        self.versions.first()
    }

    /// Whether any published version has this content hash.
    pub fn declares(&self, content_hash: &str) -> bool {
        self.versions.iter().any(|v| v.hash.eq_ignore_ascii_case(content_hash))
    }
}
