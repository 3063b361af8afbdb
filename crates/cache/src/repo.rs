use mapshelf_manifest::AssetManifest;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// What the cache remembers about one map folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub folder_name: String,
    pub manifest: AssetManifest,
    /// Lowercase hex.
    pub content_hash: String,
}

#[derive(Debug, Default)]
struct Indexes {
    by_folder: HashMap<String, Arc<CacheEntry>>,
    by_hash: HashMap<String, String>,
}

/// Process-wide metadata cache, shared between pipelines behind an [`Arc`].
///
/// Reads never block each other. Writes are serialized internally, but two
/// pipelines working on the *same* folder name must still be sequenced by
/// the caller: the cache only guarantees that each call is atomic.
#[derive(Debug, Default)]
pub struct MetadataCache {
    inner: RwLock<Indexes>,
}

impl MetadataCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a folder by name. Does not check the folder still exists.
    pub fn get(&self, folder_name: &str) -> Option<Arc<CacheEntry>> {
        let indexes = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        indexes.by_folder.get(folder_name).cloned()
    }

    /// Insert or replace a folder's entry.
    ///
    /// If the folder was previously cached under a different hash, the stale
    /// reverse index entry is dropped with it.
    pub fn put(&self, folder_name: impl Into<String>, manifest: AssetManifest, content_hash: impl AsRef<str>) -> Arc<CacheEntry> {
        let folder_name = folder_name.into();
        let content_hash = content_hash.as_ref().to_ascii_lowercase();
        let entry = Arc::new(CacheEntry { folder_name: folder_name.clone(), manifest, content_hash: content_hash.clone() });

        let mut indexes = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = indexes.by_folder.insert(folder_name.clone(), Arc::clone(&entry))
            && previous.content_hash != content_hash
        {
            remove_hash_if_owned(&mut indexes.by_hash, &previous.content_hash, &folder_name);
        }
        indexes.by_hash.insert(content_hash, folder_name);
        tracing::trace!(folder = %entry.folder_name, hash = %entry.content_hash, "Cached map metadata");
        entry
    }

    /// Evict a folder. Returns the entry that was removed, if any.
    pub fn delete(&self, folder_name: &str) -> Option<Arc<CacheEntry>> {
        let mut indexes = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let removed = indexes.by_folder.remove(folder_name)?;
        remove_hash_if_owned(&mut indexes.by_hash, &removed.content_hash, folder_name);
        tracing::trace!(folder = folder_name, "Evicted map metadata");
        Some(removed)
    }

    /// Folder name last cached with `content_hash` (compared
    /// case-insensitively).
    pub fn get_by_hash(&self, content_hash: &str) -> Option<String> {
        let indexes = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        indexes.by_hash.get(&content_hash.to_ascii_lowercase()).cloned()
    }

    /// Number of cached folders.
    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).by_folder.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut indexes = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        indexes.by_folder.clear();
        indexes.by_hash.clear();
    }
}

/// Another folder with identical content may have claimed the hash since.
fn remove_hash_if_owned(by_hash: &mut HashMap<String, String>, hash: &str, folder_name: &str) {
    if by_hash.get(hash).is_some_and(|owner| owner == folder_name) {
        by_hash.remove(hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapshelf_manifest::Schema;
    use rstest::{fixture, rstest};

    #[fixture]
    fn manifest() -> AssetManifest {
        AssetManifest {
            schema: Schema::Legacy,
            title: "Song".into(),
            sub_title: String::new(),
            artist: "Artist".into(),
            mapper: "Mapper".into(),
            audio_filename: "song.egg".into(),
            cover_filename: "cover.jpg".into(),
            variants: Vec::new(),
        }
    }

    #[rstest]
    fn test_put_get_round_trip(manifest: AssetManifest) {
        let cache = MetadataCache::new();
        assert!(cache.is_empty());
        cache.put("1a2b (Song)", manifest.clone(), "ABCDEF");

        let entry = cache.get("1a2b (Song)").unwrap();
        assert_eq!(entry.manifest, manifest);
        assert_eq!(entry.content_hash, "abcdef");
        assert_eq!(cache.get_by_hash("abcdef").as_deref(), Some("1a2b (Song)"));
        assert_eq!(cache.get_by_hash("AbCdEf").as_deref(), Some("1a2b (Song)"));
        assert_eq!(cache.len(), 1);
        assert!(cache.get("missing").is_none());
    }

    #[rstest]
    fn test_put_replacing_hash_drops_stale_index(manifest: AssetManifest) {
        let cache = MetadataCache::new();
        cache.put("Song", manifest.clone(), "aaaa");
        cache.put("Song", manifest, "bbbb");
        assert_eq!(cache.get_by_hash("aaaa"), None);
        assert_eq!(cache.get_by_hash("bbbb").as_deref(), Some("Song"));
        assert_eq!(cache.len(), 1);
    }

    #[rstest]
    fn test_delete_keeps_hash_claimed_by_other_folder(manifest: AssetManifest) {
        let cache = MetadataCache::new();
        cache.put("Copy A", manifest.clone(), "aaaa");
        cache.put("Copy B", manifest, "aaaa");
        assert!(cache.delete("Copy A").is_some());
        assert_eq!(cache.get_by_hash("aaaa").as_deref(), Some("Copy B"));
        assert!(cache.delete("Copy A").is_none());
        assert!(cache.delete("Copy B").is_some());
        assert_eq!(cache.get_by_hash("aaaa"), None);
        assert!(cache.is_empty());
    }

    #[rstest]
    fn test_clear(manifest: AssetManifest) {
        let cache = MetadataCache::new();
        cache.put("A", manifest.clone(), "aaaa");
        cache.put("B", manifest, "bbbb");
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get_by_hash("bbbb"), None);
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_puts(manifest: AssetManifest) {
        let cache = Arc::new(MetadataCache::new());
        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let cache = Arc::clone(&cache);
                let manifest = manifest.clone();
                tokio::spawn(async move {
                    cache.put(format!("folder-{i}"), manifest, format!("{i:040x}"));
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(cache.len(), 32);
        assert_eq!(cache.get_by_hash(&format!("{:040x}", 7)).as_deref(), Some("folder-7"));
    }
}
