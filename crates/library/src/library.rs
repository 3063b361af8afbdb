use crate::delete::{delete_assets, delete_by_hashes};
use crate::download::{Downloader, Transport};
use crate::error::{ErrorKind, Result};
use crate::export::{ExportEvent, export};
use crate::import::{ImportEvent, import};
use crate::scan::{ScanEvent, scan};
use crate::{AssetRecord, Context, Progress};
use async_stream::stream;
use exn::ResultExt;
use futures::Stream;
use mapshelf_storage::{LinkOptions, Resolver, Version};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Every pipeline, pointed at the right folder for a game version.
///
/// `version` arguments select that version's maps folder; `None` selects
/// the shared pool.
///
/// ```no_run
/// use futures::TryStreamExt;
/// use mapshelf_cache::MetadataCache;
/// use mapshelf_library::scan::ScanEvent;
/// use mapshelf_library::{Context, Library};
/// use mapshelf_storage::backend::LocalBackend;
/// use mapshelf_storage::{Resolver, SymlinkLinker, Version};
/// use std::sync::Arc;
///
/// # async fn example() -> mapshelf_library::error::Result<()> {
/// let ctx = Context::new(Arc::new(LocalBackend::new("local")), Arc::new(MetadataCache::new()));
/// let linker = Arc::new(SymlinkLinker::new("/games/SharedMaps"));
/// let library = Library::new(ctx, Resolver::new("/games/Instances", "/games/SharedMaps", linker));
///
/// let version = Version::new("1.29.1").unwrap();
/// let events: Vec<ScanEvent> = library.scan(Some(&version)).try_collect().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Library {
    ctx: Context,
    resolver: Resolver,
}

impl Library {
    pub fn new(ctx: Context, resolver: Resolver) -> Self {
        Self { ctx, resolver }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub async fn assets_dir(&self, version: Option<&Version>) -> Result<PathBuf> {
        self.resolver.assets_dir(version).await.or_raise(|| ErrorKind::Storage)
    }

    pub async fn list_versions(&self) -> Result<Vec<Version>> {
        self.resolver.list_versions().await.or_raise(|| ErrorKind::Storage)
    }

    pub async fn is_linked(&self, version: &Version) -> bool {
        self.resolver.is_linked(version).await
    }

    /// Replace `version`'s maps folder with a link to the shared pool.
    pub async fn link_version(&self, version: &Version, options: &LinkOptions) -> Result<()> {
        self.resolver.link_version(version, options).await.or_raise(|| ErrorKind::Storage)?;
        // Folder names now resolve to different contents.
        self.ctx.cache.clear();
        Ok(())
    }

    pub async fn unlink_version(&self, version: &Version, options: &LinkOptions) -> Result<()> {
        self.resolver.unlink_version(version, options).await.or_raise(|| ErrorKind::Storage)?;
        self.ctx.cache.clear();
        Ok(())
    }

    pub fn scan<'a>(&'a self, version: Option<&'a Version>) -> impl Stream<Item = Result<ScanEvent>> + 'a {
        stream! {
            let root = match self.assets_dir(version).await {
                Ok(root) => root,
                Err(e) => {
                    yield Err(e);
                    return;
                },
            };
            for await event in scan(&self.ctx, &root) {
                yield event;
            }
        }
    }

    pub fn import<'a>(
        &'a self,
        archives: &'a [PathBuf],
        version: Option<&'a Version>,
    ) -> impl Stream<Item = Result<ImportEvent>> + 'a {
        stream! {
            let root = match self.ensure_assets_dir(version).await {
                Ok(root) => root,
                Err(e) => {
                    yield Err(e);
                    return;
                },
            };
            for await event in import(&self.ctx, archives, &root) {
                yield event;
            }
        }
    }

    /// Relative `folders` are looked up in `version`'s maps folder; an empty
    /// list exports all of it.
    pub fn export<'a>(
        &'a self,
        folders: &'a [PathBuf],
        version: Option<&'a Version>,
        output: &'a Path,
    ) -> impl Stream<Item = Result<ExportEvent>> + 'a {
        stream! {
            let root = match self.assets_dir(version).await {
                Ok(root) => root,
                Err(e) => {
                    yield Err(e);
                    return;
                },
            };
            for await event in export(&self.ctx, folders, &root, output) {
                yield event;
            }
        }
    }

    pub fn delete_assets<'a>(&'a self, records: &'a [AssetRecord]) -> impl Stream<Item = Result<Progress<PathBuf>>> + 'a {
        delete_assets(&self.ctx, records)
    }

    pub fn delete_by_hashes<'a>(
        &'a self,
        hashes: &'a [String],
        version: Option<&'a Version>,
    ) -> impl Stream<Item = Result<Progress<PathBuf>>> + 'a {
        stream! {
            let root = match self.assets_dir(version).await {
                Ok(root) => root,
                Err(e) => {
                    yield Err(e);
                    return;
                },
            };
            for await event in delete_by_hashes(&self.ctx, hashes, &root) {
                yield event;
            }
        }
    }

    /// A [`Downloader`] sharing this library's backend, cache and folders.
    pub fn downloader(&self, transport: Arc<dyn Transport>, temp_suffix_len: usize) -> Downloader {
        Downloader::new(self.ctx.clone(), self.resolver.clone(), transport, temp_suffix_len)
    }

    /// Imports create the folder; every other pipeline reads a missing one
    /// as empty.
    async fn ensure_assets_dir(&self, version: Option<&Version>) -> Result<PathBuf> {
        let root = self.assets_dir(version).await?;
        self.ctx.backend.create_dir_all(&root).await.or_raise(|| ErrorKind::Storage)?;
        Ok(root)
    }
}
