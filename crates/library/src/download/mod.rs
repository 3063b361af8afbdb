//! Fetching maps from a remote registry and installing them.
//!
//! A [`Downloader`] fetches a [`RemoteAsset`]'s newest version through a
//! [`Transport`] into a temporary archive next to its destination, installs
//! it with the same routine [`import`](crate::import) uses, then announces
//! the new map on a broadcast channel.

mod descriptor;
pub mod error;
#[cfg(feature = "http")]
mod http;
mod transport;

pub use self::descriptor::{RemoteAsset, RemoteVersion};
#[cfg(feature = "http")]
pub use self::http::HttpTransport;
pub use self::transport::{Transport, TransportEvent};
use crate::Context;
use crate::download::error::{ErrorKind, Result};
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::import::{ImportUnit, install};
use crate::record::AssetRecord;
use crate::scan::load_one_inner;
use exn::{OptionExt, ResultExt};
use futures::StreamExt;
use mapshelf_storage::{Resolver, Version, copy_dir};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempPath;
use tokio::sync::broadcast;

/// Undelivered notifications kept for slow subscribers.
const NOTIFICATION_CAPACITY: usize = 16;

/// Sent to subscribers after every successful download.
#[derive(Debug, Clone, PartialEq)]
pub struct LastDownloaded {
    pub record: AssetRecord,
    /// `None` when the map went into the shared pool.
    pub version: Option<Version>,
}

pub struct Downloader {
    ctx: Context,
    resolver: Resolver,
    transport: Arc<dyn Transport>,
    notifications: broadcast::Sender<LastDownloaded>,
    temp_suffix_len: usize,
}

impl Downloader {
    pub fn new(ctx: Context, resolver: Resolver, transport: Arc<dyn Transport>, temp_suffix_len: usize) -> Self {
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self { ctx, resolver, transport, notifications, temp_suffix_len: temp_suffix_len.max(1) }
    }

    /// Receive a [`LastDownloaded`] for every download from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LastDownloaded> {
        self.notifications.subscribe()
    }

    /// Install `asset` into `version`'s maps folder (the shared pool for
    /// `None`).
    ///
    /// When a folder named after the asset is already there and holds one
    /// of the asset's published versions, nothing is fetched and that
    /// folder's record is returned. The temporary archive is removed whether
    /// or not the install succeeds.
    pub async fn download(&self, asset: &RemoteAsset, version: Option<&Version>) -> LibraryResult<AssetRecord> {
        self.download_inner(asset, version).await.or_raise(|| LibraryErrorKind::Download)
    }

    /// [`download`](Self::download), then copy the map into every other
    /// installed version, and the shared pool, that doesn't already share a
    /// folder with the destination. Failing to copy somewhere is logged
    /// only.
    pub async fn one_click_download(&self, asset: &RemoteAsset, version: Option<&Version>) -> LibraryResult<AssetRecord> {
        let record = self.download(asset, version).await?;
        self.replicate(&record, version).await;
        Ok(record)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(id = %asset.id))]
    async fn download_inner(&self, asset: &RemoteAsset, version: Option<&Version>) -> Result<AssetRecord> {
        let root = self.resolver.assets_dir(version).await.or_raise(|| ErrorKind::Resolve)?;
        self.ctx.backend.create_dir_all(&root).await.or_raise(|| ErrorKind::Io(root.clone()))?;
        let folder_name = asset.folder_name();

        if let Some(record) = self.installed(asset, &root.join(&folder_name)).await? {
            tracing::info!(folder = %record.folder_path().display(), "Already installed; skipping download");
            return Ok(record);
        }

        let latest = asset.latest().ok_or_raise(|| ErrorKind::NoVersion(asset.id.clone()))?;
        let archive = self.temp_archive(&folder_name, &root)?;
        let installed = self.fetch_and_install(&latest.download_url, &archive, &folder_name, &root).await;
        if let Err(e) = archive.close() {
            tracing::warn!(error = %e, "Could not remove temporary archive");
        }
        let record = installed?;

        let notification = LastDownloaded { record: record.clone(), version: version.cloned() };
        if self.notifications.send(notification).is_err() {
            tracing::debug!("No download subscribers");
        }
        Ok(record)
    }

    /// The record at `folder` if it holds a version of `asset`.
    async fn installed(&self, asset: &RemoteAsset, folder: &Path) -> Result<Option<AssetRecord>> {
        if !self.ctx.backend.exists(folder).await.or_raise(|| ErrorKind::Io(folder.to_path_buf()))? {
            return Ok(None);
        }
        match load_one_inner(&self.ctx, folder).await {
            Ok(Some(record)) if asset.declares(record.content_hash()) => Ok(Some(record)),
            Ok(_) => Ok(None),
            Err(e) => {
                tracing::warn!(folder = %folder.display(), error = ?e, "Existing folder failed to load; downloading again");
                Ok(None)
            },
        }
    }

    fn temp_archive(&self, folder_name: &str, root: &Path) -> Result<TempPath> {
        let file = tempfile::Builder::new()
            .prefix(&format!("{folder_name}-"))
            .suffix(".zip")
            .rand_bytes(self.temp_suffix_len)
            .tempfile_in(root)
            .or_raise(|| ErrorKind::Io(root.to_path_buf()))?;
        Ok(file.into_temp_path())
    }

    async fn fetch_and_install(&self, url: &str, archive: &Path, folder_name: &str, root: &Path) -> Result<AssetRecord> {
        let mut events = self.transport.fetch_to_file(url, archive);
        let mut finished = false;
        while let Some(event) = events.next().await {
            match event? {
                TransportEvent::Progress { received, total } => tracing::trace!(received, ?total, "Downloading"),
                TransportEvent::Finished { .. } => finished = true,
            }
        }
        drop(events);
        if !finished {
            exn::bail!(ErrorKind::Transport(url.to_string()));
        }

        let unit = ImportUnit::whole_archive(archive, folder_name);
        install(&self.ctx, &unit, root).await.or_raise(|| ErrorKind::Install)
    }

    async fn replicate(&self, record: &AssetRecord, version: Option<&Version>) {
        let Some(folder_name) = record.folder_name() else {
            return;
        };
        let destination_root = match self.resolver.canonical_assets_dir(version).await {
            Ok(root) => root,
            Err(e) => {
                tracing::warn!(error = ?e, "Could not resolve download destination; not copying elsewhere");
                return;
            },
        };
        let mut seen = HashSet::from([destination_root]);
        let versions = match self.resolver.list_versions().await {
            Ok(versions) => versions,
            Err(e) => {
                tracing::warn!(error = ?e, "Could not list installed versions; not copying elsewhere");
                return;
            },
        };

        let mut targets: Vec<Option<Version>> = versions.into_iter().map(Some).collect();
        targets.push(None);
        for target in targets.iter().filter(|t| t.as_ref() != version) {
            let Some(root) = self.replication_root(target.as_ref()).await else {
                continue;
            };
            if !seen.insert(root.clone()) {
                continue;
            }
            let destination = root.join(folder_name);
            match copy_dir(record.folder_path(), &destination).await {
                Ok(files) => tracing::info!(destination = %destination.display(), files, "Copied map"),
                Err(e) => tracing::warn!(destination = %destination.display(), error = ?e, "Could not copy map"),
            }
        }
    }

    /// Canonical maps folder of `target`, or `None` for a version that has
    /// no maps folder.
    async fn replication_root(&self, target: Option<&Version>) -> Option<PathBuf> {
        if let Some(version) = target {
            let path = self.resolver.levels_path(version);
            if !self.ctx.backend.exists(&path).await.unwrap_or(false) {
                tracing::debug!(%version, "Version has no maps folder; not copying there");
                return None;
            }
        }
        match self.resolver.canonical_assets_dir(target).await {
            Ok(root) => Some(root),
            Err(e) => {
                tracing::warn!(error = ?e, "Could not resolve maps folder; not copying there");
                None
            },
        }
    }
}
