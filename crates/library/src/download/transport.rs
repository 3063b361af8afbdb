use crate::download::error::Result;
use futures::stream::BoxStream;
use std::path::{Path, PathBuf};

/// Progress reported while a [`Transport`] fetches a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// `total` is only known when the server said up front.
    Progress { received: u64, total: Option<u64> },
    /// The file is complete at `path`. Always the last event.
    Finished { path: PathBuf },
}

/// Fetches a remote file to local disk.
pub trait Transport: Send + Sync {
    /// Download `url` into `dest`, overwriting it.
    fn fetch_to_file<'a>(&'a self, url: &'a str, dest: &'a Path) -> BoxStream<'a, Result<TransportEvent>>;
}
