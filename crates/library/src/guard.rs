use mapshelf_storage::BackendHandle;
use std::path::{Path, PathBuf};

/// Removes a folder this process just created unless
/// [`dismiss`](Self::dismiss)ed first.
///
/// Failures go through [`rollback`](Self::rollback). Dropping the guard
/// undismissed only happens when the owning future is cancelled; the folder is
/// then removed on the blocking pool, or inline outside a runtime. Removal is
/// best-effort either way: a failure is logged, never raised.
#[must_use = "the folder is removed as soon as the guard is dropped"]
pub(crate) struct NewFolderGuard {
    path: Option<PathBuf>,
}

impl NewFolderGuard {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// Keep the folder.
    pub(crate) fn dismiss(mut self) {
        self.path = None;
    }

    /// Remove the folder through `backend`.
    pub(crate) async fn rollback(mut self, backend: &BackendHandle) {
        let Some(path) = self.path.take() else {
            return;
        };
        match backend.remove_dir_all(&path).await {
            Ok(()) => tracing::info!(path = %path.display(), "Removed partially imported folder"),
            Err(e) => tracing::warn!(path = %path.display(), error = ?e, "Could not remove partially imported folder"),
        }
    }
}

impl Drop for NewFolderGuard {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn_blocking(move || remove_abandoned(&path));
            },
            Err(_) => remove_abandoned(&path),
        }
    }
}

fn remove_abandoned(path: &Path) {
    match std::fs::remove_dir_all(path) {
        Ok(()) => tracing::info!(path = %path.display(), "Removed abandoned import folder"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "Could not remove abandoned import folder"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapshelf_storage::backend::{LocalBackend, ReadOnlyBackend};
    use std::sync::Arc;

    #[test]
    fn test_guard_removes_unless_dismissed() {
        let dir = tempfile::tempdir().unwrap();
        let removed = dir.path().join("removed");
        let kept = dir.path().join("kept");
        std::fs::create_dir_all(removed.join("nested")).unwrap();
        std::fs::create_dir_all(&kept).unwrap();

        drop(NewFolderGuard::new(removed.clone()));
        NewFolderGuard::new(kept.clone()).dismiss();
        assert!(!removed.exists());
        assert!(kept.exists());
    }

    #[tokio::test]
    async fn test_rollback_goes_through_backend() {
        let dir = tempfile::tempdir().unwrap();
        let removed = dir.path().join("removed");
        let kept = dir.path().join("kept");
        std::fs::create_dir_all(removed.join("nested")).unwrap();
        std::fs::create_dir_all(&kept).unwrap();

        let local: BackendHandle = Arc::new(LocalBackend::new("local"));
        NewFolderGuard::new(removed.clone()).rollback(&local).await;
        assert!(!removed.exists());

        let read_only: BackendHandle = Arc::new(ReadOnlyBackend::new(local));
        NewFolderGuard::new(kept.clone()).rollback(&read_only).await;
        assert!(kept.exists());
    }
}
