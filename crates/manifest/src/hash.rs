use crate::error::{ErrorKind, Result};
use crate::parse::parse;
use exn::ResultExt;
use sha1::{Digest, Sha1};
use std::io::{ErrorKind as IoErrorKind, Read};
use std::path::Path;

const CHUNK_SIZE: usize = 64 * 1024;

/// Streaming content hash of a map.
///
/// Seeded with the raw manifest bytes; every referenced file is then fed in
/// through [`update`](Self::update) in [`hashed_files`] order.
///
/// [`hashed_files`]: crate::AssetManifest::hashed_files
pub(crate) struct ContentHasher {
    digest: Sha1,
    buffer: Box<[u8]>,
}

impl ContentHasher {
    pub(crate) fn new(raw_manifest: &[u8]) -> Self {
        let mut digest = Sha1::new();
        digest.update(raw_manifest);
        Self { digest, buffer: vec![0; CHUNK_SIZE].into_boxed_slice() }
    }

    /// Feed one referenced file. `path` only labels the error.
    pub(crate) fn update(&mut self, path: &Path, mut reader: impl Read) -> Result<()> {
        loop {
            let read = match reader.read(&mut self.buffer) {
                Ok(0) => return Ok(()),
                Ok(n) => n,
                Err(e) if e.kind() == IoErrorKind::Interrupted => continue,
                Err(e) => return Err(e).or_raise(|| ErrorKind::Hash(path.to_path_buf())),
            };
            self.digest.update(&self.buffer[..read]);
        }
    }

    /// Lowercase hex SHA-1 digest.
    pub(crate) fn finalize(self) -> String {
        format!("{:x}", self.digest.finalize())
    }
}

/// Compute the content hash of the map in `folder` whose manifest text is
/// `raw_manifest`.
///
/// Every file the manifest references is opened through `open`, which is
/// handed the name exactly as the manifest declares it; a file referenced by
/// several variants is opened once per reference. Errors from `open` are
/// returned unchanged, so the opener decides which path they name.
///
/// Blocking; async callers should run this on a blocking thread.
pub fn compute_hash<R, F>(folder: &Path, raw_manifest: &[u8], mut open: F) -> Result<String>
where
    R: Read,
    F: FnMut(&str) -> Result<R>,
{
    let manifest = parse(raw_manifest)?;
    let mut hasher = ContentHasher::new(raw_manifest);
    for name in manifest.hashed_files() {
        let reader = open(name)?;
        hasher.update(&folder.join(name), reader)?;
    }
    let hash = hasher.finalize();
    tracing::trace!(folder = %folder.display(), hash, "Computed content hash");
    Ok(hash)
}
