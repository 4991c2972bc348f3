//! Extension-filtered storage backend decorator.
//!
//! Wraps another backend and refuses every operation on files whose
//! extension is on a deny list. The static file route uses this so that raw
//! model files are only reachable through the streaming API.

use crate::backend::ByteStream;
use crate::error::ErrorKind;
use crate::path::extension;
use crate::{BackendHandle, FileInfo, StorageBackend, error::Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::ops::Range;
use std::path::Path;

/// Storage backend that hides protected file types.
///
/// Extensions are compared case-insensitively, with or without a leading
/// dot. Protected paths fail with [`ErrorKind::FilteredPath`] before the inner
/// backend is consulted, so existence is never revealed.
///
/// # Examples
///
/// ```
/// use fastdog_storage::backend::{LocalBackend, ProtectedBackend};
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let public = Arc::new(LocalBackend::new("static", "/srv/fastdog/static")?);
/// let guarded = ProtectedBackend::new(public, [".gltf", ".glb", ".fastdog"]);
/// assert!(guarded.is_protected(Path::new("models/Duck.GLTF")));
/// assert!(!guarded.is_protected(Path::new("css/site.css")));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ProtectedBackend {
    inner: BackendHandle,
    protected: HashSet<String>,
}
impl ProtectedBackend {
    pub fn new(inner: BackendHandle, extensions: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        let protected = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { inner, protected }
    }

    #[must_use]
    pub fn is_protected(&self, path: &Path) -> bool {
        extension(path).is_some_and(|ext| self.protected.contains(&ext))
    }

    fn guard(&self, path: &Path) -> Result<()> {
        if self.is_protected(path) {
            tracing::debug!(backend = %self.inner.name(), path = %path.display(), "refusing protected file type");
            exn::bail!(ErrorKind::FilteredPath(path.to_path_buf()));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for ProtectedBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        self.guard(path)?;
        self.inner.exists(path).await
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.guard(path)?;
        self.inner.read(path).await
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        self.guard(path)?;
        self.inner.stat(path).await
    }

    async fn stream_range(&self, path: &Path, range: Range<u64>, chunk_size: usize) -> Result<ByteStream> {
        self.guard(path)?;
        self.inner.stream_range(path, range, chunk_size).await
    }
}
