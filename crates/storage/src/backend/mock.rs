//! In-memory storage backend for testing.

use super::ByteStream;
use crate::error::{ErrorKind, Result};
use crate::path::validate as validate_path;
use crate::{FileInfo, StorageBackend};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tokio::sync::RwLock;

/// In-memory storage backend for testing.
///
/// Files are stored in a `HashMap` behind a [`RwLock`], so all trait methods
/// can operate on `&self` without external synchronisation. Replacing a file
/// with [`insert`](Self::insert) bumps its modification time, just like
/// rewriting it on disk would.
pub struct MockBackend {
    name: String,
    storage: RwLock<HashMap<PathBuf, (OffsetDateTime, Bytes)>>,
}

impl MockBackend {
    /// Create a mock backend pre-populated with files.
    ///
    /// Panics if any path fails validation (e.g. path traversal). If test
    /// setup is wrong, then test should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Bytes>)>) -> Self {
        let now = OffsetDateTime::now_utc();
        let map = files
            .into_iter()
            .map(|(path, data)| (Self::validated(path.into()), (now, data.into())))
            .collect();
        Self {
            name: "mock".to_string(),
            storage: RwLock::new(map),
        }
    }

    /// Change the name of the mock backend.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add or replace a file, stamping it with a fresh modification time.
    pub async fn insert(&self, path: impl Into<PathBuf>, data: impl Into<Bytes>) {
        let path = Self::validated(path.into());
        let mut storage = self.storage.write().await;
        let modified = match storage.get(&path) {
            // Coarse clocks can repeat; a rewrite must always look newer.
            Some((previous, _)) => OffsetDateTime::now_utc().max(*previous + time::Duration::nanoseconds(1)),
            None => OffsetDateTime::now_utc(),
        };
        storage.insert(path, (modified, data.into()));
    }

    fn validated(path: PathBuf) -> PathBuf {
        let Ok(validated) = validate_path(&path) else {
            // The panic here is DELIBERATE. MockBackend is intended to be
            // used in tests; panics are expected. There is no error result.
            panic!("MockBackend: invalid path {}", path.display());
        };
        validated
    }

    async fn get(&self, path: &Path) -> Result<(OffsetDateTime, Bytes)> {
        let validated = validate_path(path)?;
        let storage = self.storage.read().await;
        match storage.get(&validated) {
            Some(entry) => Ok(entry.clone()),
            None => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
        }
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let files: [(&str, &[u8]); 0] = [];
        Self::with_files(files)
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let validated = validate_path(path)?;
        Ok(self.storage.read().await.contains_key(&validated))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let (_, data) = self.get(path).await?;
        Ok(data.to_vec())
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        let validated = validate_path(path)?;
        let (modified, data) = self.get(&validated).await?;
        let location = Path::new("/").join(&self.name).join(&validated);
        Ok(FileInfo::new(validated, location, data.len() as u64, modified))
    }

    async fn stream_range(&self, path: &Path, range: Range<u64>, chunk_size: usize) -> Result<ByteStream> {
        let (_, data) = self.get(path).await?;
        let len = data.len();
        let end = usize::try_from(range.end).unwrap_or(len).min(len);
        let start = usize::try_from(range.start).unwrap_or(len).min(end);
        let window = data.slice(start..end);
        let chunks: Vec<std::io::Result<Bytes>> = (0..window.len())
            .step_by(chunk_size.max(1))
            .map(|offset| Ok(window.slice(offset..(offset + chunk_size.max(1)).min(window.len()))))
            .collect();
        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}
