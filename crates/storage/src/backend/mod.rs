//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, which provides a unified
//! read-only interface over wherever model files live, plus the decorators
//! that restrict what a route may serve.

mod local;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod protected;

pub use self::local::LocalBackend;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockBackend;
pub use self::protected::ProtectedBackend;
use crate::FileInfo;
use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::ops::Range;
use std::path::Path;
use std::pin::Pin;

/// Chunks of a file, ready to become an HTTP body.
pub type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send + 'static>>;

/// Unified interface for storage backends.
///
/// # Path Handling
/// All paths are relative to the storage root and must be validated using
/// [`validate_path`](crate::validate_path) before use. Implementations should
/// enforce this validation.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use fastdog_storage::{backend::StorageBackend, error::Result};
///
/// async fn sidecar_size(backend: &dyn StorageBackend) -> Result<Option<u64>> {
///     let path = Path::new("Duck.fastdog");
///     if backend.exists(path).await? {
///         Ok(Some(backend.stat(path).await?.size))
///     } else {
///         Ok(None)
///     }
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend, used for logging.
    fn name(&self) -> &str;

    /// Check if a regular file exists.
    async fn exists(&self, path: &Path) -> Result<bool>;

    /// Read file contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Get file metadata without reading contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist or is not a regular file.
    async fn stat(&self, path: &Path) -> Result<FileInfo>;

    /// Stream the half-open byte `range` of a file in chunks of at most
    /// `chunk_size` bytes.
    ///
    /// Opening the file happens before returning, so a missing file is
    /// reported here rather than mid-stream. A range extending past the end
    /// of the file is cut short at the end.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use futures::TryStreamExt;
    /// use std::path::Path;
    /// # use fastdog_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> std::io::Result<()> {
    /// // Second kibibyte of the file, 256 bytes at a time.
    /// let mut chunks = backend.stream_range(Path::new("Duck.glb"), 1024..2048, 256).await.unwrap();
    /// while let Some(chunk) = chunks.try_next().await? {
    ///     println!("{} bytes", chunk.len());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    async fn stream_range(&self, path: &Path, range: Range<u64>, chunk_size: usize) -> Result<ByteStream>;
}
