//! Storage models.

use fastdog_gltf::ModelFormat;
use std::path::PathBuf;
use time::OffsetDateTime;

/// File metadata returned by storage backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Relative path from storage root
    pub path: PathBuf,
    /// Fully-qualified location, unique across backends. For
    /// [`LocalBackend`](crate::backend::LocalBackend) this is the absolute
    /// filesystem path.
    pub location: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modified timestamp
    pub modified: OffsetDateTime,
    /// Format hint from the file extension. Content sniffing is authoritative.
    pub format: ModelFormat,
}
impl FileInfo {
    pub fn new(path: impl Into<PathBuf>, location: impl Into<PathBuf>, size: u64, modified: OffsetDateTime) -> Self {
        let path = path.into();
        Self {
            format: ModelFormat::from_path(&path),
            path,
            location: location.into(),
            size,
            modified,
        }
    }
}
