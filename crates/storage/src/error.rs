//! Storage Error Types

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A storage error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// File does not exist, or is not a regular file
    #[display("file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Access denied by the operating system
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
    /// Path contains invalid characters or escapes root
    #[display("invalid path: {}", _0.display())]
    InvalidPath(#[error(not(source))] PathBuf),
    /// Path rejected by [`ProtectedBackend`](crate::backend::ProtectedBackend)
    #[display("filtered path: {}", _0.display())]
    FilteredPath(#[error(not(source))] PathBuf),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    /// Whether the caller should treat this as "no such file".
    ///
    /// Paths that fail validation are reported the same way as missing files
    /// so that probing with `..` reveals nothing about the filesystem.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::InvalidPath(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_includes_invalid_paths() {
        assert!(ErrorKind::NotFound(PathBuf::from("a.gltf")).is_not_found());
        assert!(ErrorKind::InvalidPath(PathBuf::from("../a.gltf")).is_not_found());
        assert!(!ErrorKind::FilteredPath(PathBuf::from("a.gltf")).is_not_found());
    }

    #[test]
    fn only_io_is_retryable() {
        let io = std::io::Error::other("disk on fire");
        assert!(ErrorKind::Io(io).is_retryable());
        assert!(!ErrorKind::PermissionDenied(PathBuf::from("a.glb")).is_retryable());
    }
}
