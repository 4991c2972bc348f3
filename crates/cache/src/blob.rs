use crate::CacheKey;
use bytes::Bytes;
use fastdog_container::FormatVersion;

/// A complete FASTDOG container plus the facts the HTTP layer reports about it.
///
/// Immutable once built; shared between the cache and in-flight responses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranscodedBlob {
    pub key: CacheKey,
    pub payload: Bytes,
    /// Size of the source file the container was built from.
    pub original_size: u64,
    pub version: FormatVersion,
}

impl TranscodedBlob {
    pub fn new(key: CacheKey, payload: impl Into<Bytes>, original_size: u64, version: FormatVersion) -> Self {
        Self {
            key,
            payload: payload.into(),
            original_size,
            version,
        }
    }

    #[must_use]
    pub fn compressed_size(&self) -> u64 {
        self.payload.len() as u64
    }

    /// Container size divided by source size; `0.0` for an empty source.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        self.compressed_size() as f64 / self.original_size as f64
    }

    /// Strong entity tag derived from the cache key.
    #[must_use]
    pub fn etag(&self) -> String {
        format!("\"{}\"", self.key)
    }
}
