use derive_more::Display;
use std::path::Path;
use time::OffsetDateTime;

/// Identity of one version of a source file.
///
/// Also used verbatim as the strong `ETag` of the transcoded container.
#[derive(Clone, Debug, Display, PartialEq, Eq, Hash)]
#[display("{_0}")]
pub struct CacheKey(String);

impl CacheKey {
    /// Fingerprint a file by where it lives, when it last changed and how
    /// big it is. Content is deliberately not read.
    ///
    /// # Examples
    ///
    /// ```
    /// use fastdog_cache::CacheKey;
    /// use std::path::Path;
    /// use time::OffsetDateTime;
    ///
    /// let modified = OffsetDateTime::UNIX_EPOCH;
    /// let a = CacheKey::fingerprint(Path::new("/srv/models/Duck.gltf"), modified, 1024);
    /// let b = CacheKey::fingerprint(Path::new("/srv/models/Duck.gltf"), modified, 1025);
    /// assert_ne!(a, b);
    /// assert_eq!(a.as_str().len(), 64);
    /// ```
    #[must_use]
    pub fn fingerprint(location: &Path, modified: OffsetDateTime, size: u64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(location.as_os_str().as_encoded_bytes());
        hasher.update(format!(":{}:{size}", modified.unix_timestamp_nanos()).as_bytes());
        Self(hasher.finalize().to_hex().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn key(path: &str, nanos: i64, size: u64) -> CacheKey {
        CacheKey::fingerprint(Path::new(path), OffsetDateTime::UNIX_EPOCH + Duration::nanoseconds(nanos), size)
    }

    #[test]
    fn stable_for_same_inputs() {
        assert_eq!(key("/models/Duck.gltf", 5, 100), key("/models/Duck.gltf", 5, 100));
    }

    #[test]
    fn sensitive_to_every_component() {
        let base = key("/models/Duck.gltf", 5, 100);
        assert_ne!(base, key("/models/Duck.glb", 5, 100));
        assert_ne!(base, key("/models/Duck.gltf", 6, 100));
        assert_ne!(base, key("/models/Duck.gltf", 5, 101));
    }

    #[test]
    fn hex_encoded() {
        let key = key("/models/Duck.gltf", 0, 0);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key.to_string(), key.as_str());
    }
}
