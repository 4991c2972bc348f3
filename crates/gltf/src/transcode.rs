//! Model to container conversion.

use crate::Detected;
use crate::error::{ErrorKind, Result};
use crate::normalize::normalize;
use exn::ResultExt;
use fastdog_container::FormatVersion;
use tracing::instrument;

/// An encoded FASTDOG container and the version recorded in its header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transcoded {
    pub container: Vec<u8>,
    pub version: FormatVersion,
}

/// Normalize a model and pack its JSON document into a FASTDOG container.
///
/// Input that already is a container is returned as-is once its header and
/// footer check out.
///
/// # Examples
///
/// ```
/// use fastdog_container::FormatVersion;
///
/// let transcoded = fastdog_gltf::transcode(br#"{"asset":{"version":"2.0"}}"#).unwrap();
/// assert_eq!(transcoded.version, FormatVersion::Gltf);
/// assert!(fastdog_container::is_container(&transcoded.container));
/// ```
#[instrument(skip(bytes), fields(input_size = bytes.len(), output_size))]
pub fn transcode(bytes: &[u8]) -> Result<Transcoded> {
    let transcoded = if Detected::sniff(bytes) == Detected::Fastdog {
        let header = fastdog_container::inspect(bytes).or_raise(|| ErrorKind::Container)?;
        Transcoded { container: bytes[..header.total_len()].to_vec(), version: header.version }
    } else {
        let normalized = normalize(bytes)?;
        let version = normalized.origin.format_version();
        let json = normalized.to_json_vec()?;
        let container = fastdog_container::encode(&json, version).or_raise(|| ErrorKind::Container)?;
        Transcoded { container, version }
    };
    tracing::Span::current().record("output_size", transcoded.container.len());
    Ok(transcoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glb::build;

    const DOCUMENT: &[u8] = br#"{"asset":{"version":"2.0"},"meshes":[{"primitives":[{"attributes":{"POSITION":0}}]}]}"#;

    #[test]
    fn gltf_becomes_version_one() {
        let transcoded = transcode(DOCUMENT).unwrap();
        assert_eq!(transcoded.version, FormatVersion::Gltf);
        assert_eq!(&transcoded.container[..8], b"FASTDOG1");
        let decoded = fastdog_container::decode(&transcoded.container).unwrap();
        assert_eq!(decoded.json, DOCUMENT);
    }

    #[test]
    fn glb_becomes_version_two() {
        let glb = build(DOCUMENT, Some(&[1, 2, 3, 4]));
        let transcoded = transcode(&glb).unwrap();
        assert_eq!(transcoded.version, FormatVersion::Glb);
        assert_eq!(fastdog_container::decode(&transcoded.container).unwrap().json, DOCUMENT);
    }

    #[test]
    fn container_passes_through() {
        let container = fastdog_container::encode(DOCUMENT, FormatVersion::Glb).unwrap();
        let mut padded = container.clone();
        padded.extend_from_slice(b"trailing");
        let transcoded = transcode(&padded).unwrap();
        assert_eq!(transcoded, Transcoded { container, version: FormatVersion::Glb });
    }

    #[test]
    fn truncated_container_is_rejected() {
        let container = fastdog_container::encode(DOCUMENT, FormatVersion::Gltf).unwrap();
        let err = transcode(&container[..container.len() - 2]).unwrap_err();
        assert_eq!(*err, ErrorKind::Container);
    }

    #[test]
    fn garbage_is_unsupported() {
        assert_eq!(*transcode(b"\x00\x01\x02").unwrap_err(), ErrorKind::UnsupportedFormat);
    }
}
