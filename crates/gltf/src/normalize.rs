//! Model Normalization
//!
//! Every supported input ends up as the same thing: one GLTF JSON document.
//! For a GLB that is the content of its JSON chunk. The binary chunk is not
//! carried, so buffers that point into it will not resolve on the client.

use crate::Detected;
use crate::error::{ErrorKind, Result};
use crate::glb::Glb;
use exn::ResultExt;
use fastdog_container::FormatVersion;
use serde_json::Value;
use tracing::instrument;

/// Which input shape a normalized document came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    GltfJson,
    GlbBinary,
}

impl Origin {
    /// The version number recorded in a FASTDOG header for this origin.
    #[must_use]
    pub fn format_version(self) -> FormatVersion {
        match self {
            Origin::GltfJson => FormatVersion::Gltf,
            Origin::GlbBinary => FormatVersion::Glb,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Origin::GltfJson => "gltf",
            Origin::GlbBinary => "glb",
        }
    }
}

impl From<FormatVersion> for Origin {
    fn from(version: FormatVersion) -> Self {
        match version {
            FormatVersion::Gltf => Origin::GltfJson,
            FormatVersion::Glb => Origin::GlbBinary,
        }
    }
}

/// A GLTF document in JSON form, key order preserved.
#[derive(Clone, Debug, PartialEq)]
pub struct Normalized {
    pub document: Value,
    pub origin: Origin,
}

impl Normalized {
    /// Compact UTF-8 JSON, ready for [`fastdog_container::encode`].
    pub fn to_json_vec(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.document).or_raise(|| ErrorKind::Serialize)
    }
}

/// Convert raw model bytes into a JSON document.
///
/// Detection is by content, never by extension. An existing FASTDOG
/// container is decoded and its origin taken from the header version.
#[instrument(skip(bytes), fields(input_size = bytes.len(), origin))]
pub fn normalize(bytes: &[u8]) -> Result<Normalized> {
    let (json, origin) = match Detected::sniff(bytes) {
        Detected::Fastdog => {
            let decoded = fastdog_container::decode(bytes).or_raise(|| ErrorKind::Container)?;
            (parse_object(&decoded.json)?, Origin::from(decoded.version))
        },
        Detected::Glb => {
            let glb = Glb::parse(bytes)?;
            (parse_object(glb.json)?, Origin::GlbBinary)
        },
        Detected::GltfJson | Detected::Unrecognized => (parse_object(bytes)?, Origin::GltfJson),
    };
    tracing::Span::current().record("origin", origin.as_str());
    Ok(Normalized { document: json, origin })
}

/// Parse a JSON object, tolerating a UTF-8 byte order mark.
fn parse_object(bytes: &[u8]) -> Result<Value> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let value: Value = serde_json::from_slice(bytes).or_raise(|| ErrorKind::UnsupportedFormat)?;
    if !value.is_object() {
        exn::bail!(ErrorKind::UnsupportedFormat);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glb::build;
    use rstest::rstest;
    use serde_json::json;

    const DOCUMENT: &str = r#"{"asset":{"version":"2.0"},"scene":0,"scenes":[{"nodes":[0]}],"nodes":[{"mesh":0}],"meshes":[{"primitives":[]}]}"#;

    #[test]
    fn gltf_json_passes_through() {
        let normalized = normalize(DOCUMENT.as_bytes()).unwrap();
        assert_eq!(normalized.origin, Origin::GltfJson);
        assert_eq!(normalized.to_json_vec().unwrap(), DOCUMENT.as_bytes());
    }

    #[test]
    fn glb_yields_its_json_chunk() {
        let expected = json!({"asset": {"version": "2.0"}, "buffers": [{"byteLength": 4}]});
        let glb = build(expected.to_string().as_bytes(), Some(&[0, 0, 128, 63]));
        let normalized = normalize(&glb).unwrap();
        assert_eq!(normalized.origin, Origin::GlbBinary);
        assert_eq!(normalized.document, expected);
    }

    #[test]
    fn detection_ignores_misleading_content() {
        // GLB bytes are recognised regardless of what the file is called.
        let glb = build(br#"{"asset":{}}"#, None);
        assert_eq!(normalize(&glb).unwrap().origin, Origin::GlbBinary);
    }

    #[test]
    fn existing_container_is_unwrapped() {
        let container = fastdog_container::encode(DOCUMENT.as_bytes(), FormatVersion::Glb).unwrap();
        let normalized = normalize(&container).unwrap();
        assert_eq!(normalized.origin, Origin::GlbBinary);
        assert_eq!(normalized.to_json_vec().unwrap(), DOCUMENT.as_bytes());
    }

    #[test]
    fn key_order_is_preserved() {
        let normalized = normalize(br#"{"zeta":1,"alpha":2,"asset":{}}"#).unwrap();
        let keys: Vec<_> = normalized.document.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["zeta", "alpha", "asset"]);
    }

    #[rstest]
    #[case(b"")]
    #[case(b"not json at all")]
    #[case(b"[1, 2, 3]")]
    #[case(b"{\"asset\": ")]
    #[case(b"glTF\x01\x00\x00\x00\x0c\x00\x00\x00")]
    fn unsupported_inputs(#[case] bytes: &[u8]) {
        let err = normalize(bytes).unwrap_err();
        assert_eq!(*err, ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn malformed_glb_is_distinguished() {
        let mut glb = build(b"{}", None);
        glb.truncate(16);
        let err = normalize(&glb).unwrap_err();
        assert!(matches!(&*err, ErrorKind::MalformedGlb(_)));
    }

    #[test]
    fn glb_with_invalid_json_chunk() {
        let glb = build(b"{oops", None);
        assert_eq!(*normalize(&glb).unwrap_err(), ErrorKind::UnsupportedFormat);
    }
}
