//! Container Encoding and Decoding

use crate::FormatVersion;
use crate::error::{ErrorKind, Result};
use crate::header::{HEADER_LEN, MAGIC, OVERHEAD, inspect};
use exn::ResultExt;
use flate2::{Compression, read::ZlibDecoder, write::ZlibEncoder};
use std::io::{Read, Write};
use tracing::instrument;

const ZLIB_LEVEL: Compression = Compression::new(6);
// Never trust a footer for preallocation beyond this.
const MAX_PREALLOC: usize = 64 * 1024 * 1024;

/// A container's payload after decompression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoded {
    pub version: FormatVersion,
    /// The UTF-8 GLTF JSON document.
    pub json: Vec<u8>,
}

/// Wrap a JSON document into a container.
///
/// # Examples
///
/// ```
/// use fastdog_container::{FormatVersion, decode, encode};
///
/// let json = br#"{"asset":{"version":"2.0"}}"#;
/// let container = encode(json, FormatVersion::Gltf).unwrap();
/// assert!(container.starts_with(b"FASTDOG1"));
/// assert_eq!(decode(&container).unwrap().json, json);
/// ```
#[instrument(skip(json), fields(version = %version, input_size = json.len(), output_size))]
pub fn encode(json: &[u8], version: FormatVersion) -> Result<Vec<u8>> {
    let original_len = u32::try_from(json.len()).or_raise(|| ErrorKind::TooLarge)?;

    let mut output = Vec::with_capacity(OVERHEAD + json.len() / 4);
    output.extend_from_slice(MAGIC);
    output.extend_from_slice(&version.as_u32().to_le_bytes());
    // Compressed length, patched once the zlib stream is finished.
    output.extend_from_slice(&[0; 4]);

    let mut encoder = ZlibEncoder::new(output, ZLIB_LEVEL);
    encoder.write_all(json).or_raise(|| ErrorKind::Io)?;
    let mut output = encoder.finish().or_raise(|| ErrorKind::Io)?;

    let compressed_len = u32::try_from(output.len() - HEADER_LEN).or_raise(|| ErrorKind::TooLarge)?;
    output[12..HEADER_LEN].copy_from_slice(&compressed_len.to_le_bytes());
    output.extend_from_slice(&original_len.to_le_bytes());

    tracing::Span::current().record("output_size", output.len());
    Ok(output)
}

/// Validate and decompress a container.
///
/// Fails with [`ErrorKind::Integrity`] when the zlib stream is corrupt or
/// inflates to a length other than the one recorded in the footer.
#[instrument(skip(container), fields(input_size = container.len(), output_size))]
pub fn decode(container: &[u8]) -> Result<Decoded> {
    let header = inspect(container)?;
    let payload = &container[HEADER_LEN..HEADER_LEN + header.compressed_len as usize];
    let expected = header.original_len as usize;

    let mut json = Vec::with_capacity(expected.min(MAX_PREALLOC));
    // One byte past the footer length is enough to detect an overlong stream.
    ZlibDecoder::new(payload)
        .take(u64::from(header.original_len) + 1)
        .read_to_end(&mut json)
        .or_raise(|| ErrorKind::Integrity)?;
    if json.len() != expected {
        tracing::debug!(expected, actual = json.len(), "decoded length does not match footer");
        exn::bail!(ErrorKind::Integrity);
    }

    tracing::Span::current().record("output_size", json.len());
    Ok(Decoded { version: header.version, json })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::FOOTER_LEN;
    use rstest::rstest;

    const DOCUMENT: &[u8] = br#"{"asset":{"version":"2.0"},"meshes":[{"name":"Cube","primitives":[{"attributes":{"POSITION":0}}]}],"nodes":[{"mesh":0}]}"#;

    #[rstest]
    #[case(FormatVersion::Gltf)]
    #[case(FormatVersion::Glb)]
    fn encode_then_decode_preserves_document(#[case] version: FormatVersion) {
        let container = encode(DOCUMENT, version).unwrap();
        let decoded = decode(&container).unwrap();
        assert_eq!(decoded.version, version);
        assert_eq!(decoded.json, DOCUMENT);
    }

    #[test]
    fn encode_lays_out_header_and_footer() {
        let container = encode(DOCUMENT, FormatVersion::Glb).unwrap();
        assert_eq!(&container[..8], MAGIC);
        assert_eq!(&container[8..12], &2u32.to_le_bytes());
        let compressed_len = u32::from_le_bytes(container[12..16].try_into().unwrap()) as usize;
        assert_eq!(container.len(), OVERHEAD + compressed_len);
        let footer = &container[container.len() - FOOTER_LEN..];
        assert_eq!(footer, &(DOCUMENT.len() as u32).to_le_bytes());
    }

    #[test]
    fn encode_empty_document() {
        let container = encode(b"", FormatVersion::Gltf).unwrap();
        assert_eq!(decode(&container).unwrap().json, b"");
    }

    #[test]
    fn repetitive_json_compresses() {
        let big = format!("[{}]", vec![r#"{"name":"node"}"#; 500].join(","));
        let container = encode(big.as_bytes(), FormatVersion::Gltf).unwrap();
        assert!(container.len() < big.len() / 4);
    }

    #[test]
    fn any_corrupted_payload_byte_fails_integrity() {
        let container = encode(DOCUMENT, FormatVersion::Gltf).unwrap();
        for index in HEADER_LEN..container.len() - FOOTER_LEN {
            let mut corrupted = container.clone();
            corrupted[index] ^= 0xFF;
            let err = decode(&corrupted).unwrap_err();
            assert_eq!(*err, ErrorKind::Integrity, "byte {index} flipped");
        }
    }

    #[test]
    fn wrong_footer_fails_integrity() {
        let mut container = encode(DOCUMENT, FormatVersion::Gltf).unwrap();
        let at = container.len() - FOOTER_LEN;
        container[at] ^= 0x01;
        assert_eq!(*decode(&container).unwrap_err(), ErrorKind::Integrity);
    }

    #[test]
    fn truncated_container_is_reported() {
        let container = encode(DOCUMENT, FormatVersion::Gltf).unwrap();
        let err = decode(&container[..container.len() - 1]).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Truncated { .. }));
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let mut container = encode(DOCUMENT, FormatVersion::Glb).unwrap();
        container.extend_from_slice(b"padding");
        assert_eq!(decode(&container).unwrap().json, DOCUMENT);
    }

    #[test]
    fn understated_footer_stops_inflating_early() {
        let bomb = vec![b' '; 8 << 20];
        let mut container = encode(&bomb, FormatVersion::Gltf).unwrap();
        let at = container.len() - FOOTER_LEN;
        container[at..].copy_from_slice(&16u32.to_le_bytes());
        assert_eq!(*decode(&container).unwrap_err(), ErrorKind::Integrity);
    }
}
