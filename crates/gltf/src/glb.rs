//! Binary GLTF (GLB) container parsing.
//!
//! A GLB is a 12-byte header (`glTF`, version, total length) followed by
//! chunks of `[u32 length][u32 type][data]`. The first chunk must be the
//! JSON document; an optional `BIN\0` chunk carries buffer data.

use crate::error::{ErrorKind, Result};

pub const GLB_MAGIC: [u8; 4] = *b"glTF";
pub const GLB_VERSION: u32 = 2;
const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;
const CHUNK_JSON: u32 = u32::from_le_bytes(*b"JSON");
const CHUNK_BIN: u32 = u32::from_le_bytes(*b"BIN\0");

/// A borrowed view of a parsed GLB.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glb<'a> {
    /// Total length declared in the header. Bytes past it are ignored.
    pub length: usize,
    /// The JSON chunk, including any trailing space padding.
    pub json: &'a [u8],
    /// The binary buffer chunk, if present directly after the JSON chunk.
    pub bin: Option<&'a [u8]>,
}

impl<'a> Glb<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            exn::bail!(malformed(format!("{} bytes is too short for a GLB header", bytes.len())));
        }
        if !bytes.starts_with(&GLB_MAGIC) {
            exn::bail!(malformed("missing glTF magic"));
        }
        let version = read_u32(bytes, 4);
        if version != GLB_VERSION {
            exn::bail!(malformed(format!("unsupported GLB version {version}")));
        }
        let length = read_u32(bytes, 8) as usize;
        if length < HEADER_LEN || length > bytes.len() {
            exn::bail!(malformed(format!(
                "declared length {length} does not fit a buffer of {} bytes",
                bytes.len()
            )));
        }

        let mut chunks = Vec::with_capacity(2);
        let mut offset = HEADER_LEN;
        while offset < length {
            if offset + CHUNK_HEADER_LEN > length {
                exn::bail!(malformed(format!("truncated chunk header at offset {offset}")));
            }
            let chunk_len = read_u32(bytes, offset) as usize;
            let kind = read_u32(bytes, offset + 4);
            let start = offset + CHUNK_HEADER_LEN;
            let end = start + chunk_len;
            if end > length {
                exn::bail!(malformed(format!(
                    "chunk at offset {offset} declares {chunk_len} bytes, past the end of the GLB"
                )));
            }
            chunks.push((kind, &bytes[start..end]));
            offset = end;
        }

        let json = match chunks.first() {
            Some((CHUNK_JSON, data)) => *data,
            Some(_) => exn::bail!(malformed("first chunk is not JSON")),
            None => exn::bail!(malformed("no chunks")),
        };
        let bin = match chunks.get(1) {
            Some((CHUNK_BIN, data)) => Some(*data),
            _ => None,
        };
        tracing::trace!(length, json_len = json.len(), bin_len = bin.map(<[u8]>::len), "parsed GLB");
        Ok(Glb { length, json, bin })
    }
}

fn malformed(reason: impl Into<String>) -> ErrorKind {
    ErrorKind::MalformedGlb(reason.into())
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(buf)
}

/// Assemble a GLB from a JSON document and optional binary buffer.
#[cfg(test)]
pub(crate) fn build(json: &[u8], bin: Option<&[u8]>) -> Vec<u8> {
    let mut json = json.to_vec();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let mut body = Vec::new();
    body.extend_from_slice(&(json.len() as u32).to_le_bytes());
    body.extend_from_slice(b"JSON");
    body.extend_from_slice(&json);
    if let Some(bin) = bin {
        body.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        body.extend_from_slice(b"BIN\0");
        body.extend_from_slice(bin);
    }
    let mut glb = GLB_MAGIC.to_vec();
    glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
    glb.extend_from_slice(&((HEADER_LEN + body.len()) as u32).to_le_bytes());
    glb.extend_from_slice(&body);
    glb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_and_bin_chunks() {
        let glb = build(br#"{"asset":{"version":"2.0"}}"#, Some(&[1, 2, 3, 4]));
        let parsed = Glb::parse(&glb).unwrap();
        assert_eq!(parsed.length, glb.len());
        assert!(parsed.json.starts_with(br#"{"asset""#));
        assert_eq!(parsed.bin, Some(&[1u8, 2, 3, 4][..]));
    }

    #[test]
    fn bin_chunk_is_optional() {
        let glb = build(b"{}", None);
        let parsed = Glb::parse(&glb).unwrap();
        assert_eq!(parsed.json, b"{}  ");
        assert_eq!(parsed.bin, None);
    }

    #[test]
    fn trailing_bytes_past_declared_length_are_ignored() {
        let mut glb = build(b"{}", None);
        glb.extend_from_slice(b"garbage");
        assert_eq!(Glb::parse(&glb).unwrap().json, b"{}  ");
    }

    #[test]
    fn declared_length_longer_than_buffer() {
        let mut glb = build(b"{}", None);
        glb.truncate(glb.len() - 2);
        let err = Glb::parse(&glb).unwrap_err();
        assert!(matches!(&*err, ErrorKind::MalformedGlb(reason) if reason.contains("declared length")));
    }

    #[test]
    fn chunk_overrunning_length() {
        let mut glb = build(b"{}", None);
        glb[12..16].copy_from_slice(&100u32.to_le_bytes());
        let err = Glb::parse(&glb).unwrap_err();
        assert!(matches!(&*err, ErrorKind::MalformedGlb(_)));
    }

    #[test]
    fn first_chunk_must_be_json() {
        let mut glb = build(b"{}", None);
        glb[16..20].copy_from_slice(b"BIN\0");
        let err = Glb::parse(&glb).unwrap_err();
        assert_eq!(*err, ErrorKind::MalformedGlb("first chunk is not JSON".to_string()));
    }

    #[test]
    fn header_without_chunks() {
        let mut glb = GLB_MAGIC.to_vec();
        glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
        glb.extend_from_slice(&12u32.to_le_bytes());
        let err = Glb::parse(&glb).unwrap_err();
        assert_eq!(*err, ErrorKind::MalformedGlb("no chunks".to_string()));
    }

    #[test]
    fn short_buffer() {
        let err = Glb::parse(b"glTF\x02\x00").unwrap_err();
        assert!(matches!(&*err, ErrorKind::MalformedGlb(_)));
    }
}
