use crate::FormatVersion;
use crate::error::{ErrorKind, Result};

/// Magic bytes at the start of every container.
pub const MAGIC: &[u8; 8] = b"FASTDOG1";
/// Magic, version and compressed length.
pub const HEADER_LEN: usize = 16;
/// Trailing original length.
pub const FOOTER_LEN: usize = 4;
/// Framing bytes surrounding the zlib stream.
pub const OVERHEAD: usize = HEADER_LEN + FOOTER_LEN;

/// Framing fields read from a container without decompressing it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub version: FormatVersion,
    pub compressed_len: u32,
    pub original_len: u32,
}

impl Header {
    /// Size of the whole container in bytes, framing included.
    #[must_use]
    pub fn total_len(&self) -> usize {
        OVERHEAD + self.compressed_len as usize
    }

    /// Container size divided by the size of the JSON it carries.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.original_len == 0 {
            return 0.0;
        }
        self.total_len() as f64 / f64::from(self.original_len)
    }
}

/// Whether `bytes` starts with the container magic.
#[must_use]
pub fn is_container(bytes: &[u8]) -> bool {
    bytes.starts_with(MAGIC)
}

/// Validate the framing of a complete container and return its header.
///
/// Trailing bytes past the declared footer are ignored.
pub fn inspect(bytes: &[u8]) -> Result<Header> {
    if bytes.len() < OVERHEAD {
        exn::bail!(ErrorKind::Truncated { needed: OVERHEAD, available: bytes.len() });
    }
    let (version, total) = read_prefix(bytes)?;
    if bytes.len() < total {
        exn::bail!(ErrorKind::Truncated { needed: total, available: bytes.len() });
    }
    Ok(Header {
        version,
        compressed_len: read_u32(bytes, 12),
        original_len: read_u32(bytes, total - FOOTER_LEN),
    })
}

/// Validate magic and version from the first [`HEADER_LEN`] bytes and return
/// the total container length they declare.
pub(crate) fn read_prefix(bytes: &[u8]) -> Result<(FormatVersion, usize)> {
    if bytes.len() < HEADER_LEN {
        exn::bail!(ErrorKind::Truncated { needed: HEADER_LEN, available: bytes.len() });
    }
    if !is_container(bytes) {
        exn::bail!(ErrorKind::Format);
    }
    let version = FormatVersion::try_from(read_u32(bytes, 8))?;
    let compressed_len = read_u32(bytes, 12) as usize;
    Ok((version, OVERHEAD + compressed_len))
}

/// Callers guarantee `at + 4 <= bytes.len()`.
pub(crate) fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(buf)
}
