//! The FASTDOG binary container.
//!
//! A container wraps a zlib-compressed GLTF JSON document with a fixed
//! header and footer so that clients can validate and size a download
//! before decompressing it:
//!
//! ```text
//! offset  size  field
//! 0       8     magic "FASTDOG1"
//! 8       4     format version (u32 LE): 1 = GLTF origin, 2 = GLB origin
//! 12      4     compressed length N (u32 LE)
//! 16      N     zlib stream (level 6)
//! 16+N    4     original length (u32 LE)
//! ```
//!
//! - [`encode`] and [`decode`] work on whole buffers.
//! - [`inspect`] validates framing without decompressing.
//! - [`StreamDecoder`] accepts a container in arbitrary chunks, which is how
//!   browsers and the CLI consume a streamed `/binary` response.

mod codec;
pub mod error;
mod header;
mod stream;

pub use crate::codec::{Decoded, decode, encode};
pub use crate::header::{FOOTER_LEN, HEADER_LEN, Header, MAGIC, OVERHEAD, inspect, is_container};
pub use crate::stream::{Progress, StreamDecoder};

use crate::error::{Error, ErrorKind};
use derive_more::Display;

/// Which source format a container's JSON document was recovered from.
///
/// The numeric value is what gets written into the header.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash)]
pub enum FormatVersion {
    /// The source was a plain `.gltf` JSON document.
    #[display("1")]
    Gltf = 1,
    /// The source was a binary `.glb` whose JSON chunk was extracted.
    #[display("2")]
    Glb = 2,
}

impl FormatVersion {
    #[must_use]
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for FormatVersion {
    type Error = Error;
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(FormatVersion::Gltf),
            2 => Ok(FormatVersion::Glb),
            other => exn::bail!(ErrorKind::UnsupportedVersion(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::FormatVersion;
    use crate::error::ErrorKind;
    use rstest::rstest;

    #[rstest]
    #[case(1, FormatVersion::Gltf)]
    #[case(2, FormatVersion::Glb)]
    fn version_from_u32(#[case] raw: u32, #[case] expected: FormatVersion) {
        assert_eq!(FormatVersion::try_from(raw).unwrap(), expected);
        assert_eq!(expected.as_u32(), raw);
    }

    #[rstest]
    #[case(0)]
    #[case(3)]
    #[case(u32::MAX)]
    fn version_unsupported(#[case] raw: u32) {
        let err = FormatVersion::try_from(raw).unwrap_err();
        assert_eq!(*err, ErrorKind::UnsupportedVersion(raw));
    }
}
