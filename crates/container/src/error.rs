//! Container Error Types

use derive_more::{Display, Error};

/// A container error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for container operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a buffer could not be encoded or decoded.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fewer bytes than the framing requires.
    #[display("truncated container: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },
    /// The buffer does not start with the FASTDOG magic.
    #[display("not a FASTDOG container")]
    Format,
    /// The header declares a version this build does not understand.
    #[display("unsupported container version: {_0}")]
    UnsupportedVersion(#[error(not(source))] u32),
    /// The zlib stream is corrupt, or inflates to a different length than the footer declares.
    #[display("container payload failed integrity checks")]
    Integrity,
    /// The document (or its compressed form) does not fit in a 32-bit length field.
    #[display("document too large for a FASTDOG container")]
    TooLarge,
    /// The compressor failed while writing.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// A [`Truncated`](ErrorKind::Truncated) buffer may still become valid
    /// once more bytes arrive; every other failure is a property of the input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Truncated { .. } | ErrorKind::Io)
    }
}
