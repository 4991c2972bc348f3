//! Model Error Types

use derive_more::{Display, Error};

/// A model handling error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for model operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Neither a GLB nor a JSON object. The JSON parse error is attached as a child.
    #[display("unsupported model format")]
    UnsupportedFormat,
    /// GLB magic and version were present but the chunk layout is inconsistent.
    #[display("malformed GLB: {_0}")]
    MalformedGlb(#[error(not(source))] String),
    /// Failed to decode an embedded FASTDOG container.
    #[display("invalid FASTDOG container")]
    Container,
    /// Failed to serialize a document back to JSON.
    #[display("failed to serialize model document")]
    Serialize,
}

