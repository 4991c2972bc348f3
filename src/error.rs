//! Command-line Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A command error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for commands.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("cannot load configuration")]
    Config,
    #[display("cannot read {}", _0.display())]
    Read(#[error(not(source))] PathBuf),
    #[display("cannot write {}", _0.display())]
    Write(#[error(not(source))] PathBuf),
    #[display("cannot transcode {}", _0.display())]
    Transcode(#[error(not(source))] PathBuf),
    #[display("cannot decode {}", _0.display())]
    Decode(#[error(not(source))] PathBuf),
    /// The default output path would replace the input file.
    #[display("refusing to overwrite input {}", _0.display())]
    Overwrite(#[error(not(source))] PathBuf),
    #[display("cannot start the async runtime")]
    Runtime,
    #[display("server failed")]
    Server,
}
