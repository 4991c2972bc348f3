//! Server Error Types

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use derive_more::{Display, Error};
use fastdog_storage::error::{Error as StorageError, ErrorKind as StorageErrorKind};
use serde::Serialize;

/// A request error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for request handling.
pub type Result<T> = std::result::Result<T, Error>;

/// What went wrong, phrased for the client.
///
/// The `Display` output is sent as the `detail` of the JSON error body; the
/// full error tree only goes to the log.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("Model file not found")]
    ModelNotFound(#[error(not(source))] String),
    #[display("File not found")]
    FileNotFound(#[error(not(source))] String),
    #[display("Access to this file type is forbidden")]
    Forbidden,
    #[display("Not authenticated")]
    Unauthorized,
    #[display("Requested range not satisfiable")]
    RangeNotSatisfiable { length: u64 },
    /// The storage backend failed for a reason other than a missing file.
    #[display("Failed to read file")]
    Storage,
    #[display("Failed to parse model file: {_0}")]
    Parse(#[error(not(source))] String),
    #[display("Failed to generate manifest: {_0}")]
    Manifest(#[error(not(source))] String),
    #[display("Failed to convert model: {_0}")]
    Convert(#[error(not(source))] String),
    /// A blocking transcode task panicked or was cancelled.
    #[display("Transcoding task failed")]
    Task,
    /// A configured directory could not be opened at startup.
    #[display("cannot open {_0} directory")]
    Setup(#[error(not(source))] &'static str),
    /// The listener could not be bound or the server loop failed.
    #[display("server I/O error")]
    Serve,
}

impl ErrorKind {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ModelNotFound(_) | Self::FileNotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            Self::Storage
            | Self::Parse(_)
            | Self::Manifest(_)
            | Self::Convert(_)
            | Self::Task
            | Self::Setup(_)
            | Self::Serve => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Wrap a storage error, keeping it as a child of the new tree.
    ///
    /// Missing and invalid paths become `not_found`, filtered paths become
    /// [`Forbidden`](Self::Forbidden), everything else is
    /// [`Storage`](Self::Storage).
    #[track_caller]
    pub fn storage(err: StorageError, not_found: ErrorKind) -> Error {
        let kind = if err.is_not_found() {
            not_found
        } else if matches!(&*err, StorageErrorKind::FilteredPath(_)) {
            Self::Forbidden
        } else {
            Self::Storage
        };
        err.raise(kind)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

/// Adapter that lets handlers return [`Error`] with `?`.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl From<ErrorKind> for ApiError {
    #[track_caller]
    fn from(kind: ErrorKind) -> Self {
        Self(exn::Exn::from(kind))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind: &ErrorKind = &self.0;
        let status = kind.status();
        if status.is_server_error() {
            tracing::error!(error = ?self.0, "request failed");
        } else {
            tracing::debug!(error = %kind, status = status.as_u16(), "request rejected");
        }
        let body = Json(ErrorBody { detail: kind.to_string() });
        match kind {
            ErrorKind::RangeNotSatisfiable { length } => {
                (status, [(header::CONTENT_RANGE, format!("bytes */{length}"))], body).into_response()
            },
            ErrorKind::Unauthorized => (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response(),
            _ => (status, body).into_response(),
        }
    }
}
