use crate::range::RangeRequest;
use async_stream::stream;
use axum::body::Body;
use axum::http::{HeaderName, StatusCode, header};
use axum::response::{AppendHeaders, IntoResponse, Response};
use bytes::Bytes;
use futures::Stream;
use std::convert::Infallible;

/// Headers in the order they should be sent.
pub(crate) type HeaderList = Vec<(HeaderName, String)>;

/// Yield `payload` in pieces of at most `chunk_size` bytes.
///
/// Every piece is a view into the same allocation.
pub(crate) fn chunked(payload: Bytes, chunk_size: usize) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
    let chunk_size = chunk_size.max(1);
    stream! {
        let mut remaining = payload;
        while !remaining.is_empty() {
            yield Ok(remaining.split_to(chunk_size.min(remaining.len())));
        }
    }
}

/// Build a `200` or `206` response around an already-sliced body.
///
/// `request` must not be [`RangeRequest::Unsatisfiable`]; callers turn that
/// into an error before opening the body.
pub(crate) fn ranged(request: RangeRequest, total: u64, content_type: &str, extra: HeaderList, body: Body) -> Response {
    let mut headers: HeaderList = vec![
        (header::CONTENT_TYPE, content_type.to_string()),
        (header::ACCEPT_RANGES, "bytes".to_string()),
    ];
    let status = match request {
        RangeRequest::Partial(range) => {
            headers.push((header::CONTENT_RANGE, range.content_range(total)));
            headers.push((header::CONTENT_LENGTH, range.len().to_string()));
            StatusCode::PARTIAL_CONTENT
        },
        RangeRequest::Full | RangeRequest::Unsatisfiable => {
            headers.push((header::CONTENT_LENGTH, total.to_string()));
            StatusCode::OK
        },
    };
    headers.extend(extra);
    (status, AppendHeaders(headers), body).into_response()
}
