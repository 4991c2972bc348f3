use crate::AppState;
use crate::body;
use crate::error::{ApiError, ErrorKind, Result};
use crate::range::RangeRequest;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::Response;
use fastdog_storage::BackendHandle;
use futures::TryStreamExt;
use std::path::PathBuf;

/// Serve a file from the static directory. Model files are refused with `403`.
pub async fn static_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> std::result::Result<Response, ApiError> {
    let not_found = ErrorKind::FileNotFound(path.clone());
    let response = serve_file(
        &state.static_files,
        PathBuf::from(path),
        &headers,
        state.streaming.file_chunk_size.get(),
        not_found,
    )
    .await?;
    Ok(response)
}

/// Stream a file, or the part of it selected by the `Range` header,
/// straight from the backend without buffering it.
pub(crate) async fn serve_file(
    backend: &BackendHandle,
    path: PathBuf,
    headers: &HeaderMap,
    chunk_size: usize,
    not_found: ErrorKind,
) -> Result<Response> {
    let info = backend
        .stat(&path)
        .await
        .map_err(|err| ErrorKind::storage(err, not_found.clone()))?;
    let request = RangeRequest::from_headers(headers, info.size);
    let Some(span) = request.span(info.size) else {
        exn::bail!(ErrorKind::RangeNotSatisfiable { length: info.size });
    };
    tracing::debug!(path = %path.display(), start = span.start, end = span.end, size = info.size, "streaming file");

    let stream = backend
        .stream_range(&path, span, chunk_size)
        .await
        .map_err(|err| ErrorKind::storage(err, not_found))?;
    let location = info.location;
    let stream = stream.inspect_err(move |err| {
        tracing::warn!(location = %location.display(), error = %err, "file stream aborted");
    });
    Ok(body::ranged(request, info.size, content_type(&path), Vec::new(), Body::from_stream(stream)))
}

fn content_type(path: &std::path::Path) -> &'static str {
    let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("gltf") => "model/gltf+json",
        Some("glb") => "model/gltf-binary",
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("ktx2") => "image/ktx2",
        Some("wasm") => "application/wasm",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Duck.gltf", "model/gltf+json")]
    #[case("models/Duck.GLB", "model/gltf-binary")]
    #[case("css/site.css", "text/css; charset=utf-8")]
    #[case("textures/wood.jpeg", "image/jpeg")]
    #[case("Duck.bin", "application/octet-stream")]
    #[case("README", "application/octet-stream")]
    fn content_type_by_extension(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(content_type(std::path::Path::new(path)), expected);
    }
}
