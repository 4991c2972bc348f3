use crate::body::{self, HeaderList};
use crate::error::{ApiError, ErrorKind, Result};
use crate::handlers::files::serve_file;
use crate::range::RangeRequest;
use crate::transcode::{Loaded, load};
use crate::types::{
    CONTAINER_FORMAT, CompressionInfo, ESTIMATED_RATIO, InfoResponse, LOD_LEVELS, ManifestResponse, StreamingInfo,
};
use crate::{AppState, Authenticated};
use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderName, header};
use axum::response::Response;
use exn::ResultExt;
use fastdog_gltf::{Normalized, Summary};
use std::path::PathBuf;

type HandlerResult<T> = std::result::Result<T, ApiError>;

/// Raw model file, honouring `Range`.
pub async fn model_raw(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> HandlerResult<Response> {
    let not_found = ErrorKind::ModelNotFound(filename.clone());
    let response = serve_file(
        &state.models,
        PathBuf::from(filename),
        &headers,
        state.streaming.file_chunk_size.get(),
        not_found,
    )
    .await?;
    Ok(response)
}

/// Structural counts of a model, without transcoding it.
pub async fn model_info(State(state): State<AppState>, Path(filename): Path<String>) -> HandlerResult<Json<InfoResponse>> {
    let (size, normalized) = read_normalized(&state, &filename, ErrorKind::Parse).await?;
    Ok(Json(InfoResponse {
        name: filename,
        size,
        format: normalized.origin.as_str().to_string(),
        summary: Summary::of(&normalized.document),
        compression_available: true,
        estimated_compressed_size: size / 3,
    }))
}

/// Loadable parts of a model and how to stream them.
pub async fn model_manifest(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> HandlerResult<Json<ManifestResponse>> {
    let (size, normalized) = read_normalized(&state, &filename, ErrorKind::Manifest).await?;
    let parts = fastdog_gltf::parts(&normalized.document).map_err(|err| {
        let detail = (*err).to_string();
        err.raise(ErrorKind::Manifest(detail))
    })?;
    Ok(Json(ManifestResponse {
        model_name: filename,
        total_size: size,
        format: normalized.origin.as_str().to_string(),
        parts,
        lod_levels: LOD_LEVELS.map(String::from).to_vec(),
        compression: CompressionInfo {
            available: true,
            format: CONTAINER_FORMAT.to_string(),
            estimated_ratio: ESTIMATED_RATIO,
        },
        streaming: StreamingInfo {
            chunk_size: state.streaming.file_chunk_size.get(),
            supports_range: true,
        },
    }))
}

/// FASTDOG container for a model, honouring `Range`.
pub async fn model_binary(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> HandlerResult<Response> {
    let loaded = load(&state, &filename).await?;
    let total = loaded.blob.compressed_size();
    let request = RangeRequest::from_headers(&headers, total);
    let Some(span) = request.span(total) else {
        return Err(ErrorKind::RangeNotSatisfiable { length: total }.into());
    };
    // Spans always lie within the payload.
    let payload = loaded.blob.payload.slice(span.start as usize..span.end as usize);
    let chunks = body::chunked(payload, state.streaming.blob_chunk_size.get());
    let extra = diagnostics(&state, &loaded);
    Ok(body::ranged(request, total, "application/octet-stream", extra, Body::from_stream(chunks)))
}

/// Complete FASTDOG container as a download. Requires authentication.
pub async fn model_blob(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(filename): Path<String>,
) -> HandlerResult<Response> {
    let loaded = load(&state, &filename).await?;
    tracing::info!(principal = %principal, filename = %filename, status = loaded.status.as_str(), "blob download");
    let total = loaded.blob.compressed_size();
    let chunks = body::chunked(loaded.blob.payload.clone(), state.streaming.blob_chunk_size.get());
    let mut extra = diagnostics(&state, &loaded);
    extra.push((header::CONTENT_DISPOSITION, format!("attachment; filename={filename}.bin")));
    extra.push((header::ACCESS_CONTROL_EXPOSE_HEADERS, EXPOSED_HEADERS.join(", ")));
    Ok(body::ranged(RangeRequest::Full, total, "application/octet-stream", extra, Body::from_stream(chunks)))
}

const EXPOSED_HEADERS: [&str; 5] =
    ["Content-Disposition", "X-Original-Size", "X-Compressed-Size", "X-Compression-Ratio", "X-Format"];

fn diagnostics(state: &AppState, loaded: &Loaded) -> HeaderList {
    let blob = &loaded.blob;
    let hit_rate = state.cache.stats().hit_rate();
    vec![
        (HeaderName::from_static("x-original-size"), blob.original_size.to_string()),
        (HeaderName::from_static("x-compressed-size"), blob.compressed_size().to_string()),
        (HeaderName::from_static("x-compression-ratio"), format!("{:.2}", blob.ratio())),
        (HeaderName::from_static("x-format"), CONTAINER_FORMAT.to_string()),
        (HeaderName::from_static("x-format-version"), blob.version.as_u32().to_string()),
        (HeaderName::from_static("x-cache-key"), blob.key.to_string()),
        (HeaderName::from_static("x-cache-status"), loaded.status.as_str().to_string()),
        (HeaderName::from_static("x-cache-hit-rate"), format!("{hit_rate:.1}%")),
        (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
        (header::ETAG, blob.etag()),
    ]
}

/// Read a model and normalize it on the blocking pool.
///
/// `failed` wraps the detail of a parse failure into the endpoint's error.
async fn read_normalized(
    state: &AppState,
    filename: &str,
    failed: fn(String) -> ErrorKind,
) -> Result<(u64, Normalized)> {
    let path = PathBuf::from(filename);
    let bytes = state
        .models
        .read(&path)
        .await
        .map_err(|err| ErrorKind::storage(err, ErrorKind::ModelNotFound(filename.to_string())))?;
    let size = bytes.len() as u64;
    let normalized = tokio::task::spawn_blocking(move || fastdog_gltf::normalize(&bytes))
        .await
        .or_raise(|| ErrorKind::Task)?
        .map_err(|err| {
            let detail = (*err).to_string();
            err.raise(failed(detail))
        })?;
    Ok((size, normalized))
}
