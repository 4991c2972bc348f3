//! Obtaining a FASTDOG container for a model file.

use crate::AppState;
use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use fastdog_cache::{CacheKey, CacheStatus, TranscodedBlob};
use fastdog_gltf::ModelFormat;
use fastdog_storage::FileInfo;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::instrument;

/// A container ready to serve, and how it was obtained.
pub(crate) struct Loaded {
    pub blob: Arc<TranscodedBlob>,
    pub status: CacheStatus,
}

/// Resolve `filename` in the models directory and return its container.
///
/// A valid `<stem>.fastdog` next to the source wins. Otherwise the cache is
/// consulted, transcoding on a miss.
#[instrument(skip(state), fields(key, status))]
pub(crate) async fn load(state: &AppState, filename: &str) -> Result<Loaded> {
    let path = Path::new(filename);
    let info = state
        .models
        .stat(path)
        .await
        .map_err(|err| ErrorKind::storage(err, ErrorKind::ModelNotFound(filename.to_string())))?;

    if let Some(blob) = sidecar(state, &info).await {
        state.cache.record_direct_hit();
        record(&blob.key, CacheStatus::Direct);
        return Ok(Loaded { blob: Arc::new(blob), status: CacheStatus::Direct });
    }

    let key = CacheKey::fingerprint(&info.location, info.modified, info.size);
    let (blob, status) = state.cache.get_or_compute(&key, || compute(state, &info, key.clone())).await?;
    record(&key, status);
    Ok(Loaded { blob, status })
}

fn record(key: &CacheKey, status: CacheStatus) {
    let span = tracing::Span::current();
    span.record("key", key.as_str());
    span.record("status", status.as_str());
}

async fn compute(state: &AppState, info: &FileInfo, key: CacheKey) -> Result<TranscodedBlob> {
    let source = state.models.read(&info.path).await.map_err(|err| {
        ErrorKind::storage(err, ErrorKind::ModelNotFound(info.path.display().to_string()))
    })?;
    let original_size = source.len() as u64;
    let transcoded = tokio::task::spawn_blocking(move || fastdog_gltf::transcode(&source))
        .await
        .or_raise(|| ErrorKind::Task)?
        .map_err(convert)?;
    tracing::info!(
        path = %info.path.display(),
        key = %key,
        original_size,
        compressed_size = transcoded.container.len(),
        "model transcoded"
    );
    Ok(TranscodedBlob::new(key, transcoded.container, original_size, transcoded.version))
}

/// Pre-built container beside the source file, if one exists and its
/// framing is intact. Problems are logged and treated as absent.
async fn sidecar(state: &AppState, source: &FileInfo) -> Option<TranscodedBlob> {
    if source.format == ModelFormat::Fastdog {
        return None;
    }
    let path: PathBuf = source.path.with_extension("fastdog");
    let info = match state.models.stat(&path).await {
        Ok(info) => info,
        Err(err) if err.is_not_found() => return None,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = ?err, "cannot stat sidecar, transcoding instead");
            return None;
        },
    };
    let bytes = match state.models.read(&path).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = ?err, "cannot read sidecar, transcoding instead");
            return None;
        },
    };
    match fastdog_container::inspect(&bytes) {
        Ok(header) => {
            let mut bytes = bytes;
            bytes.truncate(header.total_len());
            let key = CacheKey::fingerprint(&info.location, info.modified, info.size);
            Some(TranscodedBlob::new(key, bytes, source.size, header.version))
        },
        Err(err) => {
            tracing::warn!(path = %path.display(), error = ?err, "ignoring invalid sidecar");
            None
        },
    }
}

#[track_caller]
fn convert(err: fastdog_gltf::error::Error) -> Error {
    let detail = (*err).to_string();
    err.raise(ErrorKind::Convert(detail))
}
