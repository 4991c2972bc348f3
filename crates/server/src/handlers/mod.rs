//! HTTP request handlers for API endpoints

mod cache;
mod files;
mod models;

pub use self::cache::{cache_clear, cache_stats};
pub use self::files::static_file;
pub use self::models::{model_binary, model_blob, model_info, model_manifest, model_raw};

use crate::types::HealthResponse;
use axum::Json;
use axum::response::IntoResponse;

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
