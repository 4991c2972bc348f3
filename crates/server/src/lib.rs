//! HTTP server for model files and their FASTDOG containers.
//!
//! Routes under the configured API prefix (`/api/v1/resources` by default):
//!
//! | Method | Path | |
//! |--------|------|-|
//! | GET | `/models/{filename}` | raw file, ranged |
//! | GET | `/models/{filename}/info` | structural counts |
//! | GET | `/models/{filename}/manifest` | loadable parts |
//! | GET | `/models/{filename}/binary` | container, ranged, diagnostic headers |
//! | GET | `/models/{filename}/blob` | container download, authenticated |
//! | GET | `/cache/stats` | transcode cache counters |
//! | POST | `/cache/clear` | empty the transcode cache, authenticated |
//!
//! Plus `/static/{*path}` for the static directory (model files excluded)
//! and `/health`.

mod auth;
mod body;
pub mod error;
mod handlers;
mod range;
mod transcode;
pub mod types;

pub use crate::auth::{Authenticated, Authenticator, TokenAuthenticator};
pub use crate::range::{ByteRange, RangeRequest};

use crate::error::{ErrorKind, Result};
use axum::Router;
use axum::routing::{get, post};
use exn::ResultExt;
use fastdog_cache::TranscodeCache;
use fastdog_config::{Config, StreamingConfig};
use fastdog_storage::BackendHandle;
use fastdog_storage::backend::{LocalBackend, ProtectedBackend};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Server state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Where `/models/{filename}` resolves.
    pub models: BackendHandle,
    /// Where `/static/{*path}` resolves; expected to refuse model files.
    pub static_files: BackendHandle,
    pub cache: Arc<TranscodeCache>,
    pub auth: Arc<dyn Authenticator>,
    pub streaming: StreamingConfig,
    pub api_prefix: String,
}

impl AppState {
    /// State with default streaming settings and API prefix.
    pub fn new(
        models: BackendHandle,
        static_files: BackendHandle,
        cache: Arc<TranscodeCache>,
        auth: Arc<dyn Authenticator>,
    ) -> Self {
        let defaults = Config::default();
        Self {
            models,
            static_files,
            cache,
            auth,
            streaming: defaults.streaming,
            api_prefix: defaults.api_prefix,
        }
    }

    /// Open the configured directories and build a fresh cache.
    pub fn from_config(config: &Config) -> Result<Self> {
        let models = LocalBackend::new("models", &config.models_dir).or_raise(|| ErrorKind::Setup("models"))?;
        let static_root = LocalBackend::new("static", &config.static_dir).or_raise(|| ErrorKind::Setup("static"))?;
        let static_files = ProtectedBackend::new(Arc::new(static_root), &config.protected_extensions);
        let auth = TokenAuthenticator::new(config.auth.tokens.iter().map(|(name, token)| (name.as_str(), token.as_str())));
        if config.auth.tokens.is_empty() {
            tracing::warn!("no auth tokens configured; authenticated routes will reject every request");
        }
        Ok(Self {
            models: Arc::new(models),
            static_files: Arc::new(static_files),
            cache: Arc::new(TranscodeCache::new(config.cache.capacity)),
            auth: Arc::new(auth),
            streaming: config.streaming,
            api_prefix: config.api_prefix.clone(),
        })
    }
}

/// Build the router with every endpoint.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/models/{filename}", get(handlers::model_raw))
        .route("/models/{filename}/info", get(handlers::model_info))
        .route("/models/{filename}/manifest", get(handlers::model_manifest))
        .route("/models/{filename}/binary", get(handlers::model_binary))
        .route("/models/{filename}/blob", get(handlers::model_blob))
        .route("/cache/stats", get(handlers::cache_stats))
        .route("/cache/clear", post(handlers::cache_clear));
    // Nesting at the root is not allowed.
    let router = match state.api_prefix.as_str() {
        "/" => Router::new().merge(api),
        prefix => Router::new().nest(prefix, api),
    };
    router
        .route("/health", get(handlers::health))
        .route("/static/{*path}", get(handlers::static_file))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Listen on `addr` until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await.or_raise(|| ErrorKind::Serve)?;
    let local = listener.local_addr().or_raise(|| ErrorKind::Serve)?;
    tracing::info!(addr = %local, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .or_raise(|| ErrorKind::Serve)
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutting down"),
        Err(err) => {
            tracing::error!(error = %err, "cannot listen for shutdown signal");
            std::future::pending::<()>().await;
        },
    }
}
