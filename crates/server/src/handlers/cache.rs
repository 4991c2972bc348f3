use crate::AppState;
use crate::Authenticated;
use crate::types::{CacheClearResponse, CacheInfo, CacheStatsResponse, CustomStats};
use axum::Json;
use axum::extract::State;

/// Transcode cache counters.
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let stats = state.cache.stats();
    Json(CacheStatsResponse {
        cache_info: CacheInfo {
            hits: stats.hits,
            misses: stats.misses,
            maxsize: stats.capacity,
            currsize: stats.size,
        },
        custom_stats: CustomStats {
            hits: stats.hits,
            misses: stats.misses,
            total_requests: stats.total_requests,
        },
        hit_rate: format!("{:.2}%", stats.hit_rate()),
        memory_efficiency: format!("{:.1}%", stats.occupancy()),
    })
}

/// Drop every cached container. Requires authentication.
pub async fn cache_clear(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
) -> Json<CacheClearResponse> {
    state.cache.clear();
    tracing::info!(principal = %principal, "cache cleared on request");
    Json(CacheClearResponse {
        message: "Cache cleared successfully".to_string(),
        cleared_by: principal,
    })
}
