//! Response bodies.

use fastdog_gltf::{Part, Summary};
use serde::Serialize;

pub const CONTAINER_FORMAT: &str = "fastdog-binary-v1";
/// Detail levels advertised to clients; every level currently maps to the full model.
pub const LOD_LEVELS: [&str; 4] = ["preview", "low", "medium", "high"];
/// Rough container-to-source size ratio quoted before anything is transcoded.
pub const ESTIMATED_RATIO: f64 = 0.3;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub name: String,
    pub size: u64,
    pub format: String,
    #[serde(flatten)]
    pub summary: Summary,
    pub compression_available: bool,
    pub estimated_compressed_size: u64,
}

#[derive(Debug, Serialize)]
pub struct ManifestResponse {
    pub model_name: String,
    pub total_size: u64,
    pub format: String,
    pub parts: Vec<Part>,
    pub lod_levels: Vec<String>,
    pub compression: CompressionInfo,
    pub streaming: StreamingInfo,
}

#[derive(Debug, Serialize)]
pub struct CompressionInfo {
    pub available: bool,
    pub format: String,
    pub estimated_ratio: f64,
}

#[derive(Debug, Serialize)]
pub struct StreamingInfo {
    pub chunk_size: usize,
    pub supports_range: bool,
}

#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    pub cache_info: CacheInfo,
    pub custom_stats: CustomStats,
    /// Percentage with two decimals, e.g. `"66.67%"`.
    pub hit_rate: String,
    /// Share of capacity in use, one decimal.
    pub memory_efficiency: String,
}

#[derive(Debug, Serialize)]
pub struct CacheInfo {
    pub hits: u64,
    pub misses: u64,
    pub maxsize: usize,
    pub currsize: usize,
}

#[derive(Debug, Serialize)]
pub struct CustomStats {
    pub hits: u64,
    pub misses: u64,
    pub total_requests: u64,
}

#[derive(Debug, Serialize)]
pub struct CacheClearResponse {
    pub message: String,
    pub cleared_by: String,
}
