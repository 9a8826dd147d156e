//! API Handlers
//!
//! HTTP request handlers for each cache endpoint.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::facade::Cache;
use crate::models::{
    DeleteResponse, FlushResponse, GetResponse, HealthResponse, PruneResponse, SetRequest,
    SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Cache,
    /// TTL in seconds for writes that do not carry one
    pub default_ttl: u64,
}

impl AppState {
    pub fn new(cache: Cache, default_ttl: u64) -> Self {
        Self { cache, default_ttl }
    }

    pub fn from_config(cache: Cache, config: &Config) -> Self {
        Self::new(cache, config.default_ttl)
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair in every tier with an optional TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let value = req.value_bytes().map_err(CacheError::InvalidRequest)?;
    let ttl = req.ttl.unwrap_or(state.default_ttl);
    let ttl_delta = i64::try_from(ttl)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .ok_or_else(|| CacheError::InvalidRequest(format!("TTL out of range: {}", ttl)))?;
    state
        .cache
        .set(&req.key, value, ttl_delta)
        .await?;

    Ok(Json(SetResponse::new(req.key, ttl)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let entry = state.cache.get(&key).await?;

    Ok(Json(GetResponse::new(key, &entry.value, entry.expires_at)))
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.cache.delete(&key).await?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for POST /prune
pub async fn prune_handler(State(state): State<AppState>) -> Result<Json<PruneResponse>> {
    let removed = state.cache.prune().await?;

    Ok(Json(PruneResponse { removed }))
}

/// Handler for POST /flush
pub async fn flush_handler(State(state): State<AppState>) -> Result<Json<FlushResponse>> {
    state.cache.flush().await?;

    Ok(Json(FlushResponse::flushed()))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let memory = state.cache.memory_stats().await.unwrap_or_default();

    Json(StatsResponse::new(memory, state.cache.refill_counters()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
