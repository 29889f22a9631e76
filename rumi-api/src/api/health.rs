//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Revision stamped into the binary by `build.rs`
#[derive(Debug, Clone, Serialize)]
pub struct BuildInfo {
    /// `git describe` output, or "unknown" outside a checkout
    pub git_hash: &'static str,
    pub built_at: &'static str,
    pub profile: &'static str,
}

impl BuildInfo {
    pub const CURRENT: BuildInfo = BuildInfo {
        git_hash: env!("GIT_HASH"),
        built_at: env!("BUILD_TIMESTAMP"),
        profile: env!("BUILD_PROFILE"),
    };
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub build: BuildInfo,
    /// Storage backend in use ("sqlite" or "memory")
    pub backend: String,
    pub uptime_seconds: u64,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "rumi-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        build: BuildInfo::CURRENT,
        backend: state.store.backend_name().to_string(),
        uptime_seconds: state.startup_time.elapsed().as_secs(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
