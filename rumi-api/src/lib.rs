//! rumi-api library - HTTP adapter for the Rumi poetry catalogue
//!
//! Maps requests onto [`PoetryStore`] calls and serialises the results as
//! JSON. All catalogue routes live under `/api`; `/health` is at the root.

use axum::Router;
use rumi_common::config::StorageConfig;
use rumi_common::db::seed_sample_data;
use rumi_common::{open_store, PoetryStore};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Catalogue backend chosen at startup
    pub store: Arc<dyn PoetryStore>,
    /// Used by the health endpoint to report uptime
    pub startup_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(store: Arc<dyn PoetryStore>) -> Self {
        Self {
            store,
            startup_time: Instant::now(),
        }
    }
}

/// Open the configured backend and seed it when enabled
///
/// Seeding errors are returned; the server does not start on a store it
/// could not seed.
pub async fn prepare_store(config: &StorageConfig) -> rumi_common::Result<Arc<dyn PoetryStore>> {
    let store = open_store(config).await?;
    if config.seed_sample_data {
        seed_sample_data(store.as_ref()).await?;
    }
    Ok(store)
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let catalogue = Router::new()
        .merge(api::divan::routes())
        .merge(api::masnavi::routes())
        .merge(api::books::routes())
        .merge(api::collections::routes())
        .merge(api::verses::routes())
        .merge(api::poems::routes())
        .merge(api::search::routes());

    Router::new()
        .nest("/api", catalogue)
        .merge(api::health::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
