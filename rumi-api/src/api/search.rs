//! Full-text search across both poem kinds

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use rumi_common::db::models::Poem;
use rumi_common::search::SearchQuery;
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiResult;
use crate::AppState;

/// Query parameters for search
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Whitespace-separated terms; every term must match
    #[serde(default)]
    pub q: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/search", get(search))
}

/// GET /api/search?q=
///
/// Title hits on the whole query come first, then Divan before Masnavi.
/// At most 20 hits per kind. A missing or blank `q` is a 400.
pub async fn search(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Poem>>> {
    let Query(params) = params?;
    let query = SearchQuery::parse(&params.q)?;

    let hits = state.store.search(&query).await?;
    debug!(q = %params.q, hits = hits.len(), "Search");

    Ok(Json(hits))
}
