//! Kind-generic poem endpoints

use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use rumi_common::db::models::{Poem, PoemKind};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/poems/:kind/:id", get(poem))
        .route("/poems/:kind/:id/favorite", post(toggle_favorite))
}

/// GET /api/poems/:kind/:id
pub async fn poem(
    State(state): State<AppState>,
    path: Result<Path<(String, i64)>, PathRejection>,
) -> ApiResult<Json<Poem>> {
    let Path((kind, id)) = path?;
    let kind: PoemKind = kind.parse()?;

    state
        .store
        .poem(kind, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("{} poem {}", kind, id)))
}

/// POST /api/poems/:kind/:id/favorite
///
/// Flips the favorite flag and returns the updated poem with its `kind`.
pub async fn toggle_favorite(
    State(state): State<AppState>,
    path: Result<Path<(String, i64)>, PathRejection>,
) -> ApiResult<Json<Poem>> {
    let Path((kind, id)) = path?;
    let kind: PoemKind = kind.parse()?;

    state
        .store
        .toggle_favorite(kind, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("{} poem {}", kind, id)))
}
