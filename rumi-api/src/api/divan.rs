//! Divan-e Shams endpoints

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rumi_common::db::models::{DivanPoem, NewDivanPoem};
use serde_json::{json, Value};
use tracing::info;

use super::{ListParams, PageResponse, TagParams};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/divan-poems", get(list_divan_poems).post(create_divan_poem))
        .route("/divan-poems/count", get(count_divan_poems))
        .route("/divan-poems/favorites", get(favorite_divan_poems))
        .route("/divan-poems/ghazal/:number", get(divan_poem_by_ghazal))
        .route("/divan-poems/:id/toggle-favorite", post(toggle_divan_favorite))
}

/// GET /api/divan-poems?page=&page_size=&tag=
pub async fn list_divan_poems(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<PageResponse<DivanPoem>>> {
    let Query(params) = params?;
    let request = params.page_request()?;

    let items = state.store.list_divan_poems(request, params.tag()).await?;
    Ok(Json(PageResponse::new(items, request)))
}

/// GET /api/divan-poems/count?tag=
pub async fn count_divan_poems(
    State(state): State<AppState>,
    params: Result<Query<TagParams>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(params) = params?;
    let count = state.store.count_divan_poems(params.tag()).await?;
    Ok(Json(json!({ "count": count })))
}

/// GET /api/divan-poems/favorites
pub async fn favorite_divan_poems(State(state): State<AppState>) -> ApiResult<Json<Vec<DivanPoem>>> {
    Ok(Json(state.store.favorite_divan_poems().await?))
}

/// GET /api/divan-poems/ghazal/:number
pub async fn divan_poem_by_ghazal(
    State(state): State<AppState>,
    number: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<DivanPoem>> {
    let Path(number) = number?;

    state
        .store
        .divan_poem_by_ghazal(number)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Ghazal {}", number)))
}

/// POST /api/divan-poems/:id/toggle-favorite
pub async fn toggle_divan_favorite(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<DivanPoem>> {
    let Path(id) = id?;

    state
        .store
        .toggle_divan_favorite(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Divan poem {}", id)))
}

/// POST /api/divan-poems
pub async fn create_divan_poem(
    State(state): State<AppState>,
    body: Result<Json<NewDivanPoem>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DivanPoem>)> {
    let Json(poem) = body?;

    let created = state.store.create_divan_poem(poem).await?;
    info!("Added ghazal {} (id {})", created.ghazal_number, created.id);

    Ok((StatusCode::CREATED, Json(created)))
}
