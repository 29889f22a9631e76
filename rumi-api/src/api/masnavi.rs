//! Masnavi poem endpoints

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rumi_common::db::models::{MasnaviPoem, NewMasnaviPoem};
use serde_json::{json, Value};
use tracing::info;

use super::{ListParams, PageResponse, TagParams};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/masnavi-poems", get(list_masnavi_poems).post(create_masnavi_poem))
        .route("/masnavi-poems/count", get(count_masnavi_poems))
        .route("/masnavi-poems/favorites", get(favorite_masnavi_poems))
        .route("/masnavi-poems/:id", get(masnavi_poem))
        .route("/masnavi-poems/:id/toggle-favorite", post(toggle_masnavi_favorite))
}

/// GET /api/masnavi-poems?page=&page_size=&tag=
pub async fn list_masnavi_poems(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<PageResponse<MasnaviPoem>>> {
    let Query(params) = params?;
    let request = params.page_request()?;

    let items = state.store.list_masnavi_poems(request, params.tag()).await?;
    Ok(Json(PageResponse::new(items, request)))
}

/// GET /api/masnavi-poems/count?tag=
pub async fn count_masnavi_poems(
    State(state): State<AppState>,
    params: Result<Query<TagParams>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(params) = params?;
    let count = state.store.count_masnavi_poems(params.tag()).await?;
    Ok(Json(json!({ "count": count })))
}

pub async fn favorite_masnavi_poems(State(state): State<AppState>) -> ApiResult<Json<Vec<MasnaviPoem>>> {
    Ok(Json(state.store.favorite_masnavi_poems().await?))
}

/// GET /api/masnavi-poems/:id
pub async fn masnavi_poem(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MasnaviPoem>> {
    let Path(id) = id?;

    state
        .store
        .masnavi_poem(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Masnavi poem {}", id)))
}

/// POST /api/masnavi-poems/:id/toggle-favorite
pub async fn toggle_masnavi_favorite(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MasnaviPoem>> {
    let Path(id) = id?;

    state
        .store
        .toggle_masnavi_favorite(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Masnavi poem {}", id)))
}

/// POST /api/masnavi-poems
pub async fn create_masnavi_poem(
    State(state): State<AppState>,
    body: Result<Json<NewMasnaviPoem>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MasnaviPoem>)> {
    let Json(poem) = body?;

    let created = state.store.create_masnavi_poem(poem).await?;
    info!("Added Masnavi poem {} to book {}", created.id, created.book_id);

    Ok((StatusCode::CREATED, Json(created)))
}
