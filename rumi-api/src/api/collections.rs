//! Collection endpoints

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rumi_common::db::models::{Collection, NewCollection};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/collections", get(list_collections).post(create_collection))
        .route("/collections/:id", get(collection))
}

pub async fn list_collections(State(state): State<AppState>) -> ApiResult<Json<Vec<Collection>>> {
    Ok(Json(state.store.list_collections().await?))
}

pub async fn collection(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Collection>> {
    let Path(id) = id?;

    state
        .store
        .collection(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Collection {}", id)))
}

pub async fn create_collection(
    State(state): State<AppState>,
    body: Result<Json<NewCollection>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Collection>)> {
    let Json(collection) = body?;
    let created = state.store.create_collection(collection).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
