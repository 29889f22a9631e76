//! Verse-of-the-day endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Local;
use rumi_common::db::models::{DailyVerse, NewDailyVerse};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/daily-verse", get(daily_verse))
        .route("/random-verse", get(random_verse))
        .route("/daily-verses", post(create_daily_verse))
}

/// GET /api/daily-verse
///
/// Verse dated today (server-local date), else a random one.
pub async fn daily_verse(State(state): State<AppState>) -> ApiResult<Json<DailyVerse>> {
    state
        .store
        .daily_verse(Local::now().date_naive())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No verses available".to_string()))
}

/// GET /api/random-verse
pub async fn random_verse(State(state): State<AppState>) -> ApiResult<Json<DailyVerse>> {
    state
        .store
        .random_verse()
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No verses available".to_string()))
}

/// POST /api/daily-verses
pub async fn create_daily_verse(
    State(state): State<AppState>,
    body: Result<Json<NewDailyVerse>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<DailyVerse>)> {
    let Json(verse) = body?;
    let created = state.store.create_daily_verse(verse).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
