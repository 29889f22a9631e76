//! Masnavi book (daftar) endpoints

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use rumi_common::db::models::{MasnaviBook, MasnaviPoem, NewMasnaviBook};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/masnavi-books", get(list_books).post(create_book))
        .route("/masnavi-books/daftar/:number", get(book_by_daftar))
        .route("/masnavi-books/:book_id/poems", get(poems_by_book))
}

/// GET /api/masnavi-books (daftar order)
pub async fn list_books(State(state): State<AppState>) -> ApiResult<Json<Vec<MasnaviBook>>> {
    Ok(Json(state.store.list_books().await?))
}

/// GET /api/masnavi-books/daftar/:number
pub async fn book_by_daftar(
    State(state): State<AppState>,
    number: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MasnaviBook>> {
    let Path(number) = number?;

    state
        .store
        .book_by_daftar(number)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Daftar {}", number)))
}

/// GET /api/masnavi-books/:book_id/poems
///
/// An unknown book yields an empty list rather than a 404.
pub async fn poems_by_book(
    State(state): State<AppState>,
    book_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<MasnaviPoem>>> {
    let Path(book_id) = book_id?;
    Ok(Json(state.store.masnavi_poems_by_book(book_id).await?))
}

/// POST /api/masnavi-books
pub async fn create_book(
    State(state): State<AppState>,
    body: Result<Json<NewMasnaviBook>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MasnaviBook>)> {
    let Json(book) = body?;

    let created = state.store.create_book(book).await?;
    info!("Added daftar {} (id {})", created.daftar_number, created.id);

    Ok((StatusCode::CREATED, Json(created)))
}
