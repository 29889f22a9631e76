//! Integration tests for rumi-api endpoints
//!
//! Every test builds the router over a fresh store with a small fixture
//! and drives it with `oneshot`; no network socket is opened.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Local;
use rumi_api::{build_router, prepare_store, AppState};
use rumi_common::config::{StorageBackend, StorageConfig};
use rumi_common::db::init::init_memory_database;
use rumi_common::db::models::{NewDailyVerse, NewDivanPoem, NewMasnaviBook, NewMasnaviPoem};
use rumi_common::store::{verse_date, MemoryStore, PoetryStore, SqliteStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot` method

fn ghazal(number: i64, content: &str, tags: &[&str]) -> NewDivanPoem {
    NewDivanPoem {
        ghazal_number: number,
        title: format!("Ғазали {}", number),
        content: content.to_string(),
        bayt_count: 8,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        is_favorite: false,
        image_url: None,
        audio_url: None,
        explanation: None,
    }
}

/// Ghazals 24 (Ишқ, Ирфон) and 42 (Ишқ), daftar 1 with one poem, one verse dated today
async fn load_fixture(store: &dyn PoetryStore) {
    store
        .create_divan_poem(ghazal(42, "Эй дӯст, нигоҳи ту чи нури аҷабест", &["Ишқ"]))
        .await
        .unwrap();
    store
        .create_divan_poem(ghazal(24, "Дар зимистон нури хуршед омадӣ", &["Ишқ", "Ирфон"]))
        .await
        .unwrap();

    let book = store
        .create_book(NewMasnaviBook {
            daftar_number: 1,
            title: "Дафтари аввал".to_string(),
            description: "Оғози Маснавӣ".to_string(),
            bayt_count: 4003,
            image_url: None,
            theme_color: "blue".to_string(),
        })
        .await
        .unwrap();

    store
        .create_masnavi_poem(NewMasnaviPoem {
            book_id: book.id,
            title: "Найнома".to_string(),
            content: "Бишнав аз най чун ҳикоят мекунад".to_string(),
            bayt_count: 18,
            tags: vec!["Ишқ".to_string(), "Ҷудоӣ".to_string()],
            is_favorite: false,
            image_url: None,
            audio_url: None,
            explanation: None,
        })
        .await
        .unwrap();

    store
        .create_daily_verse(NewDailyVerse {
            text: "Биё, биё, ҳар чи ҳастӣ, биё".to_string(),
            source: "Девони Шамс".to_string(),
            audio_url: None,
            date: verse_date(Local::now().date_naive()),
        })
        .await
        .unwrap();
}

/// Test helper: router over a fixture-loaded in-memory store
async fn setup_app() -> Router {
    let store: Arc<dyn PoetryStore> = Arc::new(MemoryStore::new());
    load_fixture(store.as_ref()).await;
    build_router(AppState::new(store))
}

/// Percent-encode a query value (URIs must be ASCII)
fn encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => (b as char).to_string(),
            _ => format!("%{:02X}", b),
        })
        .collect()
}

/// Test helper: send a request, return status and JSON body
async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Should parse JSON")
    };
    (status, json)
}

fn ghazal_numbers(items: &Value) -> Vec<i64> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["ghazalNumber"].as_i64().unwrap())
        .collect()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app().await;

    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "rumi-api");
    assert_eq!(body["backend"], "memory");
    assert!(body["version"].is_string());
    assert!(body["uptime_seconds"].is_u64());
    assert!(!body["build"]["git_hash"].as_str().unwrap().is_empty());
    assert!(body["build"]["built_at"].as_str().unwrap().ends_with('Z'));
    assert!(body["build"]["profile"].is_string());
}

// =============================================================================
// Store preparation
// =============================================================================

#[tokio::test]
async fn test_prepare_store_seeds_empty_memory_store() {
    let config = StorageConfig {
        backend: StorageBackend::Memory,
        database_path: Default::default(),
        seed_sample_data: true,
    };

    let store = prepare_store(&config).await.unwrap();

    assert!(!store.is_empty().await.unwrap());
    assert!(store.count_divan_poems(None).await.unwrap() > 0);
}

#[tokio::test]
async fn test_prepare_store_leaves_store_empty_without_seeding() {
    let config = StorageConfig {
        backend: StorageBackend::Memory,
        database_path: Default::default(),
        seed_sample_data: false,
    };

    let store = prepare_store(&config).await.unwrap();

    assert!(store.is_empty().await.unwrap());
}

#[tokio::test]
async fn test_prepare_store_fails_when_seeding_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("rumi.db");

    // A divan_poems table from an older layout, without the folded columns
    let pool = sqlx::SqlitePool::connect(&format!("sqlite://{}?mode=rwc", db_path.display()))
        .await
        .unwrap();
    sqlx::query("CREATE TABLE divan_poems (id INTEGER PRIMARY KEY, ghazal_number INTEGER NOT NULL)")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    let config = StorageConfig {
        backend: StorageBackend::Sqlite,
        database_path: db_path,
        seed_sample_data: true,
    };

    assert!(prepare_store(&config).await.is_err());
}

#[tokio::test]
async fn test_prepare_store_fails_on_unusable_database_path() {
    let temp_dir = tempfile::tempdir().unwrap();
    let blocker = temp_dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"").unwrap();

    let config = StorageConfig {
        backend: StorageBackend::Sqlite,
        database_path: blocker.join("rumi.db"),
        seed_sample_data: true,
    };

    assert!(prepare_store(&config).await.is_err());
}

// =============================================================================
// Divan listing and lookup
// =============================================================================

#[tokio::test]
async fn test_divan_list_defaults() {
    let app = setup_app().await;

    let (status, body) = send(&app, "GET", "/api/divan-poems", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 10);
    assert_eq!(ghazal_numbers(&body["items"]), vec![24, 42]);
    assert_eq!(body["items"][0]["tags"], json!(["Ишқ", "Ирфон"]));
    assert_eq!(body["items"][0]["isFavorite"], false);
}

#[tokio::test]
async fn test_divan_list_pagination() {
    let app = setup_app().await;

    let (_, page2) = send(&app, "GET", "/api/divan-poems?page=2&page_size=1", None).await;
    assert_eq!(ghazal_numbers(&page2["items"]), vec![42]);

    // `limit` is accepted as an alias of page_size
    let (_, limited) = send(&app, "GET", "/api/divan-poems?limit=1", None).await;
    assert_eq!(ghazal_numbers(&limited["items"]), vec![24]);
    assert_eq!(limited["page_size"], 1);

    let (status, past_end) = send(&app, "GET", "/api/divan-poems?page=9", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(past_end["items"], json!([]));
}

#[tokio::test]
async fn test_divan_list_tag_filter() {
    let app = setup_app().await;

    let uri = format!("/api/divan-poems?tag={}", encode("ирфон"));
    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ghazal_numbers(&body["items"]), vec![24]);

    let uri = format!("/api/divan-poems/count?tag={}", encode("Ишқ"));
    let (_, count) = send(&app, "GET", &uri, None).await;
    assert_eq!(count["count"], 2);
}

#[tokio::test]
async fn test_divan_list_rejects_bad_paging() {
    let app = setup_app().await;

    for uri in [
        "/api/divan-poems?page_size=0",
        "/api/divan-poems?page=0",
        "/api/divan-poems?page_size=1000",
        "/api/divan-poems?page=abc",
    ] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"]["code"], "BAD_REQUEST", "{}", uri);
    }
}

#[tokio::test]
async fn test_divan_by_ghazal_number() {
    let app = setup_app().await;

    let (status, body) = send(&app, "GET", "/api/divan-poems/ghazal/24", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Ғазали 24");

    let (status, body) = send(&app, "GET", "/api/divan-poems/ghazal/9999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = send(&app, "GET", "/api/divan-poems/ghazal/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Favorites
// =============================================================================

#[tokio::test]
async fn test_toggle_divan_favorite_twice() {
    let app = setup_app().await;
    let (_, poem) = send(&app, "GET", "/api/divan-poems/ghazal/42", None).await;
    let uri = format!("/api/divan-poems/{}/toggle-favorite", poem["id"]);

    let (status, once) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(once["isFavorite"], true);

    let (_, favorites) = send(&app, "GET", "/api/divan-poems/favorites", None).await;
    assert_eq!(ghazal_numbers(&favorites), vec![42]);

    let (_, twice) = send(&app, "POST", &uri, None).await;
    assert_eq!(twice, poem);

    let (status, _) = send(&app, "POST", "/api/divan-poems/9999/toggle-favorite", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_toggle_favorite_by_kind() {
    let app = setup_app().await;
    let (_, page) = send(&app, "GET", "/api/masnavi-poems", None).await;
    let id = &page["items"][0]["id"];

    let (status, body) = send(&app, "POST", &format!("/api/poems/masnavi/{}/favorite", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "masnavi");
    assert_eq!(body["isFavorite"], true);

    let (_, masnavi) = send(&app, "GET", &format!("/api/masnavi-poems/{}", id), None).await;
    assert_eq!(masnavi["isFavorite"], true);

    let (status, _) = send(&app, "POST", "/api/poems/rubai/1/favorite", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/api/poems/divan/9999/favorite", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_across_kinds() {
    let app = setup_app().await;

    let uri = format!("/api/search?q={}", encode("ишқ"));
    let (status, body) = send(&app, "GET", &uri, None).await;

    assert_eq!(status, StatusCode::OK);
    let hits = body.as_array().unwrap();
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0]["kind"], "divan");
    assert_eq!(hits[0]["ghazalNumber"], 24);
    assert_eq!(hits[1]["ghazalNumber"], 42);
    assert_eq!(hits[2]["kind"], "masnavi");
}

#[tokio::test]
async fn test_search_title_hit_first() {
    let app = setup_app().await;

    // "най" is in the Masnavi title; no ghazal mentions it
    let uri = format!("/api/search?q={}", encode("НАЙ"));
    let (_, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Найнома");

    let uri = format!("/api/search?q={}", encode("ишқ ирфон"));
    let (_, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(ghazal_numbers(&body), vec![24]);
}

#[tokio::test]
async fn test_search_requires_query() {
    let app = setup_app().await;

    for uri in ["/api/search", "/api/search?q=", "/api/search?q=%20%20"] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }
}

// =============================================================================
// Books, collections, verses
// =============================================================================

#[tokio::test]
async fn test_books() {
    let app = setup_app().await;

    let (status, books) = send(&app, "GET", "/api/masnavi-books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(books[0]["daftarNumber"], 1);
    assert_eq!(books[0]["themeColor"], "blue");

    let (status, _) = send(&app, "GET", "/api/masnavi-books/daftar/1", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "GET", "/api/masnavi-books/daftar/6", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/masnavi-books/{}/poems", books[0]["id"]);
    let (_, poems) = send(&app, "GET", &uri, None).await;
    assert_eq!(poems[0]["title"], "Найнома");

    let (status, poems) = send(&app, "GET", "/api/masnavi-books/999/poems", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(poems, json!([]));
}

#[tokio::test]
async fn test_collections() {
    let app = setup_app().await;

    let new = json!({
        "title": "Рубоиёт",
        "description": "Гулчин",
        "poemCount": 60,
        "imageUrl": "/img/rubaiyat.jpg",
        "type": "divan"
    });
    let (status, created) = send(&app, "POST", "/api/collections", Some(new)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["type"], "divan");

    let (_, list) = send(&app, "GET", "/api/collections", None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, one) = send(&app, "GET", &format!("/api/collections/{}", created["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(one, created);

    let (status, _) = send(&app, "GET", "/api/collections/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_daily_and_random_verse() {
    let app = setup_app().await;

    let (status, verse) = send(&app, "GET", "/api/daily-verse", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verse["date"], verse_date(Local::now().date_naive()));

    let (status, _) = send(&app, "GET", "/api/random-verse", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/api/daily-verses",
        Some(json!({ "text": "Байт", "source": "Девони Шамс", "date": "not-a-date" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verse_endpoints_on_empty_store() {
    let app = build_router(AppState::new(Arc::new(MemoryStore::new())));

    let (status, _) = send(&app, "GET", "/api/daily-verse", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", "/api/random-verse", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Inserts
// =============================================================================

#[tokio::test]
async fn test_create_divan_poem() {
    let app = setup_app().await;
    let new = json!({
        "ghazalNumber": 76,
        "title": "Ғазали 76",
        "content": "Эй нури ҳақиқат",
        "baytCount": 10,
        "tags": ["Ҳикмат"]
    });

    let (status, created) = send(&app, "POST", "/api/divan-poems", Some(new.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["ghazalNumber"], 76);
    assert_eq!(created["isFavorite"], false);

    let (status, body) = send(&app, "POST", "/api/divan-poems", Some(new)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (status, _) = send(&app, "POST", "/api/divan-poems", Some(json!({ "title": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_masnavi_poem_needs_book() {
    let app = setup_app().await;
    let new = json!({
        "bookId": 999,
        "title": "Ҳикоят",
        "content": "Матн",
        "baytCount": 4
    });

    let (status, body) = send(&app, "POST", "/api/masnavi-poems", Some(new)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_create_book_duplicate_daftar() {
    let app = setup_app().await;
    let new = json!({
        "daftarNumber": 1,
        "title": "Дафтари аввал",
        "description": "Такрор",
        "baytCount": 1,
        "themeColor": "blue"
    });

    let (status, _) = send(&app, "POST", "/api/masnavi-books", Some(new)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

// =============================================================================
// SQLite backend through the same router
// =============================================================================

#[tokio::test]
async fn test_sqlite_backend_round_trip() {
    let store: Arc<dyn PoetryStore> = Arc::new(SqliteStore::new(init_memory_database().await.unwrap()));
    load_fixture(store.as_ref()).await;
    let app = build_router(AppState::new(store));

    let (_, health) = send(&app, "GET", "/health", None).await;
    assert_eq!(health["backend"], "sqlite");

    let uri = format!("/api/divan-poems?tag={}", encode("ИРФОН"));
    let (_, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(ghazal_numbers(&body["items"]), vec![24]);

    let (_, poem) = send(&app, "GET", "/api/divan-poems/ghazal/24", None).await;
    let (_, toggled) = send(
        &app,
        "POST",
        &format!("/api/poems/divan/{}/favorite", poem["id"]),
        None,
    )
    .await;
    assert_eq!(toggled["kind"], "divan");
    assert_eq!(toggled["isFavorite"], true);

    let uri = format!("/api/search?q={}", encode("ишқ"));
    let (_, hits) = send(&app, "GET", &uri, None).await;
    assert_eq!(hits.as_array().unwrap().len(), 3);
}
