//! Catalogue repository
//!
//! [`PoetryStore`] is the single query interface used by the HTTP adapter.
//! Two interchangeable backends implement it:
//! - [`SqliteStore`]: persistent, backed by an sqlx connection pool
//! - [`MemoryStore`]: non-persistent maps behind a lock, for tests and
//!   quick local runs
//!
//! The backend is picked once at startup ([`open_store`]) and shared as an
//! `Arc<dyn PoetryStore>`.
//!
//! Lookups return `Ok(None)` when nothing matches. `Err` is reserved for
//! invalid input, duplicate keys and store failures.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;

use crate::config::{StorageBackend, StorageConfig};
use crate::db::models::{
    Collection, DailyVerse, DivanPoem, MasnaviBook, MasnaviPoem, NewCollection, NewDailyVerse,
    NewDivanPoem, NewMasnaviBook, NewMasnaviPoem, NewUser, Poem, PoemKind, User,
    VERSE_DATE_FORMAT,
};
use crate::pagination::PageRequest;
use crate::search::SearchQuery;
use crate::Result;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Format a date the way [`DailyVerse::date`] stores it
pub fn verse_date(date: NaiveDate) -> String {
    date.format(VERSE_DATE_FORMAT).to_string()
}

#[async_trait]
pub trait PoetryStore: Send + Sync {
    /// Short backend name for logs and the health endpoint
    fn backend_name(&self) -> &'static str;

    // ------------------------------------------------------------------
    // Divan
    // ------------------------------------------------------------------

    /// One page of Divan poems in ghazal-number order, optionally filtered by tag
    async fn list_divan_poems(&self, page: PageRequest, tag: Option<&str>) -> Result<Vec<DivanPoem>>;

    async fn count_divan_poems(&self, tag: Option<&str>) -> Result<i64>;

    async fn divan_poem(&self, id: i64) -> Result<Option<DivanPoem>>;

    async fn divan_poem_by_ghazal(&self, ghazal_number: i64) -> Result<Option<DivanPoem>>;

    async fn favorite_divan_poems(&self) -> Result<Vec<DivanPoem>>;

    /// Flip the favorite flag; `None` if the id does not exist
    async fn toggle_divan_favorite(&self, id: i64) -> Result<Option<DivanPoem>>;

    async fn create_divan_poem(&self, poem: NewDivanPoem) -> Result<DivanPoem>;

    // ------------------------------------------------------------------
    // Masnavi
    // ------------------------------------------------------------------

    /// One page of Masnavi poems in id order, optionally filtered by tag
    async fn list_masnavi_poems(&self, page: PageRequest, tag: Option<&str>) -> Result<Vec<MasnaviPoem>>;

    async fn count_masnavi_poems(&self, tag: Option<&str>) -> Result<i64>;

    async fn masnavi_poem(&self, id: i64) -> Result<Option<MasnaviPoem>>;

    /// All poems of one book in id order (empty for an unknown book)
    async fn masnavi_poems_by_book(&self, book_id: i64) -> Result<Vec<MasnaviPoem>>;

    async fn favorite_masnavi_poems(&self) -> Result<Vec<MasnaviPoem>>;

    async fn toggle_masnavi_favorite(&self, id: i64) -> Result<Option<MasnaviPoem>>;

    /// Insert a poem; the referenced book must exist
    async fn create_masnavi_poem(&self, poem: NewMasnaviPoem) -> Result<MasnaviPoem>;

    async fn list_books(&self) -> Result<Vec<MasnaviBook>>;

    async fn book(&self, id: i64) -> Result<Option<MasnaviBook>>;

    async fn book_by_daftar(&self, daftar_number: i64) -> Result<Option<MasnaviBook>>;

    async fn create_book(&self, book: NewMasnaviBook) -> Result<MasnaviBook>;

    // ------------------------------------------------------------------
    // Collections, verses, users
    // ------------------------------------------------------------------

    async fn list_collections(&self) -> Result<Vec<Collection>>;

    async fn collection(&self, id: i64) -> Result<Option<Collection>>;

    async fn create_collection(&self, collection: NewCollection) -> Result<Collection>;

    /// Verse dated `today`, or a random verse when none is
    async fn daily_verse(&self, today: NaiveDate) -> Result<Option<DailyVerse>>;

    /// Uniformly random verse; `None` only when there are no verses
    async fn random_verse(&self) -> Result<Option<DailyVerse>>;

    async fn create_daily_verse(&self, verse: NewDailyVerse) -> Result<DailyVerse>;

    async fn user(&self, id: i64) -> Result<Option<User>>;

    async fn user_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn create_user(&self, user: NewUser) -> Result<User>;

    // ------------------------------------------------------------------
    // Cross-kind
    // ------------------------------------------------------------------

    /// Search both poem kinds (see [`crate::search`] for the rules)
    async fn search(&self, query: &SearchQuery) -> Result<Vec<Poem>>;

    /// One page of poems of either kind
    async fn list_poems(&self, kind: PoemKind, page: PageRequest, tag: Option<&str>) -> Result<Vec<Poem>> {
        Ok(match kind {
            PoemKind::Divan => self
                .list_divan_poems(page, tag)
                .await?
                .into_iter()
                .map(Poem::from)
                .collect(),
            PoemKind::Masnavi => self
                .list_masnavi_poems(page, tag)
                .await?
                .into_iter()
                .map(Poem::from)
                .collect(),
        })
    }

    async fn count_poems(&self, kind: PoemKind, tag: Option<&str>) -> Result<i64> {
        match kind {
            PoemKind::Divan => self.count_divan_poems(tag).await,
            PoemKind::Masnavi => self.count_masnavi_poems(tag).await,
        }
    }

    async fn poem(&self, kind: PoemKind, id: i64) -> Result<Option<Poem>> {
        Ok(match kind {
            PoemKind::Divan => self.divan_poem(id).await?.map(Poem::from),
            PoemKind::Masnavi => self.masnavi_poem(id).await?.map(Poem::from),
        })
    }

    async fn toggle_favorite(&self, kind: PoemKind, id: i64) -> Result<Option<Poem>> {
        Ok(match kind {
            PoemKind::Divan => self.toggle_divan_favorite(id).await?.map(Poem::from),
            PoemKind::Masnavi => self.toggle_masnavi_favorite(id).await?.map(Poem::from),
        })
    }

    /// True when no poems, books, collections or verses are stored
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.count_divan_poems(None).await? == 0
            && self.count_masnavi_poems(None).await? == 0
            && self.list_books().await?.is_empty()
            && self.list_collections().await?.is_empty()
            && self.random_verse().await?.is_none())
    }
}

/// Open the configured backend
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn PoetryStore>> {
    match config.backend {
        StorageBackend::Sqlite => {
            let pool = crate::db::init_database(&config.database_path).await?;
            info!("Using SQLite store at {}", config.database_path.display());
            Ok(Arc::new(SqliteStore::new(pool)))
        }
        StorageBackend::Memory => {
            info!("Using in-memory store (contents are lost on exit)");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
