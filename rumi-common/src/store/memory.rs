//! In-memory [`PoetryStore`] backend
//!
//! Plain ordered maps behind one `tokio::sync::RwLock`. Nothing is
//! persisted and nothing is evicted. Every mutation happens inside a single
//! write-lock section, so a favorite toggle cannot interleave with another
//! write.

use async_trait::async_trait;
use chrono::NaiveDate;
use rand::seq::IteratorRandom;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::{verse_date, PoetryStore};
use crate::auth::{generate_salt, hash_password};
use crate::db::models::{
    Collection, DailyVerse, DivanPoem, MasnaviBook, MasnaviPoem, NewCollection, NewDailyVerse,
    NewDivanPoem, NewMasnaviBook, NewMasnaviPoem, NewUser, Poem, User,
};
use crate::pagination::PageRequest;
use crate::search::{has_tag, SearchQuery};
use crate::{Error, Result};

#[derive(Debug, Default)]
struct Tables {
    divan_poems: BTreeMap<i64, DivanPoem>,
    masnavi_poems: BTreeMap<i64, MasnaviPoem>,
    books: BTreeMap<i64, MasnaviBook>,
    collections: BTreeMap<i64, Collection>,
    verses: BTreeMap<i64, DailyVerse>,
    users: BTreeMap<i64, User>,
}

/// Next surrogate id for a table (rows are never deleted)
fn next_id<V>(table: &BTreeMap<i64, V>) -> i64 {
    table.keys().next_back().map_or(1, |last| last + 1)
}

fn tag_filter(tags: &[String], tag: Option<&str>) -> bool {
    tag.map_or(true, |wanted| has_tag(tags, wanted))
}

fn pick_random(verses: &BTreeMap<i64, DailyVerse>) -> Option<DailyVerse> {
    verses.values().choose(&mut rand::thread_rng()).cloned()
}

impl Tables {
    /// Divan poems in ghazal-number order
    fn divan_in_order(&self) -> Vec<&DivanPoem> {
        let mut poems: Vec<&DivanPoem> = self.divan_poems.values().collect();
        poems.sort_by_key(|p| p.ghazal_number);
        poems
    }
}

/// Non-persistent store
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PoetryStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn list_divan_poems(&self, page: PageRequest, tag: Option<&str>) -> Result<Vec<DivanPoem>> {
        let tables = self.tables.read().await;
        let matching = tables
            .divan_in_order()
            .into_iter()
            .filter(|p| tag_filter(&p.tags, tag))
            .cloned();
        Ok(page.slice(matching))
    }

    async fn count_divan_poems(&self, tag: Option<&str>) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .divan_poems
            .values()
            .filter(|p| tag_filter(&p.tags, tag))
            .count() as i64)
    }

    async fn divan_poem(&self, id: i64) -> Result<Option<DivanPoem>> {
        Ok(self.tables.read().await.divan_poems.get(&id).cloned())
    }

    async fn divan_poem_by_ghazal(&self, ghazal_number: i64) -> Result<Option<DivanPoem>> {
        let tables = self.tables.read().await;
        Ok(tables
            .divan_poems
            .values()
            .find(|p| p.ghazal_number == ghazal_number)
            .cloned())
    }

    async fn favorite_divan_poems(&self) -> Result<Vec<DivanPoem>> {
        let tables = self.tables.read().await;
        Ok(tables
            .divan_in_order()
            .into_iter()
            .filter(|p| p.is_favorite)
            .cloned()
            .collect())
    }

    async fn toggle_divan_favorite(&self, id: i64) -> Result<Option<DivanPoem>> {
        let mut tables = self.tables.write().await;
        Ok(tables.divan_poems.get_mut(&id).map(|poem| {
            poem.is_favorite = !poem.is_favorite;
            poem.clone()
        }))
    }

    async fn create_divan_poem(&self, poem: NewDivanPoem) -> Result<DivanPoem> {
        poem.validate()?;
        let mut tables = self.tables.write().await;

        if tables
            .divan_poems
            .values()
            .any(|p| p.ghazal_number == poem.ghazal_number)
        {
            return Err(Error::Conflict(format!(
                "Ghazal {} already exists",
                poem.ghazal_number
            )));
        }

        let id = next_id(&tables.divan_poems);
        let created = DivanPoem {
            id,
            ghazal_number: poem.ghazal_number,
            title: poem.title,
            content: poem.content,
            bayt_count: poem.bayt_count,
            tags: poem.tags,
            is_favorite: poem.is_favorite,
            image_url: poem.image_url,
            audio_url: poem.audio_url,
            explanation: poem.explanation,
        };
        tables.divan_poems.insert(id, created.clone());
        debug!(id, ghazal_number = created.ghazal_number, "Created Divan poem");
        Ok(created)
    }

    async fn list_masnavi_poems(&self, page: PageRequest, tag: Option<&str>) -> Result<Vec<MasnaviPoem>> {
        let tables = self.tables.read().await;
        let matching = tables
            .masnavi_poems
            .values()
            .filter(|p| tag_filter(&p.tags, tag))
            .cloned();
        Ok(page.slice(matching))
    }

    async fn count_masnavi_poems(&self, tag: Option<&str>) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .masnavi_poems
            .values()
            .filter(|p| tag_filter(&p.tags, tag))
            .count() as i64)
    }

    async fn masnavi_poem(&self, id: i64) -> Result<Option<MasnaviPoem>> {
        Ok(self.tables.read().await.masnavi_poems.get(&id).cloned())
    }

    async fn masnavi_poems_by_book(&self, book_id: i64) -> Result<Vec<MasnaviPoem>> {
        let tables = self.tables.read().await;
        Ok(tables
            .masnavi_poems
            .values()
            .filter(|p| p.book_id == book_id)
            .cloned()
            .collect())
    }

    async fn favorite_masnavi_poems(&self) -> Result<Vec<MasnaviPoem>> {
        let tables = self.tables.read().await;
        Ok(tables
            .masnavi_poems
            .values()
            .filter(|p| p.is_favorite)
            .cloned()
            .collect())
    }

    async fn toggle_masnavi_favorite(&self, id: i64) -> Result<Option<MasnaviPoem>> {
        let mut tables = self.tables.write().await;
        Ok(tables.masnavi_poems.get_mut(&id).map(|poem| {
            poem.is_favorite = !poem.is_favorite;
            poem.clone()
        }))
    }

    async fn create_masnavi_poem(&self, poem: NewMasnaviPoem) -> Result<MasnaviPoem> {
        poem.validate()?;
        let mut tables = self.tables.write().await;

        if !tables.books.contains_key(&poem.book_id) {
            return Err(Error::InvalidInput(format!(
                "Book {} does not exist",
                poem.book_id
            )));
        }

        let id = next_id(&tables.masnavi_poems);
        let created = MasnaviPoem {
            id,
            book_id: poem.book_id,
            title: poem.title,
            content: poem.content,
            bayt_count: poem.bayt_count,
            tags: poem.tags,
            is_favorite: poem.is_favorite,
            image_url: poem.image_url,
            audio_url: poem.audio_url,
            explanation: poem.explanation,
        };
        tables.masnavi_poems.insert(id, created.clone());
        debug!(id, book_id = created.book_id, "Created Masnavi poem");
        Ok(created)
    }

    async fn list_books(&self) -> Result<Vec<MasnaviBook>> {
        let tables = self.tables.read().await;
        let mut books: Vec<MasnaviBook> = tables.books.values().cloned().collect();
        books.sort_by_key(|b| b.daftar_number);
        Ok(books)
    }

    async fn book(&self, id: i64) -> Result<Option<MasnaviBook>> {
        Ok(self.tables.read().await.books.get(&id).cloned())
    }

    async fn book_by_daftar(&self, daftar_number: i64) -> Result<Option<MasnaviBook>> {
        let tables = self.tables.read().await;
        Ok(tables
            .books
            .values()
            .find(|b| b.daftar_number == daftar_number)
            .cloned())
    }

    async fn create_book(&self, book: NewMasnaviBook) -> Result<MasnaviBook> {
        book.validate()?;
        let mut tables = self.tables.write().await;

        if tables
            .books
            .values()
            .any(|b| b.daftar_number == book.daftar_number)
        {
            return Err(Error::Conflict(format!(
                "Daftar {} already exists",
                book.daftar_number
            )));
        }

        let id = next_id(&tables.books);
        let created = MasnaviBook {
            id,
            daftar_number: book.daftar_number,
            title: book.title,
            description: book.description,
            bayt_count: book.bayt_count,
            image_url: book.image_url,
            theme_color: book.theme_color,
        };
        tables.books.insert(id, created.clone());
        Ok(created)
    }

    async fn list_collections(&self) -> Result<Vec<Collection>> {
        Ok(self.tables.read().await.collections.values().cloned().collect())
    }

    async fn collection(&self, id: i64) -> Result<Option<Collection>> {
        Ok(self.tables.read().await.collections.get(&id).cloned())
    }

    async fn create_collection(&self, collection: NewCollection) -> Result<Collection> {
        collection.validate()?;
        let mut tables = self.tables.write().await;

        let id = next_id(&tables.collections);
        let created = Collection {
            id,
            title: collection.title,
            description: collection.description,
            poem_count: collection.poem_count,
            image_url: collection.image_url,
            collection_type: collection.collection_type,
        };
        tables.collections.insert(id, created.clone());
        Ok(created)
    }

    async fn daily_verse(&self, today: NaiveDate) -> Result<Option<DailyVerse>> {
        let today = verse_date(today);
        let tables = self.tables.read().await;

        if let Some(verse) = tables.verses.values().find(|v| v.date == today) {
            return Ok(Some(verse.clone()));
        }

        debug!(%today, "No verse dated today - picking a random one");
        Ok(pick_random(&tables.verses))
    }

    async fn random_verse(&self) -> Result<Option<DailyVerse>> {
        let tables = self.tables.read().await;
        Ok(pick_random(&tables.verses))
    }

    async fn create_daily_verse(&self, verse: NewDailyVerse) -> Result<DailyVerse> {
        verse.validate()?;
        let mut tables = self.tables.write().await;

        let id = next_id(&tables.verses);
        let created = DailyVerse {
            id,
            text: verse.text,
            source: verse.source,
            audio_url: verse.audio_url,
            date: verse.date,
        };
        tables.verses.insert(id, created.clone());
        Ok(created)
    }

    async fn user(&self, id: i64) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        user.validate()?;
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.username == user.username) {
            return Err(Error::Conflict(format!(
                "User '{}' already exists",
                user.username
            )));
        }

        let salt = generate_salt();
        let id = next_id(&tables.users);
        let created = User {
            id,
            username: user.username,
            password_hash: hash_password(&salt, &user.password),
            password_salt: salt,
        };
        tables.users.insert(id, created.clone());
        Ok(created)
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Poem>> {
        let tables = self.tables.read().await;

        let divan: Vec<Poem> = tables
            .divan_poems
            .values()
            .map(|p| Poem::Divan(p.clone()))
            .filter(|p| query.matches(p))
            .collect();
        let masnavi: Vec<Poem> = tables
            .masnavi_poems
            .values()
            .map(|p| Poem::Masnavi(p.clone()))
            .filter(|p| query.matches(p))
            .collect();

        let divan = query.rank_kind(divan);
        let masnavi = query.rank_kind(masnavi);
        debug!(
            query = query.phrase(),
            divan = divan.len(),
            masnavi = masnavi.len(),
            "Search finished"
        );
        Ok(query.merge(divan, masnavi))
    }
}
