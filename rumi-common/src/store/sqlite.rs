//! SQLite [`PoetryStore`] backend
//!
//! Tags are stored as a JSON array next to a lower-cased copy
//! (`tags_folded`). Tag filters and search compare against the folded
//! columns with `json_each` and `instr`, so the case rules match
//! [`crate::search`] exactly.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;

use super::{verse_date, PoetryStore};
use crate::auth::{generate_salt, hash_password};
use crate::db::models::{
    Collection, CollectionType, DailyVerse, DivanPoem, MasnaviBook, MasnaviPoem, NewCollection,
    NewDailyVerse, NewDivanPoem, NewMasnaviBook, NewMasnaviPoem, NewUser, Poem, User,
};
use crate::pagination::PageRequest;
use crate::search::{fold, fold_tags, SearchQuery, SEARCH_LIMIT_PER_KIND};
use crate::{Error, Result};

const DIVAN_COLUMNS: &str =
    "id, ghazal_number, title, content, bayt_count, tags, is_favorite, image_url, audio_url, explanation";

const MASNAVI_COLUMNS: &str =
    "id, book_id, title, content, bayt_count, tags, is_favorite, image_url, audio_url, explanation";

const BOOK_COLUMNS: &str = "id, daftar_number, title, description, bayt_count, image_url, theme_color";

const COLLECTION_COLUMNS: &str = "id, title, description, poem_count, image_url, type";

const VERSE_COLUMNS: &str = "id, text, source, audio_url, date";

const USER_COLUMNS: &str = "id, username, password_hash, password_salt";

fn encode_tags(tags: &[String]) -> Result<String> {
    serde_json::to_string(tags).map_err(|e| Error::Internal(format!("Failed to encode tags: {}", e)))
}

fn decode_tags(json: &str) -> Result<Vec<String>> {
    serde_json::from_str(json).map_err(|e| Error::Internal(format!("Corrupt tags column: {}", e)))
}

fn divan_from_row(row: &SqliteRow) -> Result<DivanPoem> {
    let tags: String = row.try_get("tags")?;
    Ok(DivanPoem {
        id: row.try_get("id")?,
        ghazal_number: row.try_get("ghazal_number")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        bayt_count: row.try_get("bayt_count")?,
        tags: decode_tags(&tags)?,
        is_favorite: row.try_get("is_favorite")?,
        image_url: row.try_get("image_url")?,
        audio_url: row.try_get("audio_url")?,
        explanation: row.try_get("explanation")?,
    })
}

fn masnavi_from_row(row: &SqliteRow) -> Result<MasnaviPoem> {
    let tags: String = row.try_get("tags")?;
    Ok(MasnaviPoem {
        id: row.try_get("id")?,
        book_id: row.try_get("book_id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        bayt_count: row.try_get("bayt_count")?,
        tags: decode_tags(&tags)?,
        is_favorite: row.try_get("is_favorite")?,
        image_url: row.try_get("image_url")?,
        audio_url: row.try_get("audio_url")?,
        explanation: row.try_get("explanation")?,
    })
}

fn book_from_row(row: &SqliteRow) -> Result<MasnaviBook> {
    Ok(MasnaviBook {
        id: row.try_get("id")?,
        daftar_number: row.try_get("daftar_number")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        bayt_count: row.try_get("bayt_count")?,
        image_url: row.try_get("image_url")?,
        theme_color: row.try_get("theme_color")?,
    })
}

fn collection_from_row(row: &SqliteRow) -> Result<Collection> {
    let collection_type: String = row.try_get("type")?;
    Ok(Collection {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        poem_count: row.try_get("poem_count")?,
        image_url: row.try_get("image_url")?,
        collection_type: collection_type.parse::<CollectionType>()?,
    })
}

fn verse_from_row(row: &SqliteRow) -> Result<DailyVerse> {
    Ok(DailyVerse {
        id: row.try_get("id")?,
        text: row.try_get("text")?,
        source: row.try_get("source")?,
        audio_url: row.try_get("audio_url")?,
        date: row.try_get("date")?,
    })
}

fn user_from_row(row: &SqliteRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        password_salt: row.try_get("password_salt")?,
    })
}

/// Append `WHERE <tag condition>` when a tag filter is given
fn push_tag_filter(qb: &mut QueryBuilder<'_, Sqlite>, table: &str, tag: Option<&str>) {
    if let Some(tag) = tag {
        qb.push(" WHERE EXISTS (SELECT 1 FROM json_each(")
            .push(table)
            .push(".tags_folded) WHERE json_each.value = ")
            .push_bind(fold(tag))
            .push(")");
    }
}

/// Append the search predicate: every term in title, content or tags
fn push_search_filter(qb: &mut QueryBuilder<'_, Sqlite>, table: &str, query: &SearchQuery) {
    qb.push(" WHERE ");
    for (i, term) in query.terms().iter().enumerate() {
        if i > 0 {
            qb.push(" AND ");
        }
        qb.push("(instr(title_folded, ")
            .push_bind(term.clone())
            .push(") > 0 OR instr(content_folded, ")
            .push_bind(term.clone())
            .push(") > 0 OR EXISTS (SELECT 1 FROM json_each(")
            .push(table)
            .push(".tags_folded) WHERE json_each.value = ")
            .push_bind(term.clone())
            .push("))");
    }
}

/// Persistent store over an sqlx pool
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wrap a pool whose schema has already been created
    /// (see [`crate::db::init_database`])
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn book_exists(&self, id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM masnavi_books WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Insert without the book pre-check; the foreign key still applies
    async fn insert_masnavi_poem(&self, poem: NewMasnaviPoem) -> Result<MasnaviPoem> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO masnavi_poems (
                book_id, title, content, bayt_count, tags, is_favorite,
                image_url, audio_url, explanation,
                title_folded, content_folded, tags_folded
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(poem.book_id)
        .bind(&poem.title)
        .bind(&poem.content)
        .bind(poem.bayt_count)
        .bind(encode_tags(&poem.tags)?)
        .bind(poem.is_favorite)
        .bind(&poem.image_url)
        .bind(&poem.audio_url)
        .bind(&poem.explanation)
        .bind(fold(&poem.title))
        .bind(fold(&poem.content))
        .bind(encode_tags(&fold_tags(&poem.tags))?)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::from_insert(e, &format!("Masnavi poem in book {}", poem.book_id)))?;

        debug!(id, book_id = poem.book_id, "Created Masnavi poem");

        Ok(MasnaviPoem {
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
        })
    }
}

#[async_trait]
impl PoetryStore for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn list_divan_poems(&self, page: PageRequest, tag: Option<&str>) -> Result<Vec<DivanPoem>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM divan_poems", DIVAN_COLUMNS));
        push_tag_filter(&mut qb, "divan_poems", tag);
        qb.push(" ORDER BY ghazal_number ASC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(divan_from_row).collect()
    }

    async fn count_divan_poems(&self, tag: Option<&str>) -> Result<i64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM divan_poems");
        push_tag_filter(&mut qb, "divan_poems", tag);
        Ok(qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?)
    }

    async fn divan_poem(&self, id: i64) -> Result<Option<DivanPoem>> {
        let row = sqlx::query(&format!("SELECT {} FROM divan_poems WHERE id = ?", DIVAN_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(divan_from_row).transpose()
    }

    async fn divan_poem_by_ghazal(&self, ghazal_number: i64) -> Result<Option<DivanPoem>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM divan_poems WHERE ghazal_number = ?",
            DIVAN_COLUMNS
        ))
        .bind(ghazal_number)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(divan_from_row).transpose()
    }

    async fn favorite_divan_poems(&self) -> Result<Vec<DivanPoem>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM divan_poems WHERE is_favorite = 1 ORDER BY ghazal_number ASC",
            DIVAN_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(divan_from_row).collect()
    }

    async fn toggle_divan_favorite(&self, id: i64) -> Result<Option<DivanPoem>> {
        // Single statement: the read of the old flag and the write are atomic
        let row = sqlx::query(&format!(
            "UPDATE divan_poems SET is_favorite = NOT is_favorite WHERE id = ? RETURNING {}",
            DIVAN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(divan_from_row).transpose()
    }

    async fn create_divan_poem(&self, poem: NewDivanPoem) -> Result<DivanPoem> {
        poem.validate()?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO divan_poems (
                ghazal_number, title, content, bayt_count, tags, is_favorite,
                image_url, audio_url, explanation,
                title_folded, content_folded, tags_folded
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(poem.ghazal_number)
        .bind(&poem.title)
        .bind(&poem.content)
        .bind(poem.bayt_count)
        .bind(encode_tags(&poem.tags)?)
        .bind(poem.is_favorite)
        .bind(&poem.image_url)
        .bind(&poem.audio_url)
        .bind(&poem.explanation)
        .bind(fold(&poem.title))
        .bind(fold(&poem.content))
        .bind(encode_tags(&fold_tags(&poem.tags))?)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::from_insert(e, &format!("Ghazal {}", poem.ghazal_number)))?;

        debug!(id, ghazal_number = poem.ghazal_number, "Created Divan poem");

        Ok(DivanPoem {
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
        })
    }

    async fn list_masnavi_poems(&self, page: PageRequest, tag: Option<&str>) -> Result<Vec<MasnaviPoem>> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM masnavi_poems", MASNAVI_COLUMNS));
        push_tag_filter(&mut qb, "masnavi_poems", tag);
        qb.push(" ORDER BY id ASC LIMIT ")
            .push_bind(page.limit())
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(masnavi_from_row).collect()
    }

    async fn count_masnavi_poems(&self, tag: Option<&str>) -> Result<i64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM masnavi_poems");
        push_tag_filter(&mut qb, "masnavi_poems", tag);
        Ok(qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?)
    }

    async fn masnavi_poem(&self, id: i64) -> Result<Option<MasnaviPoem>> {
        let row = sqlx::query(&format!("SELECT {} FROM masnavi_poems WHERE id = ?", MASNAVI_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(masnavi_from_row).transpose()
    }

    async fn masnavi_poems_by_book(&self, book_id: i64) -> Result<Vec<MasnaviPoem>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM masnavi_poems WHERE book_id = ? ORDER BY id ASC",
            MASNAVI_COLUMNS
        ))
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(masnavi_from_row).collect()
    }

    async fn favorite_masnavi_poems(&self) -> Result<Vec<MasnaviPoem>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM masnavi_poems WHERE is_favorite = 1 ORDER BY id ASC",
            MASNAVI_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(masnavi_from_row).collect()
    }

    async fn toggle_masnavi_favorite(&self, id: i64) -> Result<Option<MasnaviPoem>> {
        let row = sqlx::query(&format!(
            "UPDATE masnavi_poems SET is_favorite = NOT is_favorite WHERE id = ? RETURNING {}",
            MASNAVI_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(masnavi_from_row).transpose()
    }

    async fn create_masnavi_poem(&self, poem: NewMasnaviPoem) -> Result<MasnaviPoem> {
        poem.validate()?;

        if !self.book_exists(poem.book_id).await? {
            return Err(Error::InvalidInput(format!(
                "Book {} does not exist",
                poem.book_id
            )));
        }

        self.insert_masnavi_poem(poem).await
    }

    async fn list_books(&self) -> Result<Vec<MasnaviBook>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM masnavi_books ORDER BY daftar_number ASC",
            BOOK_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(book_from_row).collect()
    }

    async fn book(&self, id: i64) -> Result<Option<MasnaviBook>> {
        let row = sqlx::query(&format!("SELECT {} FROM masnavi_books WHERE id = ?", BOOK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(book_from_row).transpose()
    }

    async fn book_by_daftar(&self, daftar_number: i64) -> Result<Option<MasnaviBook>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM masnavi_books WHERE daftar_number = ?",
            BOOK_COLUMNS
        ))
        .bind(daftar_number)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(book_from_row).transpose()
    }

    async fn create_book(&self, book: NewMasnaviBook) -> Result<MasnaviBook> {
        book.validate()?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO masnavi_books (daftar_number, title, description, bayt_count, image_url, theme_color)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(book.daftar_number)
        .bind(&book.title)
        .bind(&book.description)
        .bind(book.bayt_count)
        .bind(&book.image_url)
        .bind(&book.theme_color)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::from_insert(e, &format!("Daftar {}", book.daftar_number)))?;

        Ok(MasnaviBook {
            id,
            daftar_number: book.daftar_number,
            title: book.title,
            description: book.description,
            bayt_count: book.bayt_count,
            image_url: book.image_url,
            theme_color: book.theme_color,
        })
    }

    async fn list_collections(&self) -> Result<Vec<Collection>> {
        let rows = sqlx::query(&format!("SELECT {} FROM collections ORDER BY id ASC", COLLECTION_COLUMNS))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(collection_from_row).collect()
    }

    async fn collection(&self, id: i64) -> Result<Option<Collection>> {
        let row = sqlx::query(&format!("SELECT {} FROM collections WHERE id = ?", COLLECTION_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(collection_from_row).transpose()
    }

    async fn create_collection(&self, collection: NewCollection) -> Result<Collection> {
        collection.validate()?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO collections (title, description, poem_count, image_url, type)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&collection.title)
        .bind(&collection.description)
        .bind(collection.poem_count)
        .bind(&collection.image_url)
        .bind(collection.collection_type.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(Collection {
            id,
            title: collection.title,
            description: collection.description,
            poem_count: collection.poem_count,
            image_url: collection.image_url,
            collection_type: collection.collection_type,
        })
    }

    async fn daily_verse(&self, today: NaiveDate) -> Result<Option<DailyVerse>> {
        let today = verse_date(today);
        let row = sqlx::query(&format!(
            "SELECT {} FROM daily_verses WHERE date = ? ORDER BY id ASC LIMIT 1",
            VERSE_COLUMNS
        ))
        .bind(&today)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(verse_from_row(&row)?)),
            None => {
                debug!(%today, "No verse dated today - picking a random one");
                self.random_verse().await
            }
        }
    }

    async fn random_verse(&self) -> Result<Option<DailyVerse>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM daily_verses ORDER BY RANDOM() LIMIT 1",
            VERSE_COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(verse_from_row).transpose()
    }

    async fn create_daily_verse(&self, verse: NewDailyVerse) -> Result<DailyVerse> {
        verse.validate()?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO daily_verses (text, source, audio_url, date) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(&verse.text)
        .bind(&verse.source)
        .bind(&verse.audio_url)
        .bind(&verse.date)
        .fetch_one(&self.pool)
        .await?;

        Ok(DailyVerse {
            id,
            text: verse.text,
            source: verse.source,
            audio_url: verse.audio_url,
            date: verse.date,
        })
    }

    async fn user(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn create_user(&self, user: NewUser) -> Result<User> {
        user.validate()?;

        let salt = generate_salt();
        let password_hash = hash_password(&salt, &user.password);

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (username, password_hash, password_salt) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(&user.username)
        .bind(&password_hash)
        .bind(&salt)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::from_insert(e, &format!("User '{}'", user.username)))?;

        Ok(User {
            id,
            username: user.username,
            password_hash,
            password_salt: salt,
        })
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<Poem>> {
        let limit = SEARCH_LIMIT_PER_KIND as i64;

        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM divan_poems", DIVAN_COLUMNS));
        push_search_filter(&mut qb, "divan_poems", query);
        qb.push(" ORDER BY instr(title_folded, ")
            .push_bind(query.phrase().to_string())
            .push(") > 0 DESC, ghazal_number ASC LIMIT ")
            .push_bind(limit);
        let divan = qb
            .build()
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(|row| divan_from_row(row).map(Poem::Divan))
            .collect::<Result<Vec<_>>>()?;

        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM masnavi_poems", MASNAVI_COLUMNS));
        push_search_filter(&mut qb, "masnavi_poems", query);
        qb.push(" ORDER BY instr(title_folded, ")
            .push_bind(query.phrase().to_string())
            .push(") > 0 DESC, id ASC LIMIT ")
            .push_bind(limit);
        let masnavi = qb
            .build()
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(|row| masnavi_from_row(row).map(Poem::Masnavi))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            query = query.phrase(),
            divan = divan.len(),
            masnavi = masnavi.len(),
            "Search finished"
        );
        Ok(query.merge(divan, masnavi))
    }
}
