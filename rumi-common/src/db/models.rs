//! Catalogue entity models
//!
//! Entities serialise with camelCase field names, which is the JSON
//! contract the browser UI consumes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Date format of [`DailyVerse::date`]
pub const VERSE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Ghazal from the Divan-e Shams (ordered by `ghazal_number`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DivanPoem {
    pub id: i64,
    pub ghazal_number: i64,
    pub title: String,
    /// Verse lines separated by `\n`
    pub content: String,
    pub bayt_count: i64,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    pub explanation: Option<String>,
}

/// Poem from one of the Masnavi books (ordered by `id`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasnaviPoem {
    pub id: i64,
    pub book_id: i64,
    pub title: String,
    pub content: String,
    pub bayt_count: i64,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    pub explanation: Option<String>,
}

/// One of the six Masnavi books (daftars)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasnaviBook {
    pub id: i64,
    pub daftar_number: i64,
    pub title: String,
    pub description: String,
    pub bayt_count: i64,
    pub image_url: Option<String>,
    pub theme_color: String,
}

/// Curated set of poems
///
/// `poem_count` is declared metadata. Collections are not joined to poem rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub poem_count: i64,
    pub image_url: String,
    #[serde(rename = "type")]
    pub collection_type: CollectionType,
}

/// Which poem kind a collection curates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionType {
    Divan,
    Masnavi,
    Mixed,
}

impl CollectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionType::Divan => "divan",
            CollectionType::Masnavi => "masnavi",
            CollectionType::Mixed => "mixed",
        }
    }
}

impl FromStr for CollectionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "divan" => Ok(CollectionType::Divan),
            "masnavi" => Ok(CollectionType::Masnavi),
            "mixed" => Ok(CollectionType::Mixed),
            other => Err(Error::InvalidInput(format!("Unknown collection type: {}", other))),
        }
    }
}

/// Short excerpt shown as the verse of the day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyVerse {
    pub id: i64,
    pub text: String,
    pub source: String,
    pub audio_url: Option<String>,
    /// `YYYY-MM-DD`
    pub date: String,
}

/// Stored account. Never serialised to API clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub password_salt: String,
}

impl User {
    /// Check a plaintext password against the stored salted hash
    pub fn verify_password(&self, password: &str) -> bool {
        crate::auth::hash_password(&self.password_salt, password) == self.password_hash
    }
}

/// Discriminator between the two poem shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoemKind {
    Divan,
    Masnavi,
}

impl PoemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoemKind::Divan => "divan",
            PoemKind::Masnavi => "masnavi",
        }
    }
}

impl fmt::Display for PoemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PoemKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "divan" => Ok(PoemKind::Divan),
            "masnavi" => Ok(PoemKind::Masnavi),
            other => Err(Error::InvalidInput(format!(
                "Unknown poem kind '{}' (expected 'divan' or 'masnavi')",
                other
            ))),
        }
    }
}

/// A poem of either kind, serialised as `{"kind": "...", ...fields}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Poem {
    Divan(DivanPoem),
    Masnavi(MasnaviPoem),
}

impl Poem {
    pub fn kind(&self) -> PoemKind {
        match self {
            Poem::Divan(_) => PoemKind::Divan,
            Poem::Masnavi(_) => PoemKind::Masnavi,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Poem::Divan(p) => p.id,
            Poem::Masnavi(p) => p.id,
        }
    }

    /// Ordering key within the poem's kind
    pub fn natural_key(&self) -> i64 {
        match self {
            Poem::Divan(p) => p.ghazal_number,
            Poem::Masnavi(p) => p.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Poem::Divan(p) => &p.title,
            Poem::Masnavi(p) => &p.title,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Poem::Divan(p) => &p.content,
            Poem::Masnavi(p) => &p.content,
        }
    }

    pub fn tags(&self) -> &[String] {
        match self {
            Poem::Divan(p) => &p.tags,
            Poem::Masnavi(p) => &p.tags,
        }
    }

    pub fn is_favorite(&self) -> bool {
        match self {
            Poem::Divan(p) => p.is_favorite,
            Poem::Masnavi(p) => p.is_favorite,
        }
    }
}

impl From<DivanPoem> for Poem {
    fn from(poem: DivanPoem) -> Self {
        Poem::Divan(poem)
    }
}

impl From<MasnaviPoem> for Poem {
    fn from(poem: MasnaviPoem) -> Self {
        Poem::Masnavi(poem)
    }
}

// ============================================================================
// Insert payloads
// ============================================================================

fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn require_non_negative(field: &str, value: i64) -> Result<()> {
    if value < 0 {
        return Err(Error::InvalidInput(format!("{} must be >= 0, got {}", field, value)));
    }
    Ok(())
}

fn require_positive(field: &str, value: i64) -> Result<()> {
    if value < 1 {
        return Err(Error::InvalidInput(format!("{} must be >= 1, got {}", field, value)));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDivanPoem {
    pub ghazal_number: i64,
    pub title: String,
    pub content: String,
    pub bayt_count: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    pub explanation: Option<String>,
}

impl NewDivanPoem {
    pub fn validate(&self) -> Result<()> {
        require_positive("ghazalNumber", self.ghazal_number)?;
        require_text("title", &self.title)?;
        require_text("content", &self.content)?;
        require_non_negative("baytCount", self.bayt_count)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMasnaviPoem {
    pub book_id: i64,
    pub title: String,
    pub content: String,
    pub bayt_count: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    pub explanation: Option<String>,
}

impl NewMasnaviPoem {
    pub fn validate(&self) -> Result<()> {
        require_positive("bookId", self.book_id)?;
        require_text("title", &self.title)?;
        require_text("content", &self.content)?;
        require_non_negative("baytCount", self.bayt_count)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMasnaviBook {
    pub daftar_number: i64,
    pub title: String,
    pub description: String,
    pub bayt_count: i64,
    pub image_url: Option<String>,
    pub theme_color: String,
}

impl NewMasnaviBook {
    pub fn validate(&self) -> Result<()> {
        require_positive("daftarNumber", self.daftar_number)?;
        require_text("title", &self.title)?;
        require_non_negative("baytCount", self.bayt_count)?;
        require_text("themeColor", &self.theme_color)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCollection {
    pub title: String,
    pub description: String,
    pub poem_count: i64,
    pub image_url: String,
    #[serde(rename = "type")]
    pub collection_type: CollectionType,
}

impl NewCollection {
    pub fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        require_non_negative("poemCount", self.poem_count)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDailyVerse {
    pub text: String,
    pub source: String,
    pub audio_url: Option<String>,
    pub date: String,
}

impl NewDailyVerse {
    pub fn validate(&self) -> Result<()> {
        require_text("text", &self.text)?;
        require_text("source", &self.source)?;
        // Only the zero-padded form; `daily_verse` compares dates as strings
        let canonical = NaiveDate::parse_from_str(&self.date, VERSE_DATE_FORMAT)
            .ok()
            .map(|d| d.format(VERSE_DATE_FORMAT).to_string());
        if canonical.as_deref() != Some(self.date.as_str()) {
            return Err(Error::InvalidInput(format!(
                "date must be YYYY-MM-DD, got '{}'",
                self.date
            )));
        }
        Ok(())
    }
}

/// New account with a plaintext password (hashed by the store on insert)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<()> {
        require_text("username", &self.username)?;
        require_text("password", &self.password)
    }
}
