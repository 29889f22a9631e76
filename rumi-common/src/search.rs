//! Search query parsing, matching and ranking
//!
//! Both store backends share these rules:
//! - the query is trimmed and lower-cased; empty queries are rejected, as are
//!   queries over [`MAX_QUERY_BYTES`] or [`MAX_SEARCH_TERMS`] distinct terms
//! - the lower-cased query is split on whitespace into terms
//! - a poem matches when EVERY term is found in its title, its content
//!   (substring) or its tags (whole-tag equality)
//! - all comparisons use Unicode lower-casing ([`fold`]), tags included
//! - per kind, poems whose title contains the whole query come first, then
//!   natural key order; at most [`SEARCH_LIMIT_PER_KIND`] per kind
//! - across kinds, every whole-query title hit precedes every other hit

use crate::db::models::Poem;
use crate::{Error, Result};

/// Maximum hits kept per poem kind
pub const SEARCH_LIMIT_PER_KIND: usize = 20;

/// Maximum distinct terms in one query
pub const MAX_SEARCH_TERMS: usize = 32;

/// Maximum length of the trimmed query in bytes
pub const MAX_QUERY_BYTES: usize = 1024;

/// Case-fold text for comparison
pub fn fold(text: &str) -> String {
    text.to_lowercase()
}

/// Case-fold every tag
pub fn fold_tags(tags: &[String]) -> Vec<String> {
    tags.iter().map(|t| fold(t)).collect()
}

/// Whether `tags` contains `wanted`, ignoring case
pub fn has_tag(tags: &[String], wanted: &str) -> bool {
    let wanted = fold(wanted);
    tags.iter().any(|t| fold(t) == wanted)
}

/// Parsed, non-empty search query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    phrase: String,
    terms: Vec<String>,
}

impl SearchQuery {
    /// Parse a raw query string
    ///
    /// # Examples
    /// ```
    /// use rumi_common::search::SearchQuery;
    ///
    /// let q = SearchQuery::parse("  Ишқ  ВА ишқ ").unwrap();
    /// assert_eq!(q.phrase(), "ишқ  ва ишқ");
    /// assert_eq!(q.terms(), ["ишқ", "ва"]);
    ///
    /// assert!(SearchQuery::parse("   ").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let phrase = fold(raw.trim());
        if phrase.is_empty() {
            return Err(Error::InvalidInput("Search query is required".to_string()));
        }
        if phrase.len() > MAX_QUERY_BYTES {
            return Err(Error::InvalidInput(format!(
                "Search query is longer than {} bytes",
                MAX_QUERY_BYTES
            )));
        }

        let mut terms: Vec<String> = Vec::new();
        for term in phrase.split_whitespace() {
            if !terms.iter().any(|t| t == term) {
                terms.push(term.to_string());
            }
        }
        if terms.len() > MAX_SEARCH_TERMS {
            return Err(Error::InvalidInput(format!(
                "Search query has {} terms (at most {})",
                terms.len(),
                MAX_SEARCH_TERMS
            )));
        }

        Ok(Self { phrase, terms })
    }

    /// Whole trimmed, lower-cased query
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Distinct lower-cased terms in query order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Whether every term is found in the poem's title, content or tags
    pub fn matches(&self, poem: &Poem) -> bool {
        let title = fold(poem.title());
        let content = fold(poem.content());
        let tags = fold_tags(poem.tags());

        self.terms.iter().all(|term| {
            title.contains(term.as_str())
                || content.contains(term.as_str())
                || tags.iter().any(|t| t == term)
        })
    }

    /// Whether the poem's title contains the whole query
    pub fn title_hit(&self, poem: &Poem) -> bool {
        fold(poem.title()).contains(self.phrase.as_str())
    }

    /// Order one kind's matches and cap them at [`SEARCH_LIMIT_PER_KIND`]
    pub fn rank_kind(&self, mut hits: Vec<Poem>) -> Vec<Poem> {
        hits.sort_by_key(|p| (!self.title_hit(p), p.natural_key()));
        hits.truncate(SEARCH_LIMIT_PER_KIND);
        hits
    }

    /// Merge ranked Divan and Masnavi hits into the final result order
    pub fn merge(&self, divan: Vec<Poem>, masnavi: Vec<Poem>) -> Vec<Poem> {
        let mut all = divan;
        all.extend(masnavi);
        // Stable: keeps kind order and natural key order inside each tier
        all.sort_by_key(|p| !self.title_hit(p));
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{DivanPoem, MasnaviPoem};

    fn divan(ghazal_number: i64, title: &str, content: &str, tags: &[&str]) -> Poem {
        Poem::Divan(DivanPoem {
            id: ghazal_number * 10,
            ghazal_number,
            title: title.to_string(),
            content: content.to_string(),
            bayt_count: 1,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            is_favorite: false,
            image_url: None,
            audio_url: None,
            explanation: None,
        })
    }

    fn masnavi(id: i64, title: &str, content: &str) -> Poem {
        Poem::Masnavi(MasnaviPoem {
            id,
            book_id: 1,
            title: title.to_string(),
            content: content.to_string(),
            bayt_count: 1,
            tags: vec![],
            is_favorite: false,
            image_url: None,
            audio_url: None,
            explanation: None,
        })
    }

    #[test]
    fn test_rejects_empty_and_whitespace() {
        assert!(matches!(SearchQuery::parse(""), Err(Error::InvalidInput(_))));
        assert!(matches!(SearchQuery::parse(" \t\n "), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_oversized_queries() {
        let at_limit: Vec<String> = (0..MAX_SEARCH_TERMS).map(|i| format!("t{}", i)).collect();
        assert!(SearchQuery::parse(&at_limit.join(" ")).is_ok());

        let over: Vec<String> = (0..=MAX_SEARCH_TERMS).map(|i| format!("t{}", i)).collect();
        assert!(matches!(SearchQuery::parse(&over.join(" ")), Err(Error::InvalidInput(_))));

        // Repeated terms count once, but the byte cap still applies
        assert!(SearchQuery::parse(&"най ".repeat(100)).is_ok());
        assert!(matches!(
            SearchQuery::parse(&"x".repeat(MAX_QUERY_BYTES + 1)),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_tag_match_ignores_case() {
        let q = SearchQuery::parse("ишқ").unwrap();
        assert!(q.matches(&divan(24, "Ғазали 24", "…", &["Ишқ", "Ирфон"])));
    }

    #[test]
    fn test_tag_match_is_whole_tag() {
        let q = SearchQuery::parse("ирф").unwrap();
        assert!(!q.matches(&divan(24, "Ғазали 24", "…", &["Ирфон"])));
    }

    #[test]
    fn test_all_terms_required() {
        let poem = divan(1, "Бишнав аз най", "аз ҷудоиҳо шикоят мекунад", &[]);
        assert!(SearchQuery::parse("най шикоят").unwrap().matches(&poem));
        assert!(!SearchQuery::parse("най хуршед").unwrap().matches(&poem));
    }

    #[test]
    fn test_terms_may_match_different_fields() {
        let poem = divan(1, "Най", "ҷудоӣ", &["Ирфон"]);
        assert!(SearchQuery::parse("НАЙ ҷудоӣ ирфон").unwrap().matches(&poem));
    }

    #[test]
    fn test_rank_kind_puts_title_hits_first() {
        let q = SearchQuery::parse("нур").unwrap();
        let ranked = q.rank_kind(vec![
            divan(5, "Ғазали 5", "нури ҳақ", &[]),
            divan(9, "Нури ҳақиқат", "…", &[]),
            divan(3, "Ғазали 3", "нур", &[]),
        ]);
        let keys: Vec<i64> = ranked.iter().map(|p| p.natural_key()).collect();
        assert_eq!(keys, vec![9, 3, 5]);
    }

    #[test]
    fn test_rank_kind_caps_results() {
        let q = SearchQuery::parse("x").unwrap();
        let hits = (1..=30).map(|n| divan(n, "x", "x", &[])).collect();
        let ranked = q.rank_kind(hits);
        assert_eq!(ranked.len(), SEARCH_LIMIT_PER_KIND);
        assert_eq!(ranked[0].natural_key(), 1);
    }

    #[test]
    fn test_merge_orders_tiers_across_kinds() {
        let q = SearchQuery::parse("най").unwrap();
        let d = q.rank_kind(vec![divan(2, "Ғазал", "най", &[]), divan(7, "Най", "…", &[])]);
        let m = q.rank_kind(vec![masnavi(1, "Ҳикояти най", "…"), masnavi(4, "Дигар", "най")]);
        let merged = q.merge(d, m);
        let order: Vec<(String, i64)> = merged
            .iter()
            .map(|p| (p.kind().to_string(), p.natural_key()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("divan".to_string(), 7),
                ("masnavi".to_string(), 1),
                ("divan".to_string(), 2),
                ("masnavi".to_string(), 4),
            ]
        );
    }

    #[test]
    fn test_has_tag() {
        let tags = vec!["Ишқ".to_string(), "Ирфон".to_string()];
        assert!(has_tag(&tags, "ирфон"));
        assert!(has_tag(&tags, "Ирфон"));
        assert!(!has_tag(&tags, "Ҳикмат"));
    }
}
