//! Pagination for poem listings
//!
//! Pages are 1-indexed. Unlike a clamping browser view, an out-of-range
//! page is not corrected: a page past the end is simply empty, and a
//! zero page or page size is rejected.

use crate::{Error, Result};

/// Page size used when the caller does not give one
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Largest page size a caller may request
pub const MAX_PAGE_SIZE: i64 = 100;

/// Validated page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number (1-indexed)
    page: i64,
    /// Rows per page
    page_size: i64,
}

impl PageRequest {
    /// Validate a page request
    ///
    /// # Examples
    /// ```
    /// use rumi_common::pagination::PageRequest;
    ///
    /// let p = PageRequest::new(3, 10).unwrap();
    /// assert_eq!(p.offset(), 20);
    /// assert_eq!(p.limit(), 10);
    ///
    /// assert!(PageRequest::new(1, 0).is_err());
    /// assert!(PageRequest::new(0, 10).is_err());
    /// ```
    pub fn new(page: i64, page_size: i64) -> Result<Self> {
        if page < 1 {
            return Err(Error::InvalidInput(format!("page must be >= 1, got {}", page)));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(Error::InvalidInput(format!(
                "pageSize must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, page_size
            )));
        }
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Offset for SQL LIMIT/OFFSET
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// Take this page out of an already ordered sequence
    pub fn slice<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit() as usize)
            .collect()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}
