//! HTTP API handlers for rumi-api

use rumi_common::pagination::{PageRequest, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;

pub mod books;
pub mod collections;
pub mod divan;
pub mod health;
pub mod masnavi;
pub mod poems;
pub mod search;
pub mod verses;

/// Query parameters of the paginated list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Page number (1-indexed)
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    /// Alias of `page_size`
    pub limit: Option<i64>,
    pub tag: Option<String>,
}

impl ListParams {
    pub fn page_request(&self) -> ApiResult<PageRequest> {
        let page = self.page.unwrap_or(1);
        let page_size = self.page_size.or(self.limit).unwrap_or(DEFAULT_PAGE_SIZE);
        Ok(PageRequest::new(page, page_size)?)
    }

    /// Tag filter; a blank `tag=` means no filter
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// `?tag=` only
#[derive(Debug, Default, Deserialize)]
pub struct TagParams {
    pub tag: Option<String>,
}

impl TagParams {
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// One page of a list endpoint
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
}

impl<T> PageResponse<T> {
    pub fn new(items: Vec<T>, request: PageRequest) -> Self {
        Self {
            items,
            page: request.page(),
            page_size: request.page_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_page_size_alias() {
        let params = ListParams {
            limit: Some(3),
            ..Default::default()
        };
        assert_eq!(params.page_request().unwrap().page_size(), 3);

        let params = ListParams {
            page_size: Some(5),
            limit: Some(3),
            ..Default::default()
        };
        assert_eq!(params.page_request().unwrap().page_size(), 5);
    }

    #[test]
    fn test_defaults() {
        let request = ListParams::default().page_request().unwrap();
        assert_eq!(request.page(), 1);
        assert_eq!(request.page_size(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_blank_tag_is_no_filter() {
        let params = ListParams {
            tag: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(params.tag(), None);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let params = ListParams {
            page_size: Some(0),
            ..Default::default()
        };
        assert!(params.page_request().is_err());
    }
}
