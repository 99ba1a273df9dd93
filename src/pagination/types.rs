//! Pagination types
//!
//! Defines the page token carried between requests and the set of
//! pagination protocols a stream can use.

use super::strategies;
use crate::types::{JsonObject, QueryParams};
use std::collections::BTreeMap;

/// Opaque value carried from one response to the next request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageToken {
    /// Legacy page number (sent as `page=N`)
    PageNumber(u64),
    /// Query parameters to merge into the next request
    Params(BTreeMap<String, String>),
}

impl PageToken {
    /// Token for `page[after]` cursor pagination
    pub fn page_after(cursor: impl Into<String>) -> Self {
        Self::param("page[after]", cursor)
    }

    /// Token carrying a single query parameter
    pub fn param(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut params = BTreeMap::new();
        params.insert(key.into(), value.into());
        Self::Params(params)
    }

    /// Whether this token sets query parameter `key`
    pub fn sets(&self, key: &str) -> bool {
        match self {
            Self::PageNumber(_) => key == "page",
            Self::Params(params) => params.contains_key(key),
        }
    }

    /// Query parameters contributed by this token
    pub fn to_query(&self) -> QueryParams {
        match self {
            Self::PageNumber(page) => {
                let mut query = QueryParams::new();
                query.insert("page".to_string(), page.to_string());
                query
            }
            Self::Params(params) => params
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}

/// Pagination protocol of a stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pagination {
    /// A single request, never paginated
    #[default]
    Single,
    /// `next_page` URL in the body (page number, `page[after]` or `start_time`)
    NextPage,
    /// `meta.has_more` + `meta.after_cursor`, sent as `page[after]`
    CursorAfter,
    /// `before_cursor` in the body, sent as `cursor` (newest first)
    BeforeCursor,
    /// Incremental export with `end_of_stream` and time windows
    ExportWindow,
}

impl Pagination {
    /// Compute the token for the next page from a parsed response body
    pub fn next_page_token(&self, body: &JsonObject) -> Option<PageToken> {
        match self {
            Self::Single => None,
            Self::NextPage => strategies::next_page_url_token(body),
            Self::CursorAfter => strategies::cursor_after_token(body),
            Self::BeforeCursor => strategies::before_cursor_token(body),
            Self::ExportWindow => strategies::export_window_token(body),
        }
    }

    /// Whether this is an incremental export endpoint
    pub fn is_export(&self) -> bool {
        matches!(self, Self::ExportWindow)
    }
}
