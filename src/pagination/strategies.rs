//! Pagination strategy implementations
//!
//! Each function reads one response envelope and produces the next token.
//! All of them are total: a missing or oddly typed field ends pagination
//! instead of failing.

use super::types::PageToken;
use crate::types::{JsonObject, JsonValue};
use url::Url;

/// Body flag marking the last page of an incremental export
pub const END_OF_STREAM_KEY: &str = "end_of_stream";

// ============================================================================
// Legacy next_page URL
// ============================================================================

/// Token from a `next_page` URL.
///
/// `?page=3` becomes a page number and `?page[after]=X` a cursor token.
/// Time-based incremental endpoints address the next page by
/// `?start_time=T` alone, which becomes a `start_time` token. A body flagged
/// `end_of_stream: true` has no next page whatever the URL says.
pub fn next_page_url_token(body: &JsonObject) -> Option<PageToken> {
    if is_end_of_stream(body) {
        return None;
    }

    let next_page = body.get("next_page")?.as_str()?;
    let url = Url::parse(next_page).ok()?;

    let mut page_number = None;
    let mut start_time = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "page[after]" if !value.is_empty() => {
                return Some(PageToken::page_after(value.into_owned()));
            }
            "page" => page_number = value.parse::<u64>().ok(),
            "start_time" if !value.is_empty() => start_time = Some(value.into_owned()),
            _ => {}
        }
    }

    page_number
        .map(PageToken::PageNumber)
        .or_else(|| start_time.map(|t| PageToken::param("start_time", t)))
}

fn is_end_of_stream(body: &JsonObject) -> bool {
    body.get(END_OF_STREAM_KEY)
        .and_then(JsonValue::as_bool)
        .unwrap_or(false)
}

// ============================================================================
// Cursor (page[after]) Pagination
// ============================================================================

/// Token from a `meta.has_more` / `meta.after_cursor` envelope.
///
/// A missing `meta` is treated the same as `has_more: false`.
pub fn cursor_after_token(body: &JsonObject) -> Option<PageToken> {
    let meta = body.get("meta")?.as_object()?;
    if !meta.get("has_more").and_then(JsonValue::as_bool)? {
        return None;
    }

    let cursor = meta.get("after_cursor")?.as_str()?;
    if cursor.is_empty() {
        return None;
    }
    Some(PageToken::page_after(cursor))
}

// ============================================================================
// Before-cursor Pagination
// ============================================================================

/// Token from a top-level `before_cursor` (ticket audits walk backwards)
pub fn before_cursor_token(body: &JsonObject) -> Option<PageToken> {
    let cursor = body.get("before_cursor")?.as_str()?;
    if cursor.is_empty() {
        return None;
    }
    Some(PageToken::param("cursor", cursor))
}

// ============================================================================
// Incremental Export Pagination
// ============================================================================

/// Token for incremental export endpoints.
///
/// `end_of_stream: true` ends the stream for good. Otherwise the next page is
/// addressed by, in order: a top-level `after_cursor` (cursor-based exports),
/// a `meta.after_cursor` envelope, or the window's `end_time`.
pub fn export_window_token(body: &JsonObject) -> Option<PageToken> {
    if is_end_of_stream(body) {
        return None;
    }

    if let Some(cursor) = body.get("after_cursor").and_then(JsonValue::as_str) {
        if !cursor.is_empty() {
            return Some(PageToken::param("cursor", cursor));
        }
    }

    if let Some(token) = cursor_after_token(body) {
        return Some(token);
    }

    body.get("end_time")
        .and_then(JsonValue::as_i64)
        .map(|end_time| PageToken::param("start_time", end_time.to_string()))
}
