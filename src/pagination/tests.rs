//! Tests for pagination module

use super::*;
use crate::types::JsonObject;
use serde_json::{json, Value};
use test_case::test_case;

fn body(value: Value) -> JsonObject {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn metric_events_page(has_more: bool) -> JsonObject {
    body(json!({
        "ticket_metric_events": [],
        "meta": {"has_more": has_more, "after_cursor": "<after_cursor>", "before_cursor": "<before_cursor>"},
        "links": {
            "prev": "https://subdomain.zendesk.com/api/v2/ticket_metrics.json?page%5Bbefore%5D=<before_cursor>%3D&page%5Bsize%5D=2",
            "next": "https://subdomain.zendesk.com/api/v2/ticket_metrics.json?page%5Bafter%5D=<after_cursor>%3D&page%5Bsize%5D=2"
        }
    }))
}

// ============================================================================
// PageToken Tests
// ============================================================================

#[test]
fn test_page_after_token_query() {
    let token = PageToken::page_after("abc");
    let query = token.to_query();
    assert_eq!(query.len(), 1);
    assert_eq!(query.get("page[after]"), Some(&"abc".to_string()));
}

#[test]
fn test_page_number_token_query() {
    let query = PageToken::PageNumber(3).to_query();
    assert_eq!(query.get("page"), Some(&"3".to_string()));
}

#[test]
fn test_token_sets() {
    assert!(PageToken::param("start_time", "1").sets("start_time"));
    assert!(!PageToken::page_after("abc").sets("start_time"));
    assert!(PageToken::PageNumber(2).sets("page"));
}

// ============================================================================
// Cursor Pagination
// ============================================================================

#[test]
fn test_cursor_after_has_more() {
    assert_eq!(
        Pagination::CursorAfter.next_page_token(&metric_events_page(true)),
        Some(PageToken::page_after("<after_cursor>"))
    );
}

#[test_case(json!({}) ; "missing meta")]
#[test_case(json!({"meta": {}}) ; "missing has_more")]
#[test_case(json!({"meta": {"has_more": false, "after_cursor": "x"}}) ; "has_more false")]
#[test_case(json!({"meta": {"has_more": true}}) ; "has_more without cursor")]
#[test_case(json!({"meta": {"has_more": true, "after_cursor": ""}}) ; "empty cursor")]
#[test_case(json!({"meta": "garbage"}) ; "meta not an object")]
fn test_cursor_after_terminates(value: Value) {
    assert_eq!(Pagination::CursorAfter.next_page_token(&body(value)), None);
}

// ============================================================================
// Legacy next_page
// ============================================================================

#[test]
fn test_next_page_null_is_done() {
    assert_eq!(
        Pagination::NextPage.next_page_token(&body(json!({"next_page": null}))),
        None
    );
    assert_eq!(Pagination::NextPage.next_page_token(&body(json!({}))), None);
}

#[test]
fn test_next_page_number() {
    let page = body(json!({
        "next_page": "https://sandbox.zendesk.com/api/v2/macros.json?page=2&start_time=1622505600"
    }));
    assert_eq!(
        Pagination::NextPage.next_page_token(&page),
        Some(PageToken::PageNumber(2))
    );
}

#[test]
fn test_next_page_cursor_url() {
    let page = body(json!({
        "next_page": "https://sandbox.zendesk.com/api/v2/tags.json?page%5Bafter%5D=xyz&page%5Bsize%5D=100"
    }));
    assert_eq!(
        Pagination::NextPage.next_page_token(&page),
        Some(PageToken::page_after("xyz"))
    );
}

#[test]
fn test_next_page_time_based_url() {
    let page = body(json!({
        "organizations": [{"id": 1}],
        "next_page": "https://sandbox.zendesk.com/api/v2/incremental/organizations.json?start_time=1383685952",
        "end_of_stream": false
    }));
    assert_eq!(
        Pagination::NextPage.next_page_token(&page),
        Some(PageToken::param("start_time", "1383685952"))
    );
}

#[test]
fn test_next_page_end_of_stream_wins_over_url() {
    let page = body(json!({
        "organizations": [],
        "next_page": "https://sandbox.zendesk.com/api/v2/incremental/organizations.json?start_time=1383685952",
        "end_of_stream": true
    }));
    assert_eq!(Pagination::NextPage.next_page_token(&page), None);
}

#[test]
fn test_next_page_url_without_position() {
    let page = body(json!({"next_page": "https://sandbox.zendesk.com/api/v2/macros.json?sort=asc"}));
    assert_eq!(Pagination::NextPage.next_page_token(&page), None);
}

#[test]
fn test_next_page_unparseable_url() {
    let page = body(json!({"next_page": "not a url"}));
    assert_eq!(Pagination::NextPage.next_page_token(&page), None);
}

// ============================================================================
// Before cursor
// ============================================================================

#[test]
fn test_before_cursor() {
    assert_eq!(
        Pagination::BeforeCursor.next_page_token(&body(json!({"before_cursor": "b1"}))),
        Some(PageToken::param("cursor", "b1"))
    );
    assert_eq!(
        Pagination::BeforeCursor.next_page_token(&body(json!({"before_cursor": null}))),
        None
    );
    assert_eq!(Pagination::BeforeCursor.next_page_token(&body(json!({}))), None);
}

// ============================================================================
// Export window
// ============================================================================

#[test]
fn test_end_of_stream_key() {
    assert_eq!(END_OF_STREAM_KEY, "end_of_stream");
}

#[test]
fn test_export_end_of_stream_wins() {
    let page = body(json!({
        "end_of_stream": true,
        "after_cursor": "abc",
        "end_time": 1_700_000_000
    }));
    assert_eq!(Pagination::ExportWindow.next_page_token(&page), None);
}

#[test]
fn test_export_cursor_based() {
    let page = body(json!({"end_of_stream": false, "after_cursor": "abc"}));
    assert_eq!(
        Pagination::ExportWindow.next_page_token(&page),
        Some(PageToken::param("cursor", "abc"))
    );
}

#[test]
fn test_export_meta_envelope() {
    let mut page = metric_events_page(true);
    page.insert("end_of_stream".to_string(), json!(false));
    assert_eq!(
        Pagination::ExportWindow.next_page_token(&page),
        Some(PageToken::page_after("<after_cursor>"))
    );
}

#[test]
fn test_export_time_based() {
    let page = body(json!({"end_of_stream": false, "end_time": 1_700_000_000}));
    assert_eq!(
        Pagination::ExportWindow.next_page_token(&page),
        Some(PageToken::param("start_time", "1700000000"))
    );
}

#[test]
fn test_export_without_markers_is_done() {
    assert_eq!(
        Pagination::ExportWindow.next_page_token(&body(json!({"next_page": null}))),
        None
    );
}

#[test]
fn test_single_never_paginates() {
    assert_eq!(Pagination::Single.next_page_token(&metric_events_page(true)), None);
    assert!(!Pagination::Single.is_export());
    assert!(Pagination::ExportWindow.is_export());
}
