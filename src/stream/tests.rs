//! Tests for the stream module

use super::*;
use crate::error::Error;
use crate::http::HttpResponse;
use crate::pagination::{PageToken, Pagination};
use crate::state::StreamState;
use crate::types::{QueryParams, Record};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use test_case::test_case;

const START_DATE: &str = "2021-06-01T00:00:00Z";
const START_TIME: &str = "1622505600";

fn args() -> Arc<StreamArgs> {
    Arc::new(StreamArgs::new("sandbox", START_DATE))
}

fn stream(definition: StreamDefinition) -> ZendeskStream {
    ZendeskStream::new(definition, args())
}

fn record(value: serde_json::Value) -> Record {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

fn params(pairs: &[(&str, &str)]) -> QueryParams {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn names(records: Records) -> Vec<String> {
    records
        .map(|r| r.get("name").and_then(|v| v.as_str()).unwrap_or_default().to_string())
        .collect()
}

// ============================================================================
// URLs and paths
// ============================================================================

#[test]
fn test_url_base() {
    let s = stream(StreamDefinition::new("tags", "tags"));
    assert_eq!(s.url_base(), "https://sandbox.zendesk.com/api/v2/");
    assert_eq!(s.url(None).unwrap(), "https://sandbox.zendesk.com/api/v2/tags");
}

#[test]
fn test_url_base_override() {
    let args = Arc::new(StreamArgs::new("sandbox", START_DATE).with_api_base_url("http://127.0.0.1:9999/api/v2"));
    let s = ZendeskStream::new(StreamDefinition::new("tags", "tags"), args);
    assert_eq!(s.url_base(), "http://127.0.0.1:9999/api/v2/");
}

#[test]
fn test_path_with_slice() {
    let s = stream(
        StreamDefinition::new("post_comments", "community/posts/{post_id}/comments")
            .list_name("comments")
            .parent("posts", "post_id", "id"),
    );

    let mut slice = StreamSlice::new();
    slice.insert("post_id".to_string(), "42".to_string());
    assert_eq!(s.path(Some(&slice)).unwrap(), "community/posts/42/comments");

    let err = s.path(None).unwrap_err();
    assert!(matches!(err, Error::MissingSliceValue { ref key, .. } if key == "post_id"));
}

#[test]
fn test_path_slice_value_is_not_rescanned() {
    let s = stream(
        StreamDefinition::new("article_votes", "help_center/articles/{article_id}/votes")
            .list_name("votes")
            .parent("articles", "article_id", "id"),
    );

    let mut slice = StreamSlice::new();
    slice.insert("article_id".to_string(), "{article_id}".to_string());
    assert_eq!(
        s.path(Some(&slice)).unwrap(),
        "help_center/articles/{article_id}/votes"
    );
}

#[test]
fn test_path_with_two_placeholders() {
    let s = stream(StreamDefinition::new("nested", "a/{first}/b/{second}"));

    let mut slice = StreamSlice::new();
    slice.insert("first".to_string(), "1".to_string());
    slice.insert("second".to_string(), "2".to_string());
    assert_eq!(s.path(Some(&slice)).unwrap(), "a/1/b/2");
}

#[test]
fn test_title() {
    assert_eq!(StreamDefinition::new("ticket_forms", "ticket_forms").title(), "TicketForms");
    assert_eq!(StreamDefinition::new("tags", "tags").title(), "Tags");
}

// ============================================================================
// Request parameters
// ============================================================================

#[test_case(
    StreamDefinition::new("macros", "macros").incremental("updated_at").pagination(Pagination::NextPage),
    &[("start_time", START_TIME)];
    "next page incremental"
)]
#[test_case(
    StreamDefinition::new("group_memberships", "group_memberships")
        .incremental("updated_at")
        .pagination(Pagination::CursorAfter)
        .page_size(100)
        .param("sort_by", "asc"),
    &[("page[size]", "100"), ("sort_by", "asc"), ("start_time", START_TIME)];
    "cursor pagination with sort"
)]
#[test_case(
    StreamDefinition::new("ticket_metric_events", "incremental/ticket_metric_events")
        .incremental("time")
        .pagination(Pagination::CursorAfter)
        .page_size(100),
    &[("page[size]", "100"), ("start_time", START_TIME)];
    "cursor pagination"
)]
#[test_case(
    StreamDefinition::new("ticket_audits", "ticket_audits")
        .list_name("audits")
        .incremental("created_at")
        .without_start_time()
        .pagination(Pagination::BeforeCursor)
        .param("sort_by", "created_at")
        .param("sort_order", "desc")
        .param("limit", "200"),
    &[("sort_by", "created_at"), ("sort_order", "desc"), ("limit", "200")];
    "audits without start time"
)]
#[test_case(
    StreamDefinition::new("tags", "tags").pagination(Pagination::CursorAfter).page_size(100),
    &[("page[size]", "100")];
    "full refresh paginated"
)]
#[test_case(
    StreamDefinition::new("sla_policies", "slas/policies.json"),
    &[];
    "full refresh single page"
)]
fn test_request_params(definition: StreamDefinition, expected: &[(&str, &str)]) {
    let s = stream(definition);
    let actual = s.request_params(&StreamState::new(), None).unwrap();
    assert_eq!(actual, params(expected));
}

#[test]
fn test_request_params_with_page_token() {
    let s = stream(
        StreamDefinition::new("ticket_metric_events", "incremental/ticket_metric_events")
            .incremental("time")
            .pagination(Pagination::CursorAfter)
            .page_size(100),
    );
    let token = PageToken::page_after("xyz");
    let actual = s.request_params(&StreamState::new(), Some(&token)).unwrap();
    assert_eq!(
        actual,
        params(&[("page[after]", "xyz"), ("page[size]", "100"), ("start_time", START_TIME)])
    );
}

#[test]
fn test_export_request_params() {
    let s = stream(
        StreamDefinition::new("ticket_comments", "incremental/ticket_events.json")
            .list_name("ticket_events")
            .incremental("created_at")
            .pagination(Pagination::ExportWindow)
            .param("include", "comment_events"),
    );

    let first = s.request_params(&StreamState::new(), None).unwrap();
    assert_eq!(first, params(&[("include", "comment_events"), ("start_time", START_TIME)]));

    // Later windows are addressed by the token alone
    let token = PageToken::param("start_time", "1700000000");
    let next = s.request_params(&StreamState::new(), Some(&token)).unwrap();
    assert_eq!(next, params(&[("include", "comment_events"), ("start_time", "1700000000")]));
}

#[test]
fn test_time_based_next_page_params() {
    let s = stream(
        StreamDefinition::new("organizations", "incremental/organizations.json")
            .incremental("updated_at")
            .pagination(Pagination::NextPage),
    );

    // The token's start_time replaces the watermark
    let token = PageToken::param("start_time", "1700000000");
    let next = s.request_params(&StreamState::new(), Some(&token)).unwrap();
    assert_eq!(next, params(&[("start_time", "1700000000")]));

    // Page-number tokens still carry the watermark
    let page = s.request_params(&StreamState::new(), Some(&PageToken::PageNumber(2))).unwrap();
    assert_eq!(page, params(&[("page", "2"), ("start_time", START_TIME)]));
}

#[test]
fn test_request_params_reject_bad_state() {
    let s = stream(StreamDefinition::new("macros", "macros").incremental("updated_at"));
    let state = StreamState::with_cursor("updated_at", "yesterday");
    let err = s.request_params(&state, None).unwrap_err();
    assert!(matches!(err, Error::Format { .. }));
}

// ============================================================================
// Watermark
// ============================================================================

#[test_case(None, 1_622_505_600; "empty state uses start date")]
#[test_case(Some("2021-07-22T06:55:55Z"), 1_626_936_955; "newer state wins")]
#[test_case(Some("2020-01-01T00:00:00Z"), 1_622_505_600; "older state loses")]
fn test_get_stream_state_value(cursor: Option<&str>, expected: i64) {
    let s = stream(StreamDefinition::new("macros", "macros").incremental("updated_at"));
    let state = cursor.map_or_else(StreamState::new, |c| StreamState::with_cursor("updated_at", c));
    assert_eq!(s.get_stream_state_value(&state).unwrap(), expected);
}

#[test]
fn test_get_stream_state_value_export_prefers_last_end_time() {
    let s = stream(
        StreamDefinition::new("tickets", "incremental/tickets/cursor.json")
            .incremental("updated_at")
            .pagination(Pagination::ExportWindow),
    );
    let mut state = StreamState::with_cursor("updated_at", "2022-01-01T00:00:00Z");
    state.set_last_end_time(1_630_000_000);
    assert_eq!(s.get_stream_state_value(&state).unwrap(), 1_630_000_000);
}

#[test]
fn test_update_state_from_page_records_window_end() {
    let s = stream(
        StreamDefinition::new("tickets", "incremental/tickets/cursor.json")
            .incremental("updated_at")
            .pagination(Pagination::ExportWindow),
    );
    let mut state = StreamState::new();
    let body = record(json!({"tickets": [], "end_time": 1_650_000_000}));
    s.update_state_from_page(&mut state, &body);
    assert_eq!(state.last_end_time(), Some(1_650_000_000));

    // Non-export streams ignore page markers
    let other = stream(StreamDefinition::new("macros", "macros").incremental("updated_at"));
    let mut state = StreamState::new();
    other.update_state_from_page(&mut state, &body);
    assert!(state.is_empty());
}

// ============================================================================
// State updates
// ============================================================================

#[test_case(None, "2022-03-17T16:03:07Z", "2022-03-17T16:03:07Z"; "empty state takes record")]
#[test_case(Some("2022-01-01T00:00:00Z"), "2022-03-17T16:03:07Z", "2022-03-17T16:03:07Z"; "newer record advances")]
#[test_case(Some("2023-01-01T00:00:00Z"), "2022-03-17T16:03:07Z", "2023-01-01T00:00:00Z"; "older record ignored")]
fn test_get_updated_state(current: Option<&str>, latest: &str, expected: &str) {
    let s = stream(StreamDefinition::new("macros", "macros").incremental("updated_at"));
    let state = current.map_or_else(StreamState::new, |c| StreamState::with_cursor("updated_at", c));
    let updated = s.get_updated_state(&state, &record(json!({"id": 1, "updated_at": latest})));
    assert_eq!(updated.cursor("updated_at"), Some(expected));
}

#[test]
fn test_get_updated_state_without_cursor_value() {
    let s = stream(StreamDefinition::new("macros", "macros").incremental("updated_at"));
    let state = StreamState::with_cursor("updated_at", "2022-01-01T00:00:00Z");
    let updated = s.get_updated_state(&state, &record(json!({"id": 1})));
    assert_eq!(updated, state);

    let full_refresh = stream(StreamDefinition::new("tags", "tags"));
    let updated = full_refresh.get_updated_state(&StreamState::new(), &record(json!({"updated_at": "x"})));
    assert!(updated.is_empty());
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_parse_response_list() {
    let s = stream(StreamDefinition::new("tags", "tags"));
    let body = record(json!({"tags": [{"name": "vip"}, "not-a-record", {"name": "billing"}]}));
    assert_eq!(names(s.parse_response(body)), vec!["vip", "billing"]);
}

#[test_case(""; "empty body")]
#[test_case("<html>oops</html>"; "not json")]
#[test_case(r#"{"other": []}"#; "missing list")]
#[test_case(r#"{"tags": {"name": "x"}}"#; "list is an object")]
fn test_parse_response_lenient(body: &str) {
    let s = stream(StreamDefinition::new("tags", "tags"));
    assert_eq!(s.parse_response(HttpResponse::new(200, body).json_object()).count(), 0);
}

#[test]
fn test_parse_response_object() {
    let s = stream(
        StreamDefinition::new("user_settings", "account/settings")
            .list_name("settings")
            .extraction(Extraction::Object),
    );
    let body = record(json!({"settings": {"active_features": {"organization_access_enabled": true}}}));
    let records: Vec<Record> = s.parse_response(body).collect();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0]["active_features"]["organization_access_enabled"],
        json!(true)
    );
}

#[test]
fn test_parse_response_routing_conditions() {
    let s = stream(
        StreamDefinition::new("attribute_definitions", "routing/attributes/definitions")
            .list_name("definitions")
            .extraction(Extraction::RoutingConditions),
    );
    let body = record(json!({"definitions": {
            "conditions_all": [{"subject": "number_of_incidents", "title": "Number of incidents"}],
            "conditions_any": [{"subject": "brand", "title": "Brand"}, {"subject": "via_id", "title": "Channel"}]
        }}));
    let records: Vec<Record> = s.parse_response(body).collect();
    let conditions: Vec<&str> = records.iter().map(|r| r["condition"].as_str().unwrap()).collect();
    assert_eq!(conditions, vec!["all", "any", "any"]);
    assert_eq!(records[1]["subject"], json!("brand"));
}

#[test]
fn test_parse_response_child_events() {
    let s = stream(
        StreamDefinition::new("ticket_comments", "incremental/ticket_events.json")
            .list_name("ticket_events")
            .incremental("created_at")
            .pagination(Pagination::ExportWindow)
            .extraction(Extraction::ChildEvents(ChildEvents::comments())),
    );
    assert!(s.update_event_from_record());

    let body = record(json!({"ticket_events": [
            {
                "id": 1,
                "ticket_id": 10,
                "timestamp": 1_622_505_600,
                "created_at": "2021-06-01T00:00:00Z",
                "via_reference_id": null,
                "child_events": [
                    {"id": 11, "event_type": "Comment", "body": "hello"},
                    {"id": 12, "event_type": "Change", "field_name": "status"}
                ]
            },
            {
                "id": 2,
                "ticket_id": 20,
                "timestamp": 1_622_505_700,
                "child_events": []
            }
        ]}));

    let records: Vec<Record> = s.parse_response(body).collect();
    assert_eq!(records.len(), 1);
    let comment = &records[0];
    assert_eq!(comment["id"], json!(11));
    assert_eq!(comment["ticket_id"], json!(10));
    assert_eq!(comment["timestamp"], json!(1_622_505_600));
    assert_eq!(comment["via_reference_id"], json!(null));
    assert_eq!(comment["created_at"], json!("2021-06-01T00:00:00Z"));
}

// ============================================================================
// Pagination
// ============================================================================

#[test]
fn test_next_page_token_delegates_to_pagination() {
    let s = stream(
        StreamDefinition::new("ticket_metric_events", "incremental/ticket_metric_events")
            .incremental("time")
            .pagination(Pagination::CursorAfter)
            .page_size(100),
    );

    let more = record(json!({"ticket_metric_events": [], "meta": {"has_more": true, "after_cursor": "abc"}}));
    assert_eq!(s.next_page_token(&more), Some(PageToken::page_after("abc")));

    let done = record(json!({"ticket_metric_events": [], "meta": {"has_more": false, "after_cursor": "abc"}}));
    assert_eq!(s.next_page_token(&done), None);

    let single = stream(StreamDefinition::new("locales", "locales"));
    assert_eq!(single.next_page_token(&more), None);
}

#[test]
fn test_sync_modes() {
    use crate::types::SyncMode;

    let incremental = StreamDefinition::new("macros", "macros").incremental("updated_at");
    assert_eq!(incremental.sync_modes(), vec![SyncMode::FullRefresh, SyncMode::Incremental]);

    let full = StreamDefinition::new("tags", "tags");
    assert_eq!(full.sync_modes(), vec![SyncMode::FullRefresh]);
}
