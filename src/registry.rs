//! Stream registry
//!
//! The table of every Zendesk Support stream. Most streams are always
//! available; three need "full access" and are only offered when the
//! first page of ticket forms can be read.

use crate::pagination::Pagination;
use crate::stream::{ChildEvents, Extraction, StreamArgs, StreamDefinition, ZendeskStream};
use std::sync::Arc;

/// `page[size]` used by every cursor-paginated endpoint
pub const PAGE_SIZE: u32 = 100;

/// Page size for ticket audits (legacy `limit` parameter)
pub const AUDITS_LIMIT: u32 = 200;

/// Streams that require the full-access plan
pub const FULL_ACCESS_STREAMS: [&str; 3] = ["ticket_forms", "account_attributes", "attribute_definitions"];

fn next_page(name: &str, path: &str) -> StreamDefinition {
    StreamDefinition::new(name, path)
        .incremental("updated_at")
        .pagination(Pagination::NextPage)
}

fn cursor_paged(name: &str, path: &str, cursor_field: &str) -> StreamDefinition {
    StreamDefinition::new(name, path)
        .incremental(cursor_field)
        .pagination(Pagination::CursorAfter)
        .page_size(PAGE_SIZE)
}

fn full_refresh_paged(name: &str, path: &str) -> StreamDefinition {
    StreamDefinition::new(name, path)
        .pagination(Pagination::CursorAfter)
        .page_size(PAGE_SIZE)
}

fn export(name: &str, path: &str) -> StreamDefinition {
    StreamDefinition::new(name, path)
        .incremental("updated_at")
        .pagination(Pagination::ExportWindow)
}

/// `account/settings`, read by the connection check only
pub fn user_settings() -> StreamDefinition {
    StreamDefinition::new("user_settings", "account/settings")
        .list_name("settings")
        .extraction(Extraction::Object)
}

/// Ticket forms; also decides full access
pub fn ticket_forms() -> StreamDefinition {
    StreamDefinition::new("ticket_forms", "ticket_forms")
        .incremental("updated_at")
        .pagination(Pagination::CursorAfter)
}

/// Streams available on every plan
pub fn always_on_definitions() -> Vec<StreamDefinition> {
    vec![
        cursor_paged("audit_logs", "audit_logs", "created_at"),
        cursor_paged("article_comments", "help_center/articles/{article_id}/comments", "updated_at")
            .list_name("comments")
            .parent("articles", "article_id", "id"),
        cursor_paged("article_votes", "help_center/articles/{article_id}/votes", "updated_at")
            .list_name("votes")
            .parent("articles", "article_id", "id"),
        next_page("articles", "help_center/incremental/articles"),
        next_page("automations", "automations"),
        full_refresh_paged("brands", "brands"),
        full_refresh_paged("categories", "categories"),
        StreamDefinition::new("custom_roles", "custom_roles"),
        next_page("dynamic_content_items", "dynamic_content/items").list_name("items"),
        cursor_paged("group_memberships", "group_memberships", "updated_at").param("sort_by", "asc"),
        next_page("groups", "groups"),
        StreamDefinition::new("locales", "locales"),
        next_page("macros", "macros"),
        next_page("organization_fields", "organization_fields"),
        cursor_paged("organization_memberships", "organization_memberships", "updated_at"),
        next_page("organizations", "incremental/organizations.json"),
        cursor_paged("post_comments", "community/posts/{post_id}/comments", "updated_at")
            .list_name("comments")
            .parent("posts", "post_id", "id"),
        cursor_paged("post_votes", "community/posts/{post_id}/votes", "updated_at")
            .list_name("votes")
            .parent("posts", "post_id", "id"),
        cursor_paged("posts", "community/posts", "updated_at"),
        cursor_paged("satisfaction_ratings", "satisfaction_ratings", "updated_at")
            .param("sort_by", "created_at"),
        full_refresh_paged("schedules", "business_hours/schedules.json"),
        full_refresh_paged("sections", "sections"),
        StreamDefinition::new("sla_policies", "slas/policies.json").pagination(Pagination::NextPage),
        full_refresh_paged("tags", "tags"),
        next_page("ticket_activities", "activities").list_name("activities"),
        StreamDefinition::new("ticket_audits", "ticket_audits")
            .list_name("audits")
            .incremental("created_at")
            .without_start_time()
            .pagination(Pagination::BeforeCursor)
            .param("sort_by", "created_at")
            .param("sort_order", "desc")
            .param("limit", AUDITS_LIMIT.to_string())
            .stop_at_watermark(),
        StreamDefinition::new("ticket_comments", "incremental/ticket_events.json")
            .list_name("ticket_events")
            .incremental("created_at")
            .pagination(Pagination::ExportWindow)
            .param("include", "comment_events")
            .extraction(Extraction::ChildEvents(ChildEvents::comments())),
        next_page("ticket_fields", "ticket_fields"),
        cursor_paged("ticket_metric_events", "incremental/ticket_metric_events", "time"),
        cursor_paged("ticket_metrics", "ticket_metrics", "updated_at"),
        cursor_paged("ticket_skips", "skips.json", "updated_at").list_name("skips"),
        export("tickets", "incremental/tickets/cursor.json"),
        next_page("topics", "community/topics"),
        next_page("triggers", "triggers"),
        full_refresh_paged("user_fields", "user_fields"),
        export("users", "incremental/users/cursor.json"),
        next_page("views", "views"),
    ]
}

/// Streams offered only when ticket forms are readable
pub fn full_access_definitions() -> Vec<StreamDefinition> {
    vec![
        ticket_forms(),
        StreamDefinition::new("account_attributes", "routing/attributes").list_name("attributes"),
        StreamDefinition::new("attribute_definitions", "routing/attributes/definitions")
            .list_name("definitions")
            .extraction(Extraction::RoutingConditions),
    ]
}

/// Every stream definition, full-access ones included
pub fn all_definitions() -> Vec<StreamDefinition> {
    let mut definitions = always_on_definitions();
    definitions.extend(full_access_definitions());
    definitions
}

/// Look up a definition by stream name
pub fn definition(name: &str) -> Option<StreamDefinition> {
    all_definitions().into_iter().find(|d| d.name == name)
}

/// Bind definitions to the sync arguments
pub fn build_streams(definitions: Vec<StreamDefinition>, args: &Arc<StreamArgs>) -> Vec<ZendeskStream> {
    definitions
        .into_iter()
        .map(|definition| ZendeskStream::new(definition, Arc::clone(args)))
        .collect()
}
