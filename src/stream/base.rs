//! The stream contract shared by every pagination style

use super::definition::{Extraction, StreamDefinition};
use super::extract::{extract, Records};
use crate::datetime::{str_to_unixtime, validate_start_time};
use crate::error::{Error, Result};
use crate::pagination::{PageToken, Pagination};
use crate::state::StreamState;
use crate::types::{JsonObject, JsonValue, QueryParams, Record};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Path values for nested streams (e.g. `{"post_id": "42"}`)
pub type StreamSlice = BTreeMap<String, String>;

/// Per-sync settings shared by every stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamArgs {
    /// Tenant subdomain (`{subdomain}.zendesk.com`)
    pub subdomain: String,
    /// Configured start date, fixed format
    pub start_date: String,
    /// Replaces `https://{subdomain}.zendesk.com/api/v2/` when set
    pub api_base_url: Option<String>,
}

impl StreamArgs {
    /// Create stream args
    pub fn new(subdomain: impl Into<String>, start_date: impl Into<String>) -> Self {
        Self {
            subdomain: subdomain.into(),
            start_date: start_date.into(),
            api_base_url: None,
        }
    }

    /// Point every stream at a different API base
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }
}

/// One resource stream: a definition bound to the sync's arguments
#[derive(Debug, Clone)]
pub struct ZendeskStream {
    definition: StreamDefinition,
    args: Arc<StreamArgs>,
}

impl ZendeskStream {
    /// Bind a definition to sync arguments
    pub fn new(definition: StreamDefinition, args: Arc<StreamArgs>) -> Self {
        Self { definition, args }
    }

    /// Stream name
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Static definition
    pub fn definition(&self) -> &StreamDefinition {
        &self.definition
    }

    /// Sync arguments
    pub fn args(&self) -> &StreamArgs {
        &self.args
    }

    /// Cursor field, if incremental
    pub fn cursor_field(&self) -> Option<&str> {
        self.definition.cursor_field.as_deref()
    }

    /// Key under which records live in the response body
    pub fn response_list_name(&self) -> &str {
        &self.definition.response_list_name
    }

    /// Whether state is read from synthesized child records
    pub fn update_event_from_record(&self) -> bool {
        matches!(self.definition.extraction, Extraction::ChildEvents(_))
    }

    /// API base URL, always ending with `/`
    pub fn url_base(&self) -> String {
        match &self.args.api_base_url {
            Some(base) => format!("{}/", base.trim_end_matches('/')),
            None => format!("https://{}.zendesk.com/api/v2/", self.args.subdomain),
        }
    }

    /// Resource path, with `{key}` placeholders filled from `slice`
    pub fn path(&self, slice: Option<&StreamSlice>) -> Result<String> {
        let template = self.definition.path.as_str();
        let mut path = String::with_capacity(template.len());
        let mut rest = template;

        // Values are copied verbatim; only the template is scanned
        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            let key = &rest[start + 1..start + len];
            let value = slice
                .and_then(|s| s.get(key))
                .ok_or_else(|| Error::MissingSliceValue {
                    stream: self.name().to_string(),
                    key: key.to_string(),
                })?;
            path.push_str(&rest[..start]);
            path.push_str(value);
            rest = &rest[start + len + 1..];
        }
        path.push_str(rest);

        Ok(path)
    }

    /// Absolute request URL
    pub fn url(&self, slice: Option<&StreamSlice>) -> Result<String> {
        Ok(format!("{}{}", self.url_base(), self.path(slice)?))
    }

    /// Records in a response body, lazily.
    ///
    /// Takes the body parsed by [`crate::http::HttpResponse::json_object`], so empty,
    /// malformed or unexpected bodies produce an empty sequence.
    pub fn parse_response(&self, body: JsonObject) -> Records {
        extract(
            body,
            &self.definition.response_list_name,
            &self.definition.extraction,
            self.cursor_field(),
        )
    }

    /// Token for the next page, or `None` when the stream is exhausted
    pub fn next_page_token(&self, body: &JsonObject) -> Option<PageToken> {
        self.definition.pagination.next_page_token(body)
    }

    /// New state after observing `latest_record`.
    ///
    /// The cursor only moves forward. Full-refresh streams and records
    /// without a string cursor value leave the state unchanged.
    pub fn get_updated_state(&self, current_state: &StreamState, latest_record: &Record) -> StreamState {
        let mut state = current_state.clone();

        let Some(field) = self.cursor_field() else {
            return state;
        };
        let Some(latest) = latest_record.get(field).and_then(JsonValue::as_str) else {
            return state;
        };

        // Fixed-width UTC timestamps order the same as strings
        match current_state.cursor(field) {
            Some(current) if current >= latest => {}
            _ => state.set_cursor(field, latest),
        }
        state
    }

    /// Fold page-level markers into the state (export window end)
    pub fn update_state_from_page(&self, state: &mut StreamState, body: &JsonObject) {
        if !self.definition.pagination.is_export() {
            return;
        }
        if let Some(end_time) = body.get("end_time").and_then(JsonValue::as_i64) {
            state.set_last_end_time(end_time);
        }
    }

    /// Effective `start_time` (Unix seconds) for the first request.
    ///
    /// The later of the configured start date and the persisted watermark,
    /// clamped into the accepted range. Export streams resume from their
    /// last window end when one was recorded.
    pub fn get_stream_state_value(&self, stream_state: &StreamState) -> Result<i64> {
        let mut start_time = str_to_unixtime(&self.args.start_date)?;

        if self.definition.pagination.is_export() {
            if let Some(last_end_time) = stream_state.last_end_time() {
                return Ok(validate_start_time(start_time.max(last_end_time)));
            }
        }

        if let Some(cursor) = self.cursor_field().and_then(|f| stream_state.cursor(f)) {
            start_time = start_time.max(str_to_unixtime(cursor)?);
        }

        Ok(validate_start_time(start_time))
    }

    /// Query parameters for one request
    pub fn request_params(
        &self,
        stream_state: &StreamState,
        next_page_token: Option<&PageToken>,
    ) -> Result<QueryParams> {
        let definition = &self.definition;
        let mut params = QueryParams::new();

        // Export pages after the first are fully addressed by their token, as
        // are time-based pages whose token carries its own start_time
        let token_addresses_window = next_page_token.is_some_and(|token| {
            definition.pagination == Pagination::ExportWindow || token.sets("start_time")
        });

        if definition.send_start_time && !token_addresses_window {
            params.insert(
                "start_time".to_string(),
                self.get_stream_state_value(stream_state)?.to_string(),
            );
        }

        if let Some(size) = definition.page_size {
            params.insert("page[size]".to_string(), size.to_string());
        }

        for (key, value) in &definition.extra_params {
            params.insert(key.clone(), value.clone());
        }

        if let Some(token) = next_page_token {
            params.extend(token.to_query());
        }

        Ok(params)
    }
}
