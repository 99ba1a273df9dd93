//! Declarative stream definitions
//!
//! A definition names the endpoint, the response list, the cursor field and
//! the pagination protocol. Builders keep the registry table readable.

use crate::pagination::Pagination;
use crate::types::SyncMode;

/// How records are pulled out of a response body
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Extraction {
    /// `body[list_name]` is an array of records
    #[default]
    List,
    /// `body[list_name]` is one record
    Object,
    /// Routing attribute definitions: `conditions_all` / `conditions_any`
    /// arrays flattened into records tagged with `condition: all|any`
    RoutingConditions,
    /// Export events carrying nested child events
    ChildEvents(ChildEvents),
}

/// Child-event explosion settings for incremental event exports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEvents {
    /// Event type to keep (e.g. `Comment`)
    pub event_type: String,
    /// Key of the nested list inside each event
    pub target_entity: String,
    /// Parent fields copied onto every child record
    pub parent_fields: Vec<String>,
}

impl ChildEvents {
    /// Comment events nested in ticket events
    pub fn comments() -> Self {
        Self {
            event_type: "Comment".to_string(),
            target_entity: "child_events".to_string(),
            parent_fields: vec![
                "via_reference_id".to_string(),
                "ticket_id".to_string(),
                "timestamp".to_string(),
            ],
        }
    }
}

/// Parent stream providing path values for a nested stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentStream {
    /// Name of the parent stream
    pub stream: String,
    /// Placeholder in the child path (e.g. `post_id`)
    pub slice_key: String,
    /// Field of the parent record holding the value (e.g. `id`)
    pub parent_field: String,
}

/// Static description of one stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDefinition {
    /// Stream name (snake case)
    pub name: String,
    /// Endpoint path relative to the API base; may contain `{key}` placeholders
    pub path: String,
    /// Key under which records live in the response body
    pub response_list_name: String,
    /// Cursor field for incremental sync; `None` for full refresh
    pub cursor_field: Option<String>,
    /// Pagination protocol
    pub pagination: Pagination,
    /// `page[size]` value, if the endpoint takes one
    pub page_size: Option<u32>,
    /// Whether requests carry the `start_time` watermark
    pub send_start_time: bool,
    /// Fixed extra query parameters (sorting, limits, sideloads)
    pub extra_params: Vec<(String, String)>,
    /// Record extraction rule
    pub extraction: Extraction,
    /// Stop paginating once a page holds nothing newer than the watermark
    pub stop_at_watermark: bool,
    /// Parent stream for nested paths
    pub parent: Option<ParentStream>,
}

impl StreamDefinition {
    /// Full-refresh, single-page stream whose records live under `name`
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            response_list_name: name.clone(),
            name,
            path: path.into(),
            cursor_field: None,
            pagination: Pagination::Single,
            page_size: None,
            send_start_time: false,
            extra_params: Vec::new(),
            extraction: Extraction::List,
            stop_at_watermark: false,
            parent: None,
        }
    }

    /// Make the stream incremental on `cursor_field` (sends `start_time`)
    #[must_use]
    pub fn incremental(mut self, cursor_field: impl Into<String>) -> Self {
        self.cursor_field = Some(cursor_field.into());
        self.send_start_time = true;
        self
    }

    /// Set the pagination protocol
    #[must_use]
    pub fn pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// Set the `page[size]` parameter
    #[must_use]
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Override the response list key
    #[must_use]
    pub fn list_name(mut self, name: impl Into<String>) -> Self {
        self.response_list_name = name.into();
        self
    }

    /// Add a fixed query parameter
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_params.push((key.into(), value.into()));
        self
    }

    /// Do not send `start_time` even though the stream is incremental
    #[must_use]
    pub fn without_start_time(mut self) -> Self {
        self.send_start_time = false;
        self
    }

    /// Set the extraction rule
    #[must_use]
    pub fn extraction(mut self, extraction: Extraction) -> Self {
        self.extraction = extraction;
        self
    }

    /// Stop pagination at the first page older than the watermark
    #[must_use]
    pub fn stop_at_watermark(mut self) -> Self {
        self.stop_at_watermark = true;
        self
    }

    /// Nest under a parent stream
    #[must_use]
    pub fn parent(
        mut self,
        stream: impl Into<String>,
        slice_key: impl Into<String>,
        parent_field: impl Into<String>,
    ) -> Self {
        self.parent = Some(ParentStream {
            stream: stream.into(),
            slice_key: slice_key.into(),
            parent_field: parent_field.into(),
        });
        self
    }

    /// Whether the stream supports incremental sync
    pub fn is_incremental(&self) -> bool {
        self.cursor_field.is_some()
    }

    /// Supported sync modes
    pub fn sync_modes(&self) -> Vec<SyncMode> {
        if self.is_incremental() {
            vec![SyncMode::FullRefresh, SyncMode::Incremental]
        } else {
            vec![SyncMode::FullRefresh]
        }
    }

    /// Upper camel case title (`ticket_forms` -> `TicketForms`)
    pub fn title(&self) -> String {
        self.name
            .split('_')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect()
    }
}
