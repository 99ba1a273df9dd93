//! The Zendesk Support source
//!
//! Ties configuration, the HTTP client, the stream registry and the sync
//! engine together behind the four protocol operations: spec, check,
//! discover and read.

use crate::auth::Authenticator;
use crate::config::SourceConfig;
use crate::engine::{
    CatalogStream, ConnectionStatus, Message, ReadOutcome, StreamReadResult, StreamReader,
    SyncConfig, SyncEngine, SyncStats,
};
use crate::error::{Error, Result};
use crate::http::{Backoff, HttpClient};
use crate::registry;
use crate::state::{StateManager, StreamState};
use crate::stream::{StreamArgs, ZendeskStream};
use crate::types::JsonValue;
use futures::{StreamExt, TryStreamExt};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Returned by the connection check when the account lacks admin features
pub const ADMIN_PERMISSIONS_MESSAGE: &str = "Please verify that the account linked to the API key has admin permissions and try again. For more information visit https://support.zendesk.com/hc/en-us/articles/4408832171034-About-team-member-product-roles-and-access.";

/// Results of a read across several streams
#[derive(Debug, Clone)]
pub struct ReadSummary {
    /// Per-stream results, in request order
    pub results: Vec<StreamReadResult>,
    /// Totals
    pub stats: SyncStats,
}

/// Zendesk Support source connector
#[derive(Debug)]
pub struct SourceZendeskSupport {
    config: SourceConfig,
    client: Arc<HttpClient>,
    args: Arc<StreamArgs>,
    sync: SyncConfig,
}

impl SourceZendeskSupport {
    /// Build the source from a validated config
    pub fn new(config: SourceConfig) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self::from_parts(config, client))
    }

    /// Build the source with a custom retry backoff
    pub fn with_backoff(config: SourceConfig, backoff: Arc<dyn Backoff>) -> Result<Self> {
        let client = build_client(&config)?.with_backoff(backoff);
        Ok(Self::from_parts(config, client))
    }

    fn from_parts(config: SourceConfig, client: HttpClient) -> Self {
        Self {
            args: Arc::new(config.stream_args()),
            client: Arc::new(client),
            config,
            sync: SyncConfig::default(),
        }
    }

    /// Override engine settings
    #[must_use]
    pub fn with_sync_config(mut self, sync: SyncConfig) -> Self {
        self.sync = sync;
        self
    }

    /// Source configuration
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Connector specification: JSON schema of the config document
    pub fn spec() -> JsonValue {
        json!({
            "documentationUrl": "https://docs.airbyte.com/integrations/sources/zendesk-support",
            "connectionSpecification": {
                "$schema": "http://json-schema.org/draft-07/schema#",
                "title": "Source Zendesk Support Spec",
                "type": "object",
                "required": ["subdomain", "credentials"],
                "properties": {
                    "subdomain": {
                        "type": "string",
                        "title": "Subdomain",
                        "description": "The subdomain of your Zendesk Support account, e.g. `mycompany` for mycompany.zendesk.com."
                    },
                    "start_date": {
                        "type": "string",
                        "title": "Start Date",
                        "description": "UTC date and time in the format 2021-06-01T00:00:00Z. Defaults to two years ago.",
                        "pattern": "^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}Z$",
                        "examples": ["2021-06-01T00:00:00Z"]
                    },
                    "credentials": {
                        "title": "Authentication",
                        "type": "object",
                        "oneOf": [
                            {
                                "title": "OAuth2.0",
                                "type": "object",
                                "required": ["access_token"],
                                "properties": {
                                    "credentials": {"type": "string", "const": "oauth2.0"},
                                    "access_token": {"type": "string", "airbyte_secret": true}
                                }
                            },
                            {
                                "title": "API Token",
                                "type": "object",
                                "required": ["email", "api_token"],
                                "properties": {
                                    "credentials": {"type": "string", "const": "api_token"},
                                    "email": {"type": "string"},
                                    "api_token": {"type": "string", "airbyte_secret": true}
                                }
                            }
                        ]
                    },
                    "api_base_url": {"type": "string"},
                    "max_retries": {"type": "integer", "minimum": 0},
                    "requests_per_minute": {"type": "integer", "minimum": 1},
                    "stream_concurrency": {"type": "integer", "minimum": 1}
                }
            }
        })
    }

    /// Check credentials, start date and admin access.
    ///
    /// Reads the first `account/settings` record; the check passes only when
    /// `active_features.organization_access_enabled` is truthy.
    pub async fn check_connection(&self) -> ConnectionStatus {
        if let Err(e) = self.config.validate() {
            return ConnectionStatus::failed(e.to_string());
        }

        let settings = ZendeskStream::new(registry::user_settings(), Arc::clone(&self.args));
        let mut reader = StreamReader::new(&self.client, &settings, StreamState::new());
        let record = match reader.next_page().await {
            Ok(page) => page.and_then(|records| records.into_iter().next()),
            Err(e) => return ConnectionStatus::failed(e.to_string()),
        };

        let enabled = record
            .as_ref()
            .and_then(|r| r.get("active_features"))
            .and_then(|f| f.get("organization_access_enabled"))
            .is_some_and(is_truthy);

        if enabled {
            ConnectionStatus::succeeded()
        } else {
            ConnectionStatus::failed(ADMIN_PERMISSIONS_MESSAGE)
        }
    }

    /// Every stream this account can read.
    ///
    /// The full-access streams are included only when the first page of
    /// ticket forms can be read.
    pub async fn streams(&self) -> Vec<ZendeskStream> {
        let mut definitions = registry::always_on_definitions();

        let forms = ZendeskStream::new(registry::ticket_forms(), Arc::clone(&self.args));
        let mut reader = StreamReader::new(&self.client, &forms, StreamState::new());
        match reader.next_page().await {
            Ok(_) => definitions.extend(registry::full_access_definitions()),
            Err(e) => warn!(
                "An exception occurred while trying to access {} stream: {e}. Skipping this stream.",
                forms.definition().title()
            ),
        }

        registry::build_streams(definitions, &self.args)
    }

    /// Catalog of available streams
    pub async fn discover(&self) -> Vec<CatalogStream> {
        self.streams()
            .await
            .iter()
            .map(|stream| {
                let definition = stream.definition();
                CatalogStream {
                    name: definition.name.clone(),
                    supported_sync_modes: definition.sync_modes(),
                    source_defined_cursor: definition.is_incremental(),
                    default_cursor_field: definition.cursor_field.iter().cloned().collect(),
                }
            })
            .collect()
    }

    /// Read the selected streams (all when `selected` is empty).
    ///
    /// Streams are read concurrently up to the configured limit; results keep
    /// the request order. Messages go to `tx` as they are produced and each
    /// state checkpoint also lands in `state`; saving it is up to the caller.
    /// The channel closes when this returns.
    pub async fn read(
        &self,
        selected: &[String],
        state: StateManager,
        tx: mpsc::Sender<Message>,
    ) -> Result<ReadSummary> {
        let start = Instant::now();
        let available = self.streams().await;

        let chosen: Vec<&ZendeskStream> = if selected.is_empty() {
            available.iter().collect()
        } else {
            selected
                .iter()
                .map(|name| {
                    available
                        .iter()
                        .find(|s| s.name() == name)
                        .ok_or_else(|| Error::StreamNotFound {
                            stream: name.clone(),
                        })
                })
                .collect::<Result<_>>()?
        };

        let engine =
            SyncEngine::new(Arc::clone(&self.client), state).with_config(self.sync.clone());

        let results: Vec<StreamReadResult> = futures::stream::iter(chosen.into_iter().map(|stream| {
            let parent = stream
                .definition()
                .parent
                .as_ref()
                .and_then(|link| available.iter().find(|s| s.name() == link.stream));
            engine.read_stream(stream, parent, &tx)
        }))
        .buffered(self.config.stream_concurrency())
        .try_collect()
        .await?;

        let mut stats = SyncStats::new();
        for result in &results {
            stats.merge(&result.stats);
            if let ReadOutcome::Skipped(reason) = &result.outcome {
                info!("Stream {} skipped: {}", result.stream, reason.message());
            }
        }
        stats.set_duration(start.elapsed().as_millis() as u64);

        info!(
            "Read {} records from {} streams ({} skipped)",
            stats.records_synced,
            stats.streams_synced + stats.streams_skipped,
            stats.streams_skipped
        );

        Ok(ReadSummary { results, stats })
    }
}

fn build_client(config: &SourceConfig) -> Result<HttpClient> {
    config.validate()?;
    Ok(HttpClient::with_config(config.http_config())?
        .with_authenticator(Authenticator::new(&config.credentials)))
}

fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(a) => !a.is_empty(),
        JsonValue::Object(o) => !o.is_empty(),
        JsonValue::Null => false,
    }
}
