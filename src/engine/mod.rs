//! Execution engine module
//!
//! Main read loop and stream orchestration.
//!
//! # Overview
//!
//! The engine module provides:
//! - `StreamReader` - pulls one stream page by page
//! - `SyncEngine` - reads whole streams (and parent slices), applies the
//!   skip policy, checkpoints state and streams messages over a channel
//! - Message types for output (Record, State, Log, ...)

mod reader;
mod types;

pub use reader::StreamReader;
pub use types::{
    CatalogStream, CheckStatus, ConnectionStatus, Message, ReadOutcome, StreamReadResult,
    SyncConfig, SyncStats,
};

use crate::error::{Error, Result, SkipReason};
use crate::http::HttpClient;
use crate::state::{StateManager, StreamState};
use crate::stream::{StreamSlice, ZendeskStream};
use crate::types::JsonValue;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Sync engine for orchestrating data extraction
#[derive(Debug, Clone)]
pub struct SyncEngine {
    /// HTTP client
    client: Arc<HttpClient>,
    /// State manager
    state: StateManager,
    /// Sync configuration
    config: SyncConfig,
}

impl SyncEngine {
    /// Create a new sync engine
    pub fn new(client: Arc<HttpClient>, state: StateManager) -> Self {
        Self {
            client,
            state,
            config: SyncConfig::default(),
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the state manager
    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Get the HTTP client
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Read one stream to completion, sending every message to `tx` as it
    /// is produced.
    ///
    /// Records go out one page at a time, followed by that page's state
    /// checkpoint, which is also written to the state manager. Nested streams
    /// need their `parent` to produce slices. Skippable failures end the
    /// stream with [`ReadOutcome::Skipped`] and keep what was already sent;
    /// anything else is returned as an error.
    pub async fn read_stream(
        &self,
        stream: &ZendeskStream,
        parent: Option<&ZendeskStream>,
        tx: &mpsc::Sender<Message>,
    ) -> Result<StreamReadResult> {
        let start = Instant::now();
        let name = stream.name().to_string();
        let start_state = self.state.stream_state(&name).await;
        let incremental = stream.cursor_field().is_some();

        emit(tx, Message::info(format!("Starting sync for stream: {name}"))).await?;
        let mut stats = SyncStats::new();

        let slices = match self.slices(stream, parent).await {
            Ok(slices) => slices,
            Err(e) => {
                let reason = skip_or_fail(&name, e)?;
                emit(tx, skip_message(&name, &reason)).await?;
                stats.add_skip();
                return Ok(StreamReadResult {
                    stream: name,
                    outcome: ReadOutcome::Skipped(reason),
                    state: start_state,
                    stats,
                });
            }
        };

        let mut state = start_state.clone();
        let mut outcome = ReadOutcome::Completed;

        'slices: for slice in slices {
            let mut reader = StreamReader::new(&self.client, stream, start_state.clone())
                .with_running_state(state.clone());
            if let Some(slice) = slice {
                reader = reader.with_slice(slice);
            }

            loop {
                match reader.next_page().await {
                    Ok(Some(records)) => {
                        stats.add_page();
                        stats.add_records(records.len());
                        for record in records {
                            emit(tx, Message::record(&name, record)).await?;
                        }
                        if self.config.emit_state_per_page && incremental {
                            self.checkpoint(&name, reader.state(), tx).await?;
                        }
                        if self.config.max_records > 0
                            && stats.records_synced >= self.config.max_records
                        {
                            state = reader.into_state();
                            break 'slices;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        state = reader.state().clone();
                        let reason = skip_or_fail(&name, e)?;
                        emit(tx, skip_message(&name, &reason)).await?;
                        outcome = ReadOutcome::Skipped(reason);
                        break 'slices;
                    }
                }
            }
            state = reader.into_state();
        }

        if incremental {
            self.checkpoint(&name, &state, tx).await?;
        }

        match outcome {
            ReadOutcome::Completed => stats.add_stream(),
            ReadOutcome::Skipped(_) => stats.add_skip(),
        }
        stats.set_duration(start.elapsed().as_millis() as u64);

        let summary = format!(
            "Completed sync for {name}: {} records in {} pages",
            stats.records_synced, stats.pages_fetched
        );
        info!("{summary}");
        emit(tx, Message::info(summary)).await?;

        Ok(StreamReadResult {
            stream: name,
            outcome,
            state,
            stats,
        })
    }

    /// Record `state` in the manager, then announce it
    async fn checkpoint(
        &self,
        name: &str,
        state: &StreamState,
        tx: &mpsc::Sender<Message>,
    ) -> Result<()> {
        self.state.set_stream_state(name, state.clone()).await;
        emit(tx, Message::state(name, state.clone())).await
    }

    /// Path slices for a nested stream: one per parent record
    async fn slices(
        &self,
        stream: &ZendeskStream,
        parent: Option<&ZendeskStream>,
    ) -> Result<Vec<Option<StreamSlice>>> {
        let Some(link) = stream.definition().parent.as_ref() else {
            return Ok(vec![None]);
        };
        let parent = parent.ok_or_else(|| Error::StreamNotFound {
            stream: link.stream.clone(),
        })?;

        let mut reader = StreamReader::new(&self.client, parent, StreamState::new());
        let mut slices = Vec::new();
        while let Some(records) = reader.next_page().await? {
            for record in records {
                let value = match record.get(&link.parent_field) {
                    Some(JsonValue::String(s)) => s.clone(),
                    Some(JsonValue::Number(n)) => n.to_string(),
                    _ => continue,
                };
                let mut slice = StreamSlice::new();
                slice.insert(link.slice_key.clone(), value);
                slices.push(Some(slice));
            }
        }
        Ok(slices)
    }
}

/// Turn a read error into a skip, or hand it back when it must fail the sync
fn skip_or_fail(stream: &str, e: Error) -> Result<SkipReason> {
    let Some(reason) = e.skip_reason() else {
        return Err(e);
    };
    match &reason {
        SkipReason::Inaccessible(message) => {
            warn!("Skipping stream `{stream}`. {message}...");
        }
        SkipReason::TimedOut(message) | SkipReason::Failed(message) => {
            error!("Skipping stream `{stream}`. {message}...");
        }
    }
    Ok(reason)
}

/// Send one message; fails once the receiving side has gone away
async fn emit(tx: &mpsc::Sender<Message>, message: Message) -> Result<()> {
    tx.send(message).await.map_err(|_| Error::OutputClosed)
}

fn skip_message(stream: &str, reason: &SkipReason) -> Message {
    let text = format!("Skipping stream `{stream}`. {}...", reason.message());
    match reason {
        SkipReason::Inaccessible(_) => Message::warn(text),
        SkipReason::TimedOut(_) | SkipReason::Failed(_) => Message::error(text),
    }
}
