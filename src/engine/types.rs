//! Engine types
//!
//! Protocol messages, per-stream read results and sync statistics.

use crate::error::SkipReason;
use crate::state::StreamState;
use crate::types::{JsonValue, LogLevel, Record, SyncMode};
use serde::{Deserialize, Serialize};

/// A message emitted during a sync (one JSON line on stdout)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// One record
    Record {
        /// Stream name
        stream: String,
        /// The record
        data: Record,
        /// Emission time, Unix milliseconds
        emitted_at: i64,
    },
    /// Checkpoint for one stream
    State {
        /// Stream name
        stream: String,
        /// Stream state
        data: StreamState,
    },
    /// Log line
    Log {
        /// Log level
        level: LogLevel,
        /// Log message
        message: String,
    },
    /// Result of a connection check
    ConnectionStatus {
        /// Check outcome
        status: ConnectionStatus,
    },
    /// Discovered streams
    Catalog {
        /// Catalog entries
        streams: Vec<CatalogStream>,
    },
    /// Connector specification
    Spec {
        /// JSON schema of the configuration
        spec: JsonValue,
    },
}

impl Message {
    /// Create a record message stamped with the current time
    pub fn record(stream: impl Into<String>, data: Record) -> Self {
        Self::Record {
            stream: stream.into(),
            data,
            emitted_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Create a state message
    pub fn state(stream: impl Into<String>, data: StreamState) -> Self {
        Self::State {
            stream: stream.into(),
            data,
        }
    }

    /// Create a log message
    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        Self::Log {
            level,
            message: message.into(),
        }
    }

    /// Create an info log
    pub fn info(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Info, message)
    }

    /// Create a warning log
    pub fn warn(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Warn, message)
    }

    /// Create an error log
    pub fn error(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Error, message)
    }

    /// Check if this is a record message
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }

    /// Check if this is a state message
    pub fn is_state(&self) -> bool {
        matches!(self, Self::State { .. })
    }

    /// Check if this is a log message
    pub fn is_log(&self) -> bool {
        matches!(self, Self::Log { .. })
    }
}

/// Connection check result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// `SUCCEEDED` or `FAILED`
    pub status: CheckStatus,
    /// Failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Connection check outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckStatus {
    /// Credentials and start date accepted
    Succeeded,
    /// Anything else
    Failed,
}

impl ConnectionStatus {
    /// Successful check
    pub fn succeeded() -> Self {
        Self {
            status: CheckStatus::Succeeded,
            message: None,
        }
    }

    /// Failed check with a reason
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Failed,
            message: Some(message.into()),
        }
    }
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStream {
    /// Stream name
    pub name: String,
    /// Supported sync modes
    pub supported_sync_modes: Vec<SyncMode>,
    /// Whether the source picks the cursor
    pub source_defined_cursor: bool,
    /// Cursor path, empty for full refresh
    #[serde(default)]
    pub default_cursor_field: Vec<String>,
}

/// How a stream read ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// All pages read
    Completed,
    /// Stopped early; records read before the failure are kept
    Skipped(SkipReason),
}

/// Summary of one stream read; the messages themselves went out on the channel
#[derive(Debug, Clone)]
pub struct StreamReadResult {
    /// Stream name
    pub stream: String,
    /// How the read ended
    pub outcome: ReadOutcome,
    /// Final stream state
    pub state: StreamState,
    /// Counters for this stream
    pub stats: SyncStats,
}

impl StreamReadResult {
    /// Whether the stream was skipped
    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, ReadOutcome::Skipped(_))
    }
}

/// Configuration for sync operation
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Whether to emit state after each page
    pub emit_state_per_page: bool,
    /// Maximum records per stream (0 = unlimited)
    pub max_records: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            emit_state_per_page: true,
            max_records: 0,
        }
    }
}

impl SyncConfig {
    /// Create a new sync config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit state after each page
    #[must_use]
    pub fn with_state_per_page(mut self, emit: bool) -> Self {
        self.emit_state_per_page = emit;
        self
    }

    /// Set max records
    #[must_use]
    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = max;
        self
    }
}

/// Statistics from a sync operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Total records synced
    pub records_synced: usize,
    /// Total pages fetched
    pub pages_fetched: usize,
    /// Streams read to completion
    pub streams_synced: usize,
    /// Streams skipped
    pub streams_skipped: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add records
    pub fn add_records(&mut self, count: usize) {
        self.records_synced += count;
    }

    /// Add a page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Add a completed stream
    pub fn add_stream(&mut self) {
        self.streams_synced += 1;
    }

    /// Add a skipped stream
    pub fn add_skip(&mut self) {
        self.streams_skipped += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }

    /// Fold another stream's counters into these
    pub fn merge(&mut self, other: &SyncStats) {
        self.records_synced += other.records_synced;
        self.pages_fetched += other.pages_fetched;
        self.streams_synced += other.streams_synced;
        self.streams_skipped += other.streams_skipped;
    }
}
