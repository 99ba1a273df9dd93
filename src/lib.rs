// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

//! # Zendesk Support Source
//!
//! Incremental extraction from the Zendesk Support REST API.
//!
//! ## Features
//!
//! - **Four pagination protocols**: legacy `next_page` URLs, `page[after]`
//!   cursors, newest-first `before_cursor` (ticket audits) and time-windowed
//!   incremental exports
//! - **Incremental sync**: per-stream cursor watermarks that only move forward
//! - **Skip policy**: 403 / 404 / timeouts skip a single stream, never the sync
//! - **Injectable backoff**: retries wait through a [`http::Backoff`] object
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use zendesk_support_source::{SourceConfig, SourceZendeskSupport, StateManager};
//!
//! #[tokio::main]
//! async fn main() -> zendesk_support_source::Result<()> {
//!     let config = SourceConfig::from_file("config.json")?;
//!     let source = SourceZendeskSupport::new(config)?;
//!
//!     let status = source.check_connection().await;
//!     let catalog = source.discover().await;
//!
//!     let state = StateManager::from_file("state.json")?;
//!     let (tx, mut rx) = tokio::sync::mpsc::channel(64);
//!     let printer = tokio::spawn(async move {
//!         while let Some(message) = rx.recv().await {
//!             println!("{}", serde_json::to_string(&message)?);
//!         }
//!         Ok::<_, serde_json::Error>(())
//!     });
//!     let summary = source.read(&["tickets".to_string()], state.clone(), tx).await?;
//!     state.save().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │        SourceZendeskSupport: spec / check / discover / read  │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌───────────┬─────────────────┴──┬──────────────┬─────────────┐
//! │ Registry  │ Engine             │ Stream       │ HTTP        │
//! ├───────────┼────────────────────┼──────────────┼─────────────┤
//! │ 40 defs   │ StreamReader       │ params       │ Auth        │
//! │ access    │ skip policy        │ parse        │ Retry       │
//! │           │ parent slices      │ state        │ Rate limit  │
//! └───────────┴────────────────────┴──────────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Timestamp and cursor conversions
pub mod datetime;

/// Authentication
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Pagination strategies
pub mod pagination;

/// State management and checkpointing
pub mod state;

/// Stream definitions and the shared stream contract
pub mod stream;

/// Response validation and error classification
pub mod validate;

/// Main execution engine
pub mod engine;

/// Stream registry
pub mod registry;

/// Source configuration
pub mod config;

/// The source connector
pub mod connector;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::SourceConfig;
pub use connector::{ReadSummary, SourceZendeskSupport};
pub use error::{Error, Result};
pub use state::StateManager;
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
