//! State management module
//!
//! Handles cursor tracking and checkpoint persistence.
//! State is persisted between sync runs to enable incremental syncs.
//!
//! # Overview
//!
//! The state module provides:
//! - `StreamState` - One stream's checkpoint (cursor value, export window end)
//! - `State` - Checkpoints for every stream, keyed by stream name
//! - `StateManager` - File-based state persistence

mod manager;
mod types;

pub use manager::StateManager;
pub use types::{State, StreamState, LAST_END_TIME_KEY};
