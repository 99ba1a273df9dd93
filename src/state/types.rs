//! State types for tracking sync progress
//!
//! These types are serialized to JSON and persisted between runs.

use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// State key holding the end of the last export window (Unix seconds)
pub const LAST_END_TIME_KEY: &str = "_last_end_time";

/// Complete state for the source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Per-stream state
    #[serde(default)]
    pub streams: HashMap<String, StreamState>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get state for a stream
    pub fn get_stream(&self, stream: &str) -> Option<&StreamState> {
        self.streams.get(stream)
    }

    /// State for a stream, or an empty one
    pub fn stream_or_default(&self, stream: &str) -> StreamState {
        self.get_stream(stream).cloned().unwrap_or_default()
    }

    /// Replace state for a stream
    pub fn set_stream(&mut self, stream: &str, state: StreamState) {
        self.streams.insert(stream.to_string(), state);
    }
}

/// Checkpoint for a single stream.
///
/// A flat JSON object: the cursor field name maps to the highest observed
/// timestamp string, and export streams also carry [`LAST_END_TIME_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamState(JsonObject);

impl StreamState {
    /// Create a new empty stream state
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state holding a single cursor value
    pub fn with_cursor(field: &str, value: impl Into<String>) -> Self {
        let mut state = Self::new();
        state.set_cursor(field, value);
        state
    }

    /// Cursor value for `field`, if present and a string
    pub fn cursor(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(JsonValue::as_str)
    }

    /// Set the cursor value for `field`
    pub fn set_cursor(&mut self, field: &str, value: impl Into<String>) {
        self.0
            .insert(field.to_string(), JsonValue::String(value.into()));
    }

    /// End of the last export window, in Unix seconds
    pub fn last_end_time(&self) -> Option<i64> {
        self.0.get(LAST_END_TIME_KEY).and_then(JsonValue::as_i64)
    }

    /// Record the end of an export window
    pub fn set_last_end_time(&mut self, value: i64) {
        self.0
            .insert(LAST_END_TIME_KEY.to_string(), JsonValue::from(value));
    }

    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Underlying JSON object
    pub fn as_object(&self) -> &JsonObject {
        &self.0
    }
}

impl From<JsonObject> for StreamState {
    fn from(map: JsonObject) -> Self {
        Self(map)
    }
}

impl From<StreamState> for JsonValue {
    fn from(state: StreamState) -> Self {
        JsonValue::Object(state.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_last_end_time_key() {
        assert_eq!(LAST_END_TIME_KEY, "_last_end_time");
    }

    #[test]
    fn test_stream_state_cursor() {
        let mut state = StreamState::new();
        assert!(state.cursor("updated_at").is_none());

        state.set_cursor("updated_at", "2022-03-17T16:03:07Z");
        assert_eq!(state.cursor("updated_at"), Some("2022-03-17T16:03:07Z"));
    }

    #[test]
    fn test_stream_state_last_end_time() {
        let mut state = StreamState::new();
        assert!(state.last_end_time().is_none());

        state.set_last_end_time(1_622_505_600);
        assert_eq!(state.last_end_time(), Some(1_622_505_600));
    }

    #[test]
    fn test_stream_state_is_flat_json() {
        let mut state = StreamState::with_cursor("created_at", "2021-01-01T00:00:00Z");
        state.set_last_end_time(42);

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(
            value,
            json!({"created_at": "2021-01-01T00:00:00Z", "_last_end_time": 42})
        );
    }

    #[test]
    fn test_state_serialization() {
        let mut state = State::new();
        state.set_stream(
            "macros",
            StreamState::with_cursor("updated_at", "2022-03-17T16:03:07Z"),
        );

        let json = serde_json::to_string(&state).unwrap();
        let restored: State = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, state);
        assert_eq!(
            restored.stream_or_default("macros").cursor("updated_at"),
            Some("2022-03-17T16:03:07Z")
        );
        assert!(restored.stream_or_default("groups").is_empty());
    }
}
