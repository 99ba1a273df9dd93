//! Buffered HTTP response
//!
//! Pagination and parsing work on this owned value rather than on the
//! live `reqwest::Response`, so they can be exercised from literal bodies.

use reqwest::header::HeaderMap;
use serde_json::Value;

/// A fully read HTTP response
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    status: u16,
    headers: HeaderMap,
    body: String,
}

impl HttpResponse {
    /// Create a response from a status and body
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Create a 200 response with a JSON body
    pub fn from_json(body: &Value) -> Self {
        Self::new(200, body.to_string())
    }

    /// Attach headers
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Response headers
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw body text
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body parsed as JSON; `None` when empty or malformed
    pub fn json(&self) -> Option<Value> {
        if self.body.trim().is_empty() {
            return None;
        }
        serde_json::from_str(&self.body).ok()
    }

    /// Body parsed as a JSON object; empty object when anything else
    pub fn json_object(&self) -> serde_json::Map<String, Value> {
        match self.json() {
            Some(Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }
}
