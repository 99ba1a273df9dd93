//! Error types for the Zendesk Support source
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the Zendesk Support source
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid datetime '{value}': expected format YYYY-MM-DDTHH:MM:SSZ")]
    Format { value: String },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Forbidden. You don't have permission to access this resource.")]
    Forbidden { body: String },

    #[error("Not found. The requested resource was not found on the server.")]
    NotFound { body: String },

    #[error("Timed out waiting for response: {body}")]
    UpstreamTimeout { body: String },

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // State Errors
    // ============================================================================
    #[error("State error: {message}")]
    State { message: String },

    // ============================================================================
    // Stream Errors
    // ============================================================================
    #[error("Stream '{stream}' not found")]
    StreamNotFound { stream: String },

    #[error("Missing slice value '{key}' for stream '{stream}'")]
    MissingSliceValue { stream: String, key: String },

    #[error("Message receiver closed")]
    OutputClosed,
}

/// What the reader should do with a stream after an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// 403 / 404: the resource is not available to this account
    Inaccessible(String),
    /// Gateway timeout or request timeout
    TimedOut(String),
    /// Any other transport or server failure
    Failed(String),
}

impl SkipReason {
    /// Human readable reason text
    pub fn message(&self) -> &str {
        match self {
            Self::Inaccessible(m) | Self::TimedOut(m) | Self::Failed(m) => m,
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create a datetime format error
    pub fn format(value: impl Into<String>) -> Self {
        Self::Format {
            value: value.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            Error::RateLimited { .. } | Error::Timeout { .. } | Error::UpstreamTimeout { .. } => {
                true
            }
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }

    /// Decide whether this error should skip the current stream.
    ///
    /// Returns `None` for configuration problems and rejected credentials,
    /// which must abort the sync.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Error::HttpStatus { status: 401, .. } => None,
            Error::Forbidden { .. } | Error::NotFound { .. } => {
                Some(SkipReason::Inaccessible(self.to_string()))
            }
            Error::UpstreamTimeout { .. } | Error::Timeout { .. } => {
                Some(SkipReason::TimedOut(self.to_string()))
            }
            Error::Http(_)
            | Error::HttpStatus { .. }
            | Error::RateLimited { .. }
            | Error::MissingSliceValue { .. } => Some(SkipReason::Failed(self.to_string())),
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::JsonParse(_)
            | Error::Format { .. }
            | Error::InvalidUrl(_)
            | Error::State { .. }
            | Error::StreamNotFound { .. }
            | Error::OutputClosed => None,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504 | 520..=524)
}

/// Result type alias for the Zendesk Support source
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("subdomain");
        assert_eq!(err.to_string(), "Missing required config field: subdomain");

        let err = Error::http_status(400, "Bad request");
        assert_eq!(err.to_string(), "HTTP 400: Bad request");

        let err = Error::Forbidden {
            body: String::new(),
        };
        assert_eq!(
            err.to_string(),
            "Forbidden. You don't have permission to access this resource."
        );

        let err = Error::UpstreamTimeout {
            body: "upstream request timeout".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Timed out waiting for response: upstream request timeout"
        );
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::RateLimited {
            retry_after_seconds: 60
        }
        .is_retryable());
        assert!(Error::Timeout { timeout_ms: 1000 }.is_retryable());
        assert!(Error::http_status(429, "").is_retryable());
        assert!(Error::http_status(500, "").is_retryable());
        assert!(Error::http_status(522, "").is_retryable());

        assert!(!Error::http_status(400, "").is_retryable());
        assert!(!Error::NotFound {
            body: String::new()
        }
        .is_retryable());
        assert!(!Error::config("test").is_retryable());
    }

    #[test]
    fn test_skip_reason_classification() {
        let forbidden = Error::Forbidden {
            body: String::new(),
        };
        assert!(matches!(
            forbidden.skip_reason(),
            Some(SkipReason::Inaccessible(_))
        ));

        let timeout = Error::UpstreamTimeout {
            body: "slow".to_string(),
        };
        assert_eq!(
            timeout.skip_reason(),
            Some(SkipReason::TimedOut(
                "Timed out waiting for response: slow".to_string()
            ))
        );

        let server = Error::http_status(500, "boom");
        assert!(matches!(server.skip_reason(), Some(SkipReason::Failed(_))));

        // Rejected credentials fail every stream alike
        assert!(Error::http_status(401, "Couldn't authenticate you").skip_reason().is_none());
        assert!(Error::OutputClosed.skip_reason().is_none());

        // Bad cursor values are a configuration problem, never a skip
        assert!(Error::format("2021-13-01").skip_reason().is_none());
        assert!(Error::config("bad").skip_reason().is_none());
    }
}
