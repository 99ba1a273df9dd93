//! Authenticator implementation
//!
//! Builds the `Authorization` header for every request.

use super::types::Credentials;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::AUTHORIZATION;
use reqwest::RequestBuilder;

/// Authenticator applies credentials to HTTP requests
#[derive(Clone)]
pub struct Authenticator {
    /// Header value without the scheme
    token: String,
    /// `Basic` or `Bearer`
    scheme: &'static str,
}

impl Authenticator {
    /// Create an authenticator from credentials
    pub fn new(credentials: &Credentials) -> Self {
        match credentials {
            Credentials::ApiToken { email, api_token } => Self {
                token: STANDARD.encode(format!("{email}/token:{api_token}")),
                scheme: "Basic",
            },
            Credentials::OAuth2 { access_token } => Self {
                token: access_token.clone(),
                scheme: "Bearer",
            },
        }
    }

    /// The encoded token as sent on the wire (without the scheme)
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Full `Authorization` header value
    pub fn header_value(&self) -> String {
        format!("{} {}", self.scheme, self.token)
    }

    /// Apply authentication to a request builder
    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        req.header(AUTHORIZATION, self.header_value())
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("scheme", &self.scheme)
            .finish_non_exhaustive()
    }
}
