//! Credential types
//!
//! Mirrors the `credentials` block of the source config.

use serde::{Deserialize, Serialize};

/// Credentials used to authenticate against the Zendesk API
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "credentials")]
pub enum Credentials {
    /// Agent email plus API token, sent as HTTP Basic
    #[serde(rename = "api_token")]
    ApiToken {
        /// Agent email address
        email: String,
        /// API token generated in the admin center
        api_token: String,
    },

    /// OAuth access token, sent as Bearer
    #[serde(rename = "oauth2.0")]
    OAuth2 {
        /// Access token
        access_token: String,
    },
}

impl Credentials {
    /// Create API token credentials
    pub fn api_token(email: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self::ApiToken {
            email: email.into(),
            api_token: api_token.into(),
        }
    }

    /// Create OAuth credentials
    pub fn oauth(access_token: impl Into<String>) -> Self {
        Self::OAuth2 {
            access_token: access_token.into(),
        }
    }
}

// Secrets stay out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApiToken { email, .. } => f
                .debug_struct("ApiToken")
                .field("email", email)
                .field("api_token", &"***")
                .finish(),
            Self::OAuth2 { .. } => f
                .debug_struct("OAuth2")
                .field("access_token", &"***")
                .finish(),
        }
    }
}
