//! Authentication module
//!
//! Supports: API token (Basic) and OAuth access token (Bearer)
//!
//! Credentials are deserialized from the source config and turned into
//! an `Authorization` header by the `Authenticator`.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::Credentials;
