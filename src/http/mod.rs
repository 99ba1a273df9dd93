//! HTTP client module
//!
//! Provides HTTP client with retry, rate limiting, and backoff strategies.
//!
//! # Features
//!
//! - **Automatic Retries**: 429, 5xx and transport timeouts are retried
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Injectable Backoff**: the delay between retries is an object passed to
//!   the client, so tests can swap in [`NoBackoff`]
//! - **Error Classification**: 403 / 404 / 504 map to dedicated error variants

mod backoff;
mod client;
mod rate_limit;
mod response;

pub use backoff::{Backoff, ConfiguredBackoff, NoBackoff};
pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use response::HttpResponse;
