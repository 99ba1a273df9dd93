//! Pagination module
//!
//! Supports: single page, legacy `next_page` URLs, `page[after]` cursors,
//! audit `before_cursor`, and time-windowed incremental exports.
//!
//! # Overview
//!
//! Every stream picks one [`Pagination`] variant. The variant turns a parsed
//! response body into the [`PageToken`] for the next request, or `None` when
//! the stream is exhausted.

mod strategies;
mod types;

pub use strategies::{
    before_cursor_token, cursor_after_token, export_window_token, next_page_url_token,
    END_OF_STREAM_KEY,
};
pub use types::{PageToken, Pagination};

#[cfg(test)]
mod tests;
