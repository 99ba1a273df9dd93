//! Stream module
//!
//! One [`ZendeskStream`] per resource type. Streams are plain data
//! ([`StreamDefinition`]) plus the shared contract every pagination style
//! goes through:
//!
//! - `url_base` / `path` - where to send the request
//! - `request_params` - watermark, page size, sort and page token
//! - `parse_response` - lazy, lenient record extraction
//! - `next_page_token` - delegated to the stream's [`Pagination`]
//! - `get_updated_state` - monotonic cursor watermark
//!
//! [`Pagination`]: crate::pagination::Pagination

mod base;
mod definition;
mod extract;

pub use base::{StreamArgs, StreamSlice, ZendeskStream};
pub use definition::{ChildEvents, Extraction, ParentStream, StreamDefinition};
pub use extract::Records;

#[cfg(test)]
mod tests;
