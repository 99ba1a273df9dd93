//! Early-stop validation for newest-first streams
//!
//! Ticket audits are read newest first. Once a page holds nothing at or
//! after the watermark, every later page is older still, so [`validate_response`]
//! tells the reader to stop. Status handling lives in the HTTP client and
//! [`crate::error::Error::skip_reason`].

use crate::datetime::str_to_unixtime;
use crate::error::Result;
use crate::state::StreamState;
use crate::stream::ZendeskStream;
use crate::types::{JsonObject, JsonValue};

/// Whether a newest-first page still holds records worth reading.
///
/// True only when the list under the stream's response key is non-empty and
/// at least one element's cursor is at or after
/// `max(state cursor, start date)`. A missing key, an empty list, or a page
/// of older records all return false, which ends pagination.
pub fn validate_response(
    stream: &ZendeskStream,
    body: &JsonObject,
    stream_state: &StreamState,
) -> Result<bool> {
    // A malformed persisted cursor fails even on an empty page
    let watermark = match stream.cursor_field() {
        Some(field) => Some((field, stream.get_stream_state_value(stream_state)?)),
        None => None,
    };

    let items = match body.get(stream.response_list_name()) {
        Some(JsonValue::Array(items)) if !items.is_empty() => items,
        _ => return Ok(false),
    };

    let Some((cursor_field, watermark)) = watermark else {
        return Ok(true);
    };

    Ok(items.iter().any(|item| {
        item.get(cursor_field)
            .and_then(JsonValue::as_str)
            .and_then(|value| str_to_unixtime(value).ok())
            .is_some_and(|created| created >= watermark)
    }))
}
