//! Page-at-a-time reader for a single stream (and slice)

use crate::error::Result;
use crate::http::{HttpClient, RequestConfig};
use crate::pagination::PageToken;
use crate::state::StreamState;
use crate::stream::{StreamSlice, ZendeskStream};
use crate::types::Record;
use crate::validate::validate_response;
use tracing::debug;

/// Pulls pages of one stream on demand.
///
/// Request parameters always come from the state snapshot taken at
/// construction; the running state advances with every record.
pub struct StreamReader<'a> {
    client: &'a HttpClient,
    stream: &'a ZendeskStream,
    slice: Option<StreamSlice>,
    start_state: StreamState,
    state: StreamState,
    next_token: Option<PageToken>,
    done: bool,
    pages: usize,
}

impl<'a> StreamReader<'a> {
    /// Start reading `stream` from `stream_state`
    pub fn new(client: &'a HttpClient, stream: &'a ZendeskStream, stream_state: StreamState) -> Self {
        Self {
            client,
            stream,
            slice: None,
            state: stream_state.clone(),
            start_state: stream_state,
            next_token: None,
            done: false,
            pages: 0,
        }
    }

    /// Read one slice of a nested stream
    #[must_use]
    pub fn with_slice(mut self, slice: StreamSlice) -> Self {
        self.slice = Some(slice);
        self
    }

    /// Continue from a state already advanced by earlier slices
    #[must_use]
    pub fn with_running_state(mut self, state: StreamState) -> Self {
        self.state = state;
        self
    }

    /// State after every record returned so far
    pub fn state(&self) -> &StreamState {
        &self.state
    }

    /// Consume the reader, keeping its state
    pub fn into_state(self) -> StreamState {
        self.state
    }

    /// Pages fetched so far
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Fetch the next page.
    ///
    /// Returns `Ok(None)` once pagination is complete. Errors leave the
    /// running state at the last record returned.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Record>>> {
        if self.done {
            return Ok(None);
        }

        let url = self.stream.url(self.slice.as_ref())?;
        let params = self
            .stream
            .request_params(&self.start_state, self.next_token.as_ref())?;
        let response = self
            .client
            .get_with_config(&url, RequestConfig::new().with_query(params))
            .await?;
        self.pages += 1;
        let body = response.json_object();

        if self.stream.definition().stop_at_watermark
            && !validate_response(self.stream, &body, &self.start_state)?
        {
            debug!(
                "Stream {}: page {} holds nothing newer than the watermark, stopping",
                self.stream.name(),
                self.pages
            );
            self.done = true;
            return Ok(None);
        }

        let token = self.stream.next_page_token(&body);
        self.stream.update_state_from_page(&mut self.state, &body);

        let records: Vec<Record> = self.stream.parse_response(body).collect();
        for record in &records {
            self.state = self.stream.get_updated_state(&self.state, record);
        }
        debug!(
            "Stream {}: page {} with {} records",
            self.stream.name(),
            self.pages,
            records.len()
        );

        match token {
            Some(token) if self.next_token.as_ref() == Some(&token) => {
                debug!(
                    "Stream {}: page token repeated, stopping",
                    self.stream.name()
                );
                self.done = true;
            }
            Some(token) => self.next_token = Some(token),
            None => self.done = true,
        }

        Ok(Some(records))
    }
}
