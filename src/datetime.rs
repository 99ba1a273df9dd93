//! Timestamp and cursor conversions
//!
//! Zendesk timestamps use one fixed, zero-padded UTC format
//! (`2021-07-22T06:55:55Z`). Because of that, string order matches
//! chronological order, which the state logic relies on.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// The only timestamp format accepted in config, state and cursor fields
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Earliest `start_time` ever sent upstream (the Unix epoch)
pub const MIN_START_TIME: i64 = 0;

/// Margin kept between "now" and the latest allowed `start_time`
pub const START_TIME_LAG_SECONDS: i64 = 60;

/// Parse a fixed-format timestamp into a naive (UTC) datetime.
///
/// The input must match the format exactly; anything else is a
/// [`Error::Format`].
pub fn str_to_datetime(value: &str) -> Result<NaiveDateTime> {
    let parsed = NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .map_err(|_| Error::format(value))?;

    // chrono accepts unpadded fields; reject anything that does not round-trip
    if datetime_to_str(&parsed) != value {
        return Err(Error::format(value));
    }
    Ok(parsed)
}

/// Format a naive (UTC) datetime in the fixed format
pub fn datetime_to_str(value: &NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

/// Parse a fixed-format timestamp into Unix epoch seconds.
///
/// The conversion is calendar based and never consults the local timezone.
pub fn str_to_unixtime(value: &str) -> Result<i64> {
    Ok(str_to_datetime(value)?.and_utc().timestamp())
}

/// Clamp a requested `start_time` into the range the API accepts.
///
/// Never earlier than [`MIN_START_TIME`] and never later than one minute
/// before now (the API rejects start times in the future).
pub fn validate_start_time(requested: i64) -> i64 {
    validate_start_time_at(requested, Utc::now())
}

/// [`validate_start_time`] against an explicit clock reading
pub fn validate_start_time_at(requested: i64, now: DateTime<Utc>) -> i64 {
    let ceiling = (now - Duration::seconds(START_TIME_LAG_SECONDS)).timestamp();
    requested.clamp(MIN_START_TIME, ceiling.max(MIN_START_TIME))
}

/// Default start date when none is configured: two years ago
pub fn default_start_date() -> String {
    let two_years_ago = Utc::now() - Duration::days(365 * 2);
    datetime_to_str(&two_years_ago.naive_utc())
}
