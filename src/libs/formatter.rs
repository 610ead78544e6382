//! Parsing and formatting of the values the CLI exchanges with the user.
//!
//! Durations are shown as `HH:MM`. Timestamps are accepted as RFC 3339 or as
//! `YYYY-MM-DD HH:MM` / `YYYY-MM-DDTHH:MM`, always interpreted as UTC.
//!
//! ```rust
//! use taskroll::libs::formatter::{format_minutes, parse_timestamp};
//!
//! assert_eq!(format_minutes(90), "01:30");
//! let ts = parse_timestamp("2025-03-03 09:15")?;
//! assert_eq!(ts.to_rfc3339(), "2025-03-03T09:15:00+00:00");
//! # Ok::<(), taskroll::libs::error::TrackerError>(())
//! ```

use super::error::{TrackerError, TrackerResult};
use super::messages::Message;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Formats whole minutes as `HH:MM`, clamping negatives to zero.
pub fn format_minutes(minutes: i64) -> String {
    let minutes = minutes.max(0);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

pub fn format_optional_minutes(minutes: Option<i64>) -> String {
    minutes.map(format_minutes).unwrap_or_else(|| "--:--".to_string())
}

/// Short UTC rendering used in tables.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

pub fn format_optional_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(format_timestamp).unwrap_or_else(|| "-".to_string())
}

pub fn parse_date(value: &str) -> TrackerResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| TrackerError::validation(Message::InvalidDate(value.to_string())))
}

pub fn parse_timestamp(value: &str) -> TrackerResult<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TrackerError::validation(Message::InvalidTimestamp(value.to_string())))
}
