//! Persistence layer built on SQLite.
//!
//! One repository per table, each borrowing a `rusqlite::Connection` so that
//! several repositories can take part in the same transaction. The engine in
//! [`crate::libs`] is the only writer; it decides where transactions begin.
//!
//! ```rust
//! use taskroll::db::db::Db;
//! use taskroll::db::tasks::{Tasks, TaskQuery};
//!
//! let db = Db::open_in_memory()?;
//! let tasks = Tasks::new(&db.conn);
//! assert_eq!(tasks.count(&TaskQuery::for_owner(1))?, 0);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Instants are stored as UTC epoch milliseconds, calendar days as
//! `YYYY-MM-DD` text.

/// Connection management.
pub mod db;

/// Versioned schema migrations.
pub mod migrations;

/// Task documents and the query interface over them.
pub mod tasks;

/// Per-user, per-day rollup rows and their task reference sets.
pub mod daily_activities;

/// Weekly and monthly productivity summaries.
pub mod summaries;

/// Completed time entries used by the heatmap and grouped reports.
pub mod time_entries;

use chrono::{DateTime, Utc};
use rusqlite::Row;

pub(crate) fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

pub(crate) fn millis_at(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let ms: i64 = row.get(idx)?;
    DateTime::from_timestamp_millis(ms).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, ms))
}

pub(crate) fn optional_millis_at(row: &Row, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match row.get::<_, Option<i64>>(idx)? {
        Some(ms) => DateTime::from_timestamp_millis(ms)
            .map(Some)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, ms)),
        None => Ok(None),
    }
}

pub(crate) fn parsed_at<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
}
