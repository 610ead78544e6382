//! Time entries: free-form tracked intervals that feed the activity heatmap
//! and the grouped time report. Only completed entries (with a duration)
//! take part in statistics.

use super::{millis_at, optional_millis_at, to_millis};
use crate::libs::calendar::minutes_between;
use crate::libs::task::OwnerId;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result, Row};
use serde::{Deserialize, Serialize};

const INSERT_ENTRY: &str = "INSERT INTO time_entries (owner, project, description, category, start_time, end_time, duration) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

const SELECT_COMPLETED: &str = "SELECT id, owner, project, description, category, start_time, end_time, duration \
     FROM time_entries WHERE owner = ?1 AND start_time >= ?2 AND start_time <= ?3 AND duration IS NOT NULL \
     ORDER BY start_time ASC, id ASC";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: i64,
    pub owner: OwnerId,
    pub project: Option<String>,
    pub description: String,
    pub category: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Minutes; present once the entry is finished.
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct NewTimeEntry {
    pub project: Option<String>,
    pub description: String,
    pub category: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: Option<i64>,
}

pub struct TimeEntries<'a> {
    conn: &'a Connection,
}

impl<'a> TimeEntries<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Stores an entry, deriving its duration from the end time when not given.
    pub fn insert(&self, owner: OwnerId, entry: &NewTimeEntry) -> Result<i64> {
        let duration = entry
            .duration
            .or_else(|| entry.end_time.map(|end| minutes_between(entry.start_time, end)));
        self.conn.execute(
            INSERT_ENTRY,
            params![
                owner,
                entry.project,
                entry.description,
                entry.category,
                to_millis(entry.start_time),
                entry.end_time.map(to_millis),
                duration,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Finished entries with `start_time` in `[from, to]`.
    pub fn find_completed(&self, owner: OwnerId, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<TimeEntry>> {
        let mut stmt = self.conn.prepare(SELECT_COMPLETED)?;
        let entries = stmt
            .query_map(params![owner, to_millis(from), to_millis(to)], entry_from_row)?
            .collect::<Result<Vec<_>>>()?;
        Ok(entries)
    }
}

fn entry_from_row(row: &Row) -> Result<TimeEntry> {
    Ok(TimeEntry {
        id: row.get(0)?,
        owner: row.get(1)?,
        project: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        start_time: millis_at(row, 5)?,
        end_time: optional_millis_at(row, 6)?,
        duration: row.get(7)?,
    })
}
