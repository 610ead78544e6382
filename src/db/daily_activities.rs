//! Storage for per-day rollups.
//!
//! A row is unique per `(owner, date)`. Its task references live in
//! `daily_activity_tasks` with set semantics: pushing an id twice keeps one
//! reference. Counter columns are a cache written by the rollup maintainer.

use super::{millis_at, to_millis};
use crate::libs::task::{OwnerId, TaskId};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::{Deserialize, Serialize};

const ACTIVITY_COLUMNS: &str =
    "id, owner, date, total_tasks, completed_tasks, missed_tasks, total_effective_minutes, created_at, updated_at";

const INSERT_IF_ABSENT: &str = "INSERT INTO daily_activities (owner, date, total_tasks, completed_tasks, missed_tasks, \
     total_effective_minutes, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7) \
     ON CONFLICT (owner, date) DO NOTHING";

const INCREMENT_TOTAL: &str = "UPDATE daily_activities SET total_tasks = MAX(total_tasks + ?2, 0), updated_at = ?3 WHERE id = ?1";

const STORE_COUNTERS: &str = "UPDATE daily_activities SET total_tasks = ?2, completed_tasks = ?3, missed_tasks = ?4, \
     total_effective_minutes = ?5, updated_at = ?6 WHERE id = ?1";

const PUSH_TASK: &str = "INSERT OR IGNORE INTO daily_activity_tasks (activity_id, task_id) VALUES (?1, ?2)";
const PULL_TASK: &str = "DELETE FROM daily_activity_tasks WHERE activity_id = ?1 AND task_id = ?2";
const SELECT_TASK_IDS: &str = "SELECT task_id FROM daily_activity_tasks WHERE activity_id = ?1 ORDER BY task_id";
const PRUNE_DANGLING: &str = "DELETE FROM daily_activity_tasks WHERE activity_id = ?1 \
     AND task_id NOT IN (SELECT id FROM tasks WHERE owner = ?2)";

const AGGREGATE_BY_DATE: &str = "SELECT date, SUM(total_tasks), SUM(completed_tasks), SUM(missed_tasks), \
     SUM(total_effective_minutes) FROM daily_activities WHERE owner = ?1 AND date >= ?2 AND date <= ?3 \
     GROUP BY date ORDER BY date ASC";

/// Cached per-day aggregate for one owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyActivity {
    pub id: i64,
    pub owner: OwnerId,
    pub date: NaiveDate,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub missed_tasks: i64,
    pub total_effective_minutes: i64,
    pub tasks: Vec<TaskId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Counter values recomputed from a task set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCounters {
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub missed_tasks: i64,
    pub total_effective_minutes: i64,
}

/// One row of the per-date aggregation over rollups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTotals {
    pub date: NaiveDate,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub missed_tasks: i64,
    pub total_effective_minutes: i64,
}

pub struct DailyActivities<'a> {
    conn: &'a Connection,
}

impl<'a> DailyActivities<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn find_one(&self, owner: OwnerId, date: NaiveDate) -> Result<Option<DailyActivity>> {
        let sql = format!("SELECT {} FROM daily_activities WHERE owner = ?1 AND date = ?2", ACTIVITY_COLUMNS);
        let activity = self.conn.query_row(&sql, params![owner, date], activity_from_row).optional()?;
        match activity {
            Some(mut activity) => {
                activity.tasks = self.task_ids(activity.id)?;
                Ok(Some(activity))
            }
            None => Ok(None),
        }
    }

    /// Inserts a row seeded with `counters` and `task_ids` unless one exists.
    /// Returns whether this call created the row.
    pub fn insert_seeded(
        &self,
        owner: OwnerId,
        date: NaiveDate,
        counters: &ActivityCounters,
        task_ids: &[TaskId],
        now: DateTime<Utc>,
    ) -> Result<bool> {
        let inserted = self.conn.execute(
            INSERT_IF_ABSENT,
            params![
                owner,
                date,
                counters.total_tasks,
                counters.completed_tasks,
                counters.missed_tasks,
                counters.total_effective_minutes,
                to_millis(now)
            ],
        )?;
        if inserted == 0 {
            return Ok(false);
        }
        let id = self.conn.last_insert_rowid();
        for task_id in task_ids {
            self.conn.execute(PUSH_TASK, params![id, task_id])?;
        }
        Ok(true)
    }

    pub fn id_of(&self, owner: OwnerId, date: NaiveDate) -> Result<Option<i64>> {
        self.conn
            .query_row(
                "SELECT id FROM daily_activities WHERE owner = ?1 AND date = ?2",
                params![owner, date],
                |row| row.get(0),
            )
            .optional()
    }

    /// Adds a task reference; returns false when it was already present.
    pub fn push_task(&self, activity_id: i64, task_id: TaskId) -> Result<bool> {
        Ok(self.conn.execute(PUSH_TASK, params![activity_id, task_id])? > 0)
    }

    /// Removes a task reference; returns false when it was not present.
    pub fn pull_task(&self, activity_id: i64, task_id: TaskId) -> Result<bool> {
        Ok(self.conn.execute(PULL_TASK, params![activity_id, task_id])? > 0)
    }

    /// Adds `delta` to `total_tasks`, never going below zero.
    pub fn increment_total(&self, activity_id: i64, delta: i64, now: DateTime<Utc>) -> Result<()> {
        self.conn.execute(INCREMENT_TOTAL, params![activity_id, delta, to_millis(now)])?;
        Ok(())
    }

    pub fn store_counters(&self, activity_id: i64, counters: &ActivityCounters, now: DateTime<Utc>) -> Result<()> {
        self.conn.execute(
            STORE_COUNTERS,
            params![
                activity_id,
                counters.total_tasks,
                counters.completed_tasks,
                counters.missed_tasks,
                counters.total_effective_minutes,
                to_millis(now)
            ],
        )?;
        Ok(())
    }

    /// Drops references to tasks that no longer exist for `owner`.
    pub fn prune_dangling(&self, activity_id: i64, owner: OwnerId) -> Result<usize> {
        self.conn.execute(PRUNE_DANGLING, params![activity_id, owner])
    }

    pub fn task_ids(&self, activity_id: i64) -> Result<Vec<TaskId>> {
        let mut stmt = self.conn.prepare(SELECT_TASK_IDS)?;
        let ids = stmt
            .query_map(params![activity_id], |row| row.get(0))?
            .collect::<Result<Vec<TaskId>>>()?;
        Ok(ids)
    }

    /// Rows with `from <= date <= to`, newest first.
    pub fn find_range(&self, owner: OwnerId, from: NaiveDate, to: NaiveDate, limit: u32) -> Result<Vec<DailyActivity>> {
        let sql = format!(
            "SELECT {} FROM daily_activities WHERE owner = ?1 AND date >= ?2 AND date <= ?3 ORDER BY date DESC LIMIT ?4",
            ACTIVITY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let activity_iter = stmt.query_map(params![owner, from, to, limit], activity_from_row)?;
        let mut activities = Vec::new();
        for activity in activity_iter {
            let mut activity = activity?;
            activity.tasks = self.task_ids(activity.id)?;
            activities.push(activity);
        }
        Ok(activities)
    }

    /// Sums of the cached counters per date in `[from, to]`, ascending by date.
    pub fn aggregate_by_date(&self, owner: OwnerId, from: NaiveDate, to: NaiveDate) -> Result<Vec<DateTotals>> {
        let mut stmt = self.conn.prepare(AGGREGATE_BY_DATE)?;
        let totals = stmt
            .query_map(params![owner, from, to], |row| {
                Ok(DateTotals {
                    date: row.get(0)?,
                    total_tasks: row.get(1)?,
                    completed_tasks: row.get(2)?,
                    missed_tasks: row.get(3)?,
                    total_effective_minutes: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>>>()?;
        Ok(totals)
    }
}

fn activity_from_row(row: &Row) -> Result<DailyActivity> {
    Ok(DailyActivity {
        id: row.get(0)?,
        owner: row.get(1)?,
        date: row.get(2)?,
        total_tasks: row.get(3)?,
        completed_tasks: row.get(4)?,
        missed_tasks: row.get(5)?,
        total_effective_minutes: row.get(6)?,
        tasks: Vec::new(),
        created_at: millis_at(row, 7)?,
        updated_at: millis_at(row, 8)?,
    })
}
