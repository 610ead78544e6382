//! Daily rollup maintenance.
//!
//! Each `(owner, day)` has one [`DailyActivity`] row holding the set of
//! tasks scheduled that day and cached counters over them. The counters are
//! a cache: [`DailyRollup::resync`] recomputes them from the referenced
//! tasks and is the only path guaranteed correct after several edits.
//! [`DailyRollup::attach`] and [`DailyRollup::detach`] adjust `total_tasks`
//! incrementally and keep the reference set current.
//!
//! Every multi-step write runs in its own `BEGIN IMMEDIATE` transaction, so
//! the read-modify-write of references and counters is serialized against
//! other writers of the same database. None of these methods may be called
//! while another transaction is open on the connection.
//!
//! ```rust
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use taskroll::db::db::Db;
//! use taskroll::libs::calendar::FixedClock;
//! use taskroll::libs::rollup::DailyRollup;
//!
//! let db = Db::open_in_memory()?;
//! let clock = FixedClock(Utc.with_ymd_and_hms(2025, 3, 3, 8, 0, 0).unwrap());
//! let rollup = DailyRollup::new(&db.conn, &clock);
//!
//! let day = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
//! let activity = rollup.get_or_create(1, day)?;
//! assert_eq!(activity.total_tasks, 0);
//! assert_eq!(rollup.resync(1, day)?, activity.counters());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use super::calendar::{day_key, percent, round1, Clock};
use super::error::{TrackerError, TrackerResult};
use super::task::{OwnerId, Task, TaskId, TaskStatus};
use crate::db::daily_activities::{ActivityCounters, DailyActivities, DailyActivity};
use crate::db::tasks::{TaskQuery, Tasks};
use crate::libs::messages::Message;
use crate::msg_debug;
use chrono::NaiveDate;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};

/// Default number of rows returned by [`DailyRollup::list_days`].
pub const DEFAULT_DAYS_LIMIT: u32 = 30;

impl ActivityCounters {
    /// Recomputes the counters from a task set.
    ///
    /// Effective minutes only count completed tasks with a known actual duration.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut counters = ActivityCounters {
            total_tasks: tasks.len() as i64,
            ..Default::default()
        };
        for task in tasks {
            match task.status {
                TaskStatus::Completed => {
                    counters.completed_tasks += 1;
                    counters.total_effective_minutes += task.actual_duration_minutes.unwrap_or(0);
                }
                TaskStatus::Missed => counters.missed_tasks += 1,
                TaskStatus::Scheduled | TaskStatus::InProgress => {}
            }
        }
        counters
    }
}

impl DailyActivity {
    pub fn counters(&self) -> ActivityCounters {
        ActivityCounters {
            total_tasks: self.total_tasks,
            completed_tasks: self.completed_tasks,
            missed_tasks: self.missed_tasks,
            total_effective_minutes: self.total_effective_minutes,
        }
    }
}

/// Figures derived from the tasks of one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStats {
    pub total_scheduled_minutes: i64,
    pub total_actual_minutes: i64,
    pub completion_rate: f64,
    /// Mean score over all of the day's tasks, unscored tasks counting as 0.
    pub productivity_score: f64,
}

impl DayStats {
    pub fn compute(activity: &DailyActivity, tasks: &[Task]) -> Self {
        let total_scheduled_minutes = tasks.iter().map(|t| t.duration_minutes).sum();
        let total_actual_minutes = tasks.iter().filter_map(|t| t.actual_duration_minutes).sum();
        let score_sum: f64 = tasks.iter().map(|t| t.productivity_score.unwrap_or(0.0)).sum();

        DayStats {
            total_scheduled_minutes,
            total_actual_minutes,
            completion_rate: round1(percent(activity.completed_tasks as f64, activity.total_tasks as f64)),
            productivity_score: if tasks.is_empty() { 0.0 } else { round1(score_sum / tasks.len() as f64) },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayDetail {
    pub activity: DailyActivity,
    pub tasks: Vec<Task>,
    pub stats: DayStats,
}

pub struct DailyRollup<'a> {
    conn: &'a Connection,
    clock: &'a dyn Clock,
}

impl<'a> DailyRollup<'a> {
    pub fn new(conn: &'a Connection, clock: &'a dyn Clock) -> Self {
        Self { conn, clock }
    }

    fn begin(&self) -> TrackerResult<Transaction<'a>> {
        Ok(Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?)
    }

    /// Returns the rollup for `day`, creating it from the tasks scheduled
    /// that day when it does not exist yet.
    pub fn get_or_create(&self, owner: OwnerId, day: NaiveDate) -> TrackerResult<DailyActivity> {
        let tx = self.begin()?;
        self.seed_if_absent(owner, day)?;
        tx.commit()?;

        self.load(owner, day)
    }

    /// Recomputes the cached counters of `day` from its referenced tasks.
    ///
    /// A missing rollup is seeded from the day's tasks first, and references
    /// to deleted tasks are dropped. Calling this twice
    /// without an intervening change stores the same values.
    pub fn resync(&self, owner: OwnerId, day: NaiveDate) -> TrackerResult<ActivityCounters> {
        let tx = self.begin()?;
        let activities = DailyActivities::new(self.conn);
        let now = self.clock.now();

        self.seed_if_absent(owner, day)?;
        let activity_id = activities
            .id_of(owner, day)?
            .ok_or(TrackerError::NotFound { entity: "Daily activity" })?;
        activities.prune_dangling(activity_id, owner)?;
        let ids = activities.task_ids(activity_id)?;
        let tasks = Tasks::new(self.conn).find(&TaskQuery::by_ids(owner, ids))?;
        let counters = ActivityCounters::from_tasks(&tasks);
        activities.store_counters(activity_id, &counters, now)?;
        tx.commit()?;

        msg_debug!(Message::RollupResynced(day.to_string()));
        Ok(counters)
    }

    /// Adds `task` to the rollup of its scheduled day.
    ///
    /// A missing rollup is created from that day's tasks, which already
    /// include `task`. Otherwise the reference is pushed and `total_tasks`
    /// incremented only when the reference was new. Returns whether the
    /// task was newly referenced.
    pub fn attach(&self, task: &Task) -> TrackerResult<bool> {
        let day = day_key(task.scheduled_start);
        let tx = self.begin()?;
        let activities = DailyActivities::new(self.conn);

        let attached = match activities.id_of(task.owner, day)? {
            None => self.seed_if_absent(task.owner, day)?,
            Some(activity_id) => {
                let pushed = activities.push_task(activity_id, task.id)?;
                if pushed {
                    activities.increment_total(activity_id, 1, self.clock.now())?;
                }
                pushed
            }
        };
        tx.commit()?;

        Ok(attached)
    }

    /// Removes `task_id` from the rollup of `day`, decrementing
    /// `total_tasks` only when a reference was actually removed.
    pub fn detach(&self, owner: OwnerId, task_id: TaskId, day: NaiveDate) -> TrackerResult<bool> {
        let tx = self.begin()?;
        let activities = DailyActivities::new(self.conn);

        let detached = match activities.id_of(owner, day)? {
            None => false,
            Some(activity_id) => {
                let pulled = activities.pull_task(activity_id, task_id)?;
                if pulled {
                    activities.increment_total(activity_id, -1, self.clock.now())?;
                }
                pulled
            }
        };
        tx.commit()?;

        Ok(detached)
    }

    /// Rollup of `day` with its referenced tasks and derived figures.
    pub fn day_detail(&self, owner: OwnerId, day: NaiveDate) -> TrackerResult<DayDetail> {
        let activity = self.get_or_create(owner, day)?;
        let tasks = Tasks::new(self.conn).find(&TaskQuery::by_ids(owner, activity.tasks.clone()))?;
        let stats = DayStats::compute(&activity, &tasks);

        Ok(DayDetail { activity, tasks, stats })
    }

    /// Rollups with `from <= date <= to`, newest first.
    pub fn list_days(&self, owner: OwnerId, from: NaiveDate, to: NaiveDate, limit: u32) -> TrackerResult<Vec<DailyActivity>> {
        if to < from {
            return Err(TrackerError::validation(Message::InvalidRange(from.to_string(), to.to_string())));
        }
        Ok(DailyActivities::new(self.conn).find_range(owner, from, to, limit)?)
    }

    /// Inserts a rollup seeded from the tasks of `day` unless one exists.
    /// Must run inside a transaction.
    fn seed_if_absent(&self, owner: OwnerId, day: NaiveDate) -> TrackerResult<bool> {
        let activities = DailyActivities::new(self.conn);
        if activities.id_of(owner, day)?.is_some() {
            return Ok(false);
        }
        let tasks = Tasks::new(self.conn).find(&TaskQuery::on_day(owner, day))?;
        let ids: Vec<TaskId> = tasks.iter().map(|t| t.id).collect();
        let counters = ActivityCounters::from_tasks(&tasks);

        Ok(activities.insert_seeded(owner, day, &counters, &ids, self.clock.now())?)
    }

    fn load(&self, owner: OwnerId, day: NaiveDate) -> TrackerResult<DailyActivity> {
        DailyActivities::new(self.conn)
            .find_one(owner, day)?
            .ok_or(TrackerError::NotFound { entity: "Daily activity" })
    }
}
