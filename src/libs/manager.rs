//! Task lifecycle: create, update, delete, start, stop and the missed sweep.
//!
//! Every lookup is scoped by owner; another owner's task is reported as
//! [`TrackerError::NotFound`] exactly like a missing one.
//!
//! Creating a task is authoritative once the row is stored. Linking it into
//! its day's rollup and expanding a recurring template are follow-up steps:
//! their failures are logged and returned in [`CreateOutcome::issues`] but do
//! not undo the task. A later [`DailyRollup::resync`] repairs the day.
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use taskroll::db::db::Db;
//! use taskroll::libs::calendar::FixedClock;
//! use taskroll::libs::manager::TaskManager;
//! use taskroll::libs::task::{NewTask, RecurrencePattern};
//!
//! let db = Db::open_in_memory()?;
//! let nine = Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap();
//! let clock = FixedClock(nine);
//! let manager = TaskManager::new(&db.conn, &clock);
//!
//! let input = NewTask::new("Standup", nine, nine + Duration::minutes(15)).recurring(RecurrencePattern::Weekly);
//! let outcome = manager.create(1, input)?;
//! assert_eq!(outcome.task.duration_minutes, 15);
//! assert_eq!(outcome.generated.len(), 4);
//! assert!(outcome.issues.is_empty());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use super::calendar::{day_key, Clock};
use super::error::{TrackerError, TrackerResult};
use super::messages::Message;
use super::recurrence::{RecurrenceExpander, DEFAULT_HORIZON_DAYS};
use super::rollup::DailyRollup;
use super::task::{NewTask, OwnerId, Task, TaskFilter, TaskId, TaskPatch, TaskStatus};
use crate::db::tasks::{TaskQuery, Tasks};
use crate::msg_warning;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Follow-up step of a multi-step operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FollowUpStep {
    AttachToDay,
    ExpandRecurrence,
}

impl fmt::Display for FollowUpStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FollowUpStep::AttachToDay => f.write_str("attach to day"),
            FollowUpStep::ExpandRecurrence => f.write_str("expand recurrence"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpIssue {
    pub step: FollowUpStep,
    pub error: String,
}

/// Result of [`TaskManager::create`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOutcome {
    pub task: Task,
    /// Occurrences generated when the task is a recurring template.
    pub generated: Vec<Task>,
    pub issues: Vec<FollowUpIssue>,
}

pub struct TaskManager<'a> {
    conn: &'a Connection,
    clock: &'a dyn Clock,
    horizon_days: i64,
}

impl<'a> TaskManager<'a> {
    pub fn new(conn: &'a Connection, clock: &'a dyn Clock) -> Self {
        Self {
            conn,
            clock,
            horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }

    /// Overrides how far ahead recurring templates are expanded on creation
    /// and when a template's recurrence changes.
    pub fn with_horizon_days(mut self, days: i64) -> Self {
        self.horizon_days = days;
        self
    }

    fn rollup(&self) -> DailyRollup<'a> {
        DailyRollup::new(self.conn, self.clock)
    }

    pub fn create(&self, owner: OwnerId, input: NewTask) -> TrackerResult<CreateOutcome> {
        let draft = input.into_draft(owner)?;
        let task = Tasks::new(self.conn).insert(&draft, self.clock.now())?;

        let mut outcome = CreateOutcome {
            task,
            generated: Vec::new(),
            issues: Vec::new(),
        };

        if let Err(e) = self.rollup().attach(&outcome.task) {
            outcome.record(FollowUpStep::AttachToDay, e);
        }

        if outcome.task.is_template() {
            match RecurrenceExpander::new(self.conn, self.clock).expand_default(&outcome.task, self.horizon_days) {
                Ok(generated) => outcome.generated = generated,
                Err(e) => outcome.record(FollowUpStep::ExpandRecurrence, e),
            }
        }

        Ok(outcome)
    }

    pub fn get(&self, owner: OwnerId, id: TaskId) -> TrackerResult<Task> {
        Tasks::new(self.conn).find_one(owner, id)?.ok_or_else(TrackerError::task_not_found)
    }

    /// Tasks matching `filter`, ascending by scheduled start then id.
    pub fn list(&self, owner: OwnerId, filter: TaskFilter) -> TrackerResult<Vec<Task>> {
        Ok(Tasks::new(self.conn).find(&TaskQuery::with_filter(owner, filter))?)
    }

    /// Applies `patch`, moving the task between day rollups when its
    /// scheduled start changes calendar day.
    ///
    /// A template whose recurrence or schedule changed is expanded again over
    /// the horizon. Expansion failures are logged and do not undo the update.
    pub fn update(&self, owner: OwnerId, id: TaskId, patch: TaskPatch) -> TrackerResult<Task> {
        let mut task = self.get(owner, id)?;
        let old_day = day_key(task.scheduled_start);
        let old_series = (task.is_recurring, task.recurrence_pattern, task.scheduled_start, task.scheduled_end);
        patch.apply(&mut task)?;

        self.store(&task)?;
        let task = self.get(owner, id)?;
        let new_day = day_key(task.scheduled_start);

        let rollup = self.rollup();
        if new_day != old_day {
            rollup.detach(owner, id, old_day)?;
            rollup.attach(&task)?;
            rollup.resync(owner, old_day)?;
        }
        rollup.resync(owner, new_day)?;

        let series = (task.is_recurring, task.recurrence_pattern, task.scheduled_start, task.scheduled_end);
        if task.is_template() && series != old_series {
            if let Err(e) = RecurrenceExpander::new(self.conn, self.clock).expand_default(&task, self.horizon_days) {
                msg_warning!(Message::FollowUpFailed(FollowUpStep::ExpandRecurrence.to_string(), e.to_string()));
            }
        }

        Ok(task)
    }

    /// Removes the task and its reference from the day rollup.
    pub fn delete(&self, owner: OwnerId, id: TaskId) -> TrackerResult<Task> {
        let task = self.get(owner, id)?;
        let day = day_key(task.scheduled_start);

        let rollup = self.rollup();
        rollup.detach(owner, id, day)?;
        if Tasks::new(self.conn).delete(owner, id)? == 0 {
            return Err(TrackerError::task_not_found());
        }
        rollup.resync(owner, day)?;

        Ok(task)
    }

    /// Marks the task in progress from now. Completed and missed tasks
    /// cannot be started.
    pub fn start(&self, owner: OwnerId, id: TaskId) -> TrackerResult<Task> {
        let mut task = self.get(owner, id)?;
        if !task.status.can_transition_to(TaskStatus::InProgress) {
            return Err(TrackerError::InvalidStateTransition {
                from: task.status,
                to: TaskStatus::InProgress,
            });
        }

        task.status = TaskStatus::InProgress;
        task.actual_start = Some(self.clock.now());
        task.actual_end = None;
        task.refresh_actual_duration();
        self.store(&task)?;

        self.get(owner, id)
    }

    /// Completes a running task at now and records its actual duration.
    pub fn stop(&self, owner: OwnerId, id: TaskId) -> TrackerResult<Task> {
        let mut task = self.get(owner, id)?;
        if task.status != TaskStatus::InProgress {
            return Err(TrackerError::InvalidStateTransition {
                from: task.status,
                to: TaskStatus::Completed,
            });
        }

        let now = self.clock.now();
        if matches!(task.actual_start, Some(started) if now <= started) {
            return Err(TrackerError::validation(Message::ActualEndNotAfterStart));
        }
        task.status = TaskStatus::Completed;
        task.actual_end = Some(now);
        task.refresh_actual_duration();
        self.store(&task)?;
        self.rollup().resync(owner, day_key(task.scheduled_start))?;

        self.get(owner, id)
    }

    /// Marks every scheduled task whose window already ended as missed and
    /// resyncs the affected days. Returns the tasks that changed.
    pub fn sweep_missed(&self, owner: OwnerId) -> TrackerResult<Vec<Task>> {
        let now = self.clock.now();
        let query = TaskQuery {
            statuses: Some(vec![TaskStatus::Scheduled]),
            scheduled_end_before: Some(now),
            ..TaskQuery::for_owner(owner)
        };

        let tasks = Tasks::new(self.conn);
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let mut swept = tasks.find(&query)?;
        for task in swept.iter_mut() {
            task.status = TaskStatus::Missed;
            tasks.update(task, now)?;
            task.updated_at = now;
        }
        tx.commit()?;

        let days: BTreeSet<_> = swept.iter().map(|t| day_key(t.scheduled_start)).collect();
        let rollup = self.rollup();
        for day in days {
            rollup.resync(owner, day)?;
        }

        Ok(swept)
    }

    fn store(&self, task: &Task) -> TrackerResult<()> {
        if Tasks::new(self.conn).update(task, self.clock.now())? == 0 {
            return Err(TrackerError::task_not_found());
        }
        Ok(())
    }
}

impl CreateOutcome {
    fn record(&mut self, step: FollowUpStep, error: TrackerError) {
        msg_warning!(Message::FollowUpFailed(step.to_string(), error.to_string()));
        self.issues.push(FollowUpIssue {
            step,
            error: error.to_string(),
        });
    }
}
