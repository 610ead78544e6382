//! Expansion of recurring templates into dated occurrences.
//!
//! A template is a user-created task with `is_recurring` set and a pattern
//! other than `none`. Occurrence *k* starts at the template's start plus *k*
//! pattern steps, always counted from the template so monthly stepping never
//! drifts; monthly steps clamp to the last day of shorter months. Every
//! occurrence keeps the template's scheduled duration.
//!
//! An occurrence is skipped when a task with the same owner, title,
//! scheduled start and pattern is already recurring in the store or earlier
//! in the same batch, so re-running an expansion creates nothing new. The
//! template itself sits at step zero and is therefore never duplicated.

use super::calendar::{add_months_clamped, day_key, Clock};
use super::error::TrackerResult;
use super::rollup::DailyRollup;
use super::task::{OwnerId, RecurrencePattern, Task, TaskDraft, TaskFilter, TaskStatus};
use crate::db::tasks::{OccurrenceKey, TaskQuery, Tasks};
use crate::libs::messages::Message;
use crate::msg_debug;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::collections::{BTreeSet, HashSet};

/// Default horizon for pre-generated occurrences.
pub const DEFAULT_HORIZON_DAYS: i64 = 30;

/// Default retention for finished recurring tasks.
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

/// Scheduled window of step `k` of `template`, or `None` when the pattern
/// does not recur or the date is out of range.
pub fn occurrence_window(template: &Task, k: u32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = match template.recurrence_pattern {
        RecurrencePattern::None => return None,
        RecurrencePattern::Daily => template.scheduled_start.checked_add_signed(Duration::days(k as i64))?,
        RecurrencePattern::Weekly => template.scheduled_start.checked_add_signed(Duration::weeks(k as i64))?,
        RecurrencePattern::Monthly => add_months_clamped(template.scheduled_start, k)?,
    };
    let length = template.scheduled_end - template.scheduled_start;
    Some((start, start + length))
}

pub struct RecurrenceExpander<'a> {
    conn: &'a Connection,
    clock: &'a dyn Clock,
}

impl<'a> RecurrenceExpander<'a> {
    pub fn new(conn: &'a Connection, clock: &'a dyn Clock) -> Self {
        Self { conn, clock }
    }

    /// Drafts of the occurrences of `template` starting in `[from, horizon_end]`
    /// that do not exist yet.
    pub fn plan(&self, template: &Task, from: DateTime<Utc>, horizon_end: DateTime<Utc>) -> TrackerResult<Vec<TaskDraft>> {
        let mut seen = HashSet::new();
        self.plan_into(template, from, horizon_end, &mut seen)
    }

    fn plan_into(
        &self,
        template: &Task,
        from: DateTime<Utc>,
        horizon_end: DateTime<Utc>,
        seen: &mut HashSet<OccurrenceKey>,
    ) -> TrackerResult<Vec<TaskDraft>> {
        if !template.is_recurring || template.recurrence_pattern == RecurrencePattern::None {
            return Ok(Vec::new());
        }

        let tasks = Tasks::new(self.conn);
        let mut drafts = Vec::new();
        let mut k = 0u32;

        while let Some((start, end)) = occurrence_window(template, k) {
            if start > horizon_end {
                break;
            }
            k += 1;
            if start < from {
                continue;
            }

            let key = OccurrenceKey {
                owner: template.owner,
                title: template.title.clone(),
                scheduled_start: start,
                pattern: template.recurrence_pattern,
            };
            if seen.contains(&key) || tasks.occurrence_exists(&key)? {
                continue;
            }
            seen.insert(key);
            drafts.push(occurrence_draft(template, start, end));
        }

        Ok(drafts)
    }

    /// Creates the missing occurrences of `template` from its own start up to
    /// `horizon_end` and links them into their days' rollups.
    pub fn expand(&self, template: &Task, horizon_end: DateTime<Utc>) -> TrackerResult<Vec<Task>> {
        let drafts = self.plan(template, template.scheduled_start, horizon_end)?;
        self.materialize(drafts)
    }

    /// Expands `template` over the default horizon from now.
    pub fn expand_default(&self, template: &Task, horizon_days: i64) -> TrackerResult<Vec<Task>> {
        self.expand(template, self.clock.now() + Duration::days(horizon_days))
    }

    /// Expands every template of `owner` that starts no later than `to`,
    /// creating occurrences in `[from, to]`. Earlier steps are not backfilled.
    pub fn process_recurring(&self, owner: OwnerId, from: DateTime<Utc>, to: DateTime<Utc>) -> TrackerResult<Vec<Task>> {
        let query = TaskQuery {
            templates_only: true,
            ..TaskQuery::with_filter(
                owner,
                TaskFilter {
                    scheduled_to: Some(to),
                    ..Default::default()
                },
            )
        };
        let templates = Tasks::new(self.conn).find(&query)?;

        let mut seen = HashSet::new();
        let mut drafts = Vec::new();
        for template in &templates {
            drafts.extend(self.plan_into(template, from, to, &mut seen)?);
        }

        let created = self.materialize(drafts)?;
        msg_debug!(Message::OccurrencesGenerated(created.len()));
        Ok(created)
    }

    /// Deletes recurring tasks of `owner` that finished (completed or missed)
    /// and started more than `days_to_keep` days ago, then brings the
    /// affected rollups back in line. Returns the number of deleted tasks.
    pub fn cleanup_old_recurring(&self, owner: OwnerId, days_to_keep: i64) -> TrackerResult<usize> {
        let cutoff = self.clock.now() - Duration::days(days_to_keep);
        let query = TaskQuery {
            statuses: Some(vec![TaskStatus::Completed, TaskStatus::Missed]),
            ..TaskQuery::with_filter(
                owner,
                TaskFilter {
                    is_recurring: Some(true),
                    scheduled_to: Some(cutoff - Duration::milliseconds(1)),
                    ..Default::default()
                },
            )
        };

        let tasks = Tasks::new(self.conn);
        let rollup = DailyRollup::new(self.conn, self.clock);
        let mut days = BTreeSet::new();
        let mut removed = 0;

        for task in tasks.find(&query)? {
            let day = day_key(task.scheduled_start);
            rollup.detach(owner, task.id, day)?;
            removed += tasks.delete(owner, task.id)?;
            days.insert(day);
        }
        self.resync_days(owner, &days)?;

        msg_debug!(Message::RecurringCleanedUp(removed));
        Ok(removed)
    }

    /// Inserts `drafts` in one transaction, then attaches each new task to its
    /// day and resyncs the touched days.
    fn materialize(&self, drafts: Vec<TaskDraft>) -> TrackerResult<Vec<Task>> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        let now = self.clock.now();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let tasks = Tasks::new(self.conn);
        let mut created = Vec::with_capacity(drafts.len());
        for draft in &drafts {
            created.push(tasks.insert(draft, now)?);
        }
        tx.commit()?;

        let rollup = DailyRollup::new(self.conn, self.clock);
        let mut days = BTreeSet::new();
        for task in &created {
            rollup.attach(task)?;
            days.insert((task.owner, day_key(task.scheduled_start)));
        }
        for (owner, day) in days {
            rollup.resync(owner, day)?;
        }

        Ok(created)
    }

    fn resync_days(&self, owner: OwnerId, days: &BTreeSet<NaiveDate>) -> TrackerResult<()> {
        let rollup = DailyRollup::new(self.conn, self.clock);
        for day in days {
            rollup.resync(owner, *day)?;
        }
        Ok(())
    }
}

fn occurrence_draft(template: &Task, start: DateTime<Utc>, end: DateTime<Utc>) -> TaskDraft {
    TaskDraft {
        scheduled_start: start,
        scheduled_end: end,
        actual_start: None,
        actual_end: None,
        actual_duration_minutes: None,
        status: TaskStatus::Scheduled,
        is_recurring: true,
        template_id: Some(template.id),
        ..template.to_draft()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn template(pattern: RecurrencePattern, start: DateTime<Utc>, minutes: i64) -> Task {
        Task {
            id: 1,
            owner: 1,
            title: "Standup".to_string(),
            description: String::new(),
            category: None,
            scheduled_start: start,
            scheduled_end: start + Duration::minutes(minutes),
            actual_start: None,
            actual_end: None,
            duration_minutes: minutes,
            actual_duration_minutes: None,
            status: TaskStatus::Scheduled,
            is_recurring: true,
            recurrence_pattern: pattern,
            template_id: None,
            notes: None,
            reminder_type: None,
            productivity_score: None,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn weekly_steps_keep_duration() {
        let start = Utc.with_ymd_and_hms(2025, 2, 3, 9, 0, 0).unwrap();
        let (s, e) = occurrence_window(&template(RecurrencePattern::Weekly, start, 15), 2).unwrap();
        assert_eq!(s, Utc.with_ymd_and_hms(2025, 2, 17, 9, 0, 0).unwrap());
        assert_eq!(e - s, Duration::minutes(15));
    }

    #[test]
    fn monthly_steps_count_from_the_template() {
        let start = Utc.with_ymd_and_hms(2025, 1, 31, 18, 0, 0).unwrap();
        let t = template(RecurrencePattern::Monthly, start, 60);
        assert_eq!(occurrence_window(&t, 1).unwrap().0, Utc.with_ymd_and_hms(2025, 2, 28, 18, 0, 0).unwrap());
        assert_eq!(occurrence_window(&t, 2).unwrap().0, Utc.with_ymd_and_hms(2025, 3, 31, 18, 0, 0).unwrap());
    }

    #[test]
    fn non_recurring_has_no_steps() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        assert!(occurrence_window(&template(RecurrencePattern::None, start, 30), 0).is_none());
    }
}
