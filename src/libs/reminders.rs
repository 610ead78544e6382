//! Selection of tasks whose reminders are due. Delivery happens elsewhere.

use super::calendar::Clock;
use super::error::TrackerResult;
use super::messages::Message;
use super::task::{OwnerId, ReminderType, TaskFilter, TaskId, TaskStatus};
use crate::db::tasks::{TaskQuery, Tasks};
use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LOOKAHEAD_MINUTES: i64 = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub task_id: TaskId,
    pub title: String,
    pub scheduled_start: DateTime<Utc>,
    pub reminder_type: ReminderType,
    pub message: String,
}

pub struct ReminderSelector<'a> {
    conn: &'a Connection,
    clock: &'a dyn Clock,
}

impl<'a> ReminderSelector<'a> {
    pub fn new(conn: &'a Connection, clock: &'a dyn Clock) -> Self {
        Self { conn, clock }
    }

    /// Scheduled or running tasks with a reminder that start within the next
    /// `lookahead_minutes`.
    pub fn due(&self, owner: OwnerId, lookahead_minutes: i64) -> TrackerResult<Vec<Reminder>> {
        let now = self.clock.now();
        let query = TaskQuery {
            statuses: Some(vec![TaskStatus::Scheduled, TaskStatus::InProgress]),
            require_reminder: true,
            ..TaskQuery::with_filter(
                owner,
                TaskFilter {
                    scheduled_from: Some(now),
                    scheduled_to: Some(now + Duration::minutes(lookahead_minutes)),
                    ..Default::default()
                },
            )
        };

        let reminders = Tasks::new(self.conn)
            .find(&query)?
            .into_iter()
            .filter_map(|task| {
                let reminder_type = task.reminder_type?;
                let time = task.scheduled_start.format("%H:%M UTC").to_string();
                Some(Reminder {
                    task_id: task.id,
                    message: Message::ReminderText(task.title.clone(), time).to_string(),
                    title: task.title,
                    scheduled_start: task.scheduled_start,
                    reminder_type,
                })
            })
            .collect();
        Ok(reminders)
    }
}
