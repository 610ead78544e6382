//! Task model: scheduled window, actual window, status and recurrence.
//!
//! A [`Task`] is always a persisted row. Input to the engine comes in as a
//! [`NewTask`] (user supplied) or a [`TaskPatch`] (partial update); both are
//! turned into a [`TaskDraft`], the complete set of columns minus identity,
//! before anything reaches the store.

use super::calendar::minutes_between;
use super::error::{TrackerError, TrackerResult};
use super::messages::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type OwnerId = i64;
pub type TaskId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Scheduled,
    InProgress,
    Completed,
    Missed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Scheduled => "scheduled",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Missed => "missed",
        }
    }

    /// `scheduled → in-progress → completed` and `scheduled → missed`.
    /// `completed` and `missed` are terminal. Staying put is always allowed.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (TaskStatus::Scheduled, TaskStatus::InProgress)
                | (TaskStatus::Scheduled, TaskStatus::Missed)
                | (TaskStatus::InProgress, TaskStatus::Completed)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Ok(TaskStatus::Scheduled),
            "in-progress" | "in_progress" | "inprogress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "missed" => Ok(TaskStatus::Missed),
            _ => Err(TrackerError::validation(Message::InvalidStatus(s.to_string()))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePattern {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

impl RecurrencePattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrencePattern::None => "none",
            RecurrencePattern::Daily => "daily",
            RecurrencePattern::Weekly => "weekly",
            RecurrencePattern::Monthly => "monthly",
        }
    }
}

impl fmt::Display for RecurrencePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecurrencePattern {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(RecurrencePattern::None),
            "daily" => Ok(RecurrencePattern::Daily),
            "weekly" => Ok(RecurrencePattern::Weekly),
            "monthly" => Ok(RecurrencePattern::Monthly),
            _ => Err(TrackerError::validation(Message::InvalidRecurrencePattern(s.to_string()))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderType {
    #[default]
    Notification,
    Call,
}

impl ReminderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderType::Notification => "notification",
            ReminderType::Call => "call",
        }
    }
}

impl FromStr for ReminderType {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "notification" => Ok(ReminderType::Notification),
            "call" => Ok(ReminderType::Call),
            _ => Err(TrackerError::validation(Message::InvalidReminderType(s.to_string()))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub owner: OwnerId,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub actual_start: Option<DateTime<Utc>>,
    pub actual_end: Option<DateTime<Utc>>,
    pub duration_minutes: i64,
    pub actual_duration_minutes: Option<i64>,
    pub status: TaskStatus,
    pub is_recurring: bool,
    pub recurrence_pattern: RecurrencePattern,
    /// Template this task was generated from; `None` for user-created tasks.
    pub template_id: Option<TaskId>,
    pub notes: Option<String>,
    pub reminder_type: Option<ReminderType>,
    pub productivity_score: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// True for a user-created task that generates occurrences.
    pub fn is_template(&self) -> bool {
        self.is_recurring && self.recurrence_pattern != RecurrencePattern::None && self.template_id.is_none()
    }

    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            owner: self.owner,
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            scheduled_start: self.scheduled_start,
            scheduled_end: self.scheduled_end,
            actual_start: self.actual_start,
            actual_end: self.actual_end,
            duration_minutes: self.duration_minutes,
            actual_duration_minutes: self.actual_duration_minutes,
            status: self.status,
            is_recurring: self.is_recurring,
            recurrence_pattern: self.recurrence_pattern,
            template_id: self.template_id,
            notes: self.notes.clone(),
            reminder_type: self.reminder_type,
            productivity_score: self.productivity_score,
        }
    }

    /// Recomputes `actual_duration_minutes` from the actual window.
    pub fn refresh_actual_duration(&mut self) {
        self.actual_duration_minutes = match (self.actual_start, self.actual_end) {
            (Some(start), Some(end)) => Some(minutes_between(start, end)),
            _ => None,
        };
    }
}

/// Every stored column of a task except identity and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDraft {
    pub owner: OwnerId,
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub actual_start: Option<DateTime<Utc>>,
    pub actual_end: Option<DateTime<Utc>>,
    pub duration_minutes: i64,
    pub actual_duration_minutes: Option<i64>,
    pub status: TaskStatus,
    pub is_recurring: bool,
    pub recurrence_pattern: RecurrencePattern,
    pub template_id: Option<TaskId>,
    pub notes: Option<String>,
    pub reminder_type: Option<ReminderType>,
    pub productivity_score: Option<f64>,
}

/// User input for creating a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Option<String>,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    /// Overrides the duration derived from the scheduled window.
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurrence_pattern: RecurrencePattern,
    pub notes: Option<String>,
    pub reminder_type: Option<ReminderType>,
    pub productivity_score: Option<f64>,
}

impl NewTask {
    pub fn new(title: &str, scheduled_start: DateTime<Utc>, scheduled_end: DateTime<Utc>) -> Self {
        Self {
            title: title.to_string(),
            scheduled_start,
            scheduled_end,
            reminder_type: Some(ReminderType::Notification),
            ..Default::default()
        }
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn recurring(mut self, pattern: RecurrencePattern) -> Self {
        self.is_recurring = pattern != RecurrencePattern::None;
        self.recurrence_pattern = pattern;
        self
    }

    pub fn score(mut self, score: f64) -> Self {
        self.productivity_score = Some(score);
        self
    }

    /// Validates the input and produces the draft to persist for `owner`.
    pub fn into_draft(self, owner: OwnerId) -> TrackerResult<TaskDraft> {
        if self.title.trim().is_empty() {
            return Err(TrackerError::validation(Message::TitleRequired));
        }
        validate_window(self.scheduled_start, self.scheduled_end, Message::ScheduledEndNotAfterStart)?;
        if matches!(self.duration_minutes, Some(minutes) if minutes < 0) {
            return Err(TrackerError::validation(Message::NegativeDuration));
        }
        let duration_minutes = self
            .duration_minutes
            .unwrap_or_else(|| minutes_between(self.scheduled_start, self.scheduled_end));

        Ok(TaskDraft {
            owner,
            title: self.title.trim().to_string(),
            description: self.description,
            category: self.category.filter(|c| !c.trim().is_empty()),
            scheduled_start: self.scheduled_start,
            scheduled_end: self.scheduled_end,
            actual_start: None,
            actual_end: None,
            duration_minutes,
            actual_duration_minutes: None,
            status: TaskStatus::Scheduled,
            is_recurring: self.is_recurring,
            recurrence_pattern: if self.is_recurring { self.recurrence_pattern } else { RecurrencePattern::None },
            template_id: None,
            notes: self.notes,
            reminder_type: self.reminder_type,
            productivity_score: self.productivity_score,
        })
    }
}

/// Partial update; `None` leaves a field untouched. Nullable fields use a
/// nested `Option` so they can be cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Option<String>>,
    pub scheduled_start: Option<DateTime<Utc>>,
    pub scheduled_end: Option<DateTime<Utc>>,
    pub actual_start: Option<DateTime<Utc>>,
    pub actual_end: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub status: Option<TaskStatus>,
    pub is_recurring: Option<bool>,
    pub recurrence_pattern: Option<RecurrencePattern>,
    pub notes: Option<Option<String>>,
    pub reminder_type: Option<Option<ReminderType>>,
    pub productivity_score: Option<Option<f64>>,
}

impl TaskPatch {
    pub fn reschedule(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            scheduled_start: Some(start),
            scheduled_end: Some(end),
            ..Default::default()
        }
    }

    pub fn touches_schedule(&self) -> bool {
        self.scheduled_start.is_some() || self.scheduled_end.is_some()
    }

    /// Applies the patch to `task`, validating every window it modifies.
    ///
    /// When the scheduled window moves and no explicit duration is given,
    /// `duration_minutes` is derived again from the new window.
    pub fn apply(self, task: &mut Task) -> TrackerResult<()> {
        let scheduled_start = self.scheduled_start.unwrap_or(task.scheduled_start);
        let scheduled_end = self.scheduled_end.unwrap_or(task.scheduled_end);
        if self.touches_schedule() {
            validate_window(scheduled_start, scheduled_end, Message::ScheduledEndNotAfterStart)?;
        }

        let actual_start = self.actual_start.or(task.actual_start);
        let actual_end = self.actual_end.or(task.actual_end);
        if self.actual_start.is_some() || self.actual_end.is_some() {
            if let (Some(start), Some(end)) = (actual_start, actual_end) {
                validate_window(start, end, Message::ActualEndNotAfterStart)?;
            }
        }

        if let Some(status) = self.status {
            if !task.status.can_transition_to(status) {
                return Err(TrackerError::InvalidStateTransition { from: task.status, to: status });
            }
        }
        if matches!(self.duration_minutes, Some(minutes) if minutes < 0) {
            return Err(TrackerError::validation(Message::NegativeDuration));
        }
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(TrackerError::validation(Message::TitleRequired));
            }
        }

        let schedule_moved = scheduled_start != task.scheduled_start || scheduled_end != task.scheduled_end;
        task.scheduled_start = scheduled_start;
        task.scheduled_end = scheduled_end;
        match self.duration_minutes {
            Some(minutes) => task.duration_minutes = minutes,
            None if schedule_moved => task.duration_minutes = minutes_between(scheduled_start, scheduled_end),
            None => {}
        }

        task.actual_start = actual_start;
        task.actual_end = actual_end;
        task.refresh_actual_duration();

        if let Some(title) = self.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(category) = self.category {
            task.category = category.filter(|c| !c.trim().is_empty());
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(is_recurring) = self.is_recurring {
            task.is_recurring = is_recurring;
        }
        if let Some(pattern) = self.recurrence_pattern {
            task.recurrence_pattern = pattern;
        }
        if !task.is_recurring {
            task.recurrence_pattern = RecurrencePattern::None;
        }
        if let Some(notes) = self.notes {
            task.notes = notes;
        }
        if let Some(reminder_type) = self.reminder_type {
            task.reminder_type = reminder_type;
        }
        if let Some(score) = self.productivity_score {
            task.productivity_score = score;
        }

        Ok(())
    }
}

/// Filters for listing tasks; unset fields do not restrict the result.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub category: Option<String>,
    pub is_recurring: Option<bool>,
    pub scheduled_from: Option<DateTime<Utc>>,
    pub scheduled_to: Option<DateTime<Utc>>,
}

fn validate_window(start: DateTime<Utc>, end: DateTime<Utc>, msg: Message) -> TrackerResult<()> {
    if end <= start {
        return Err(TrackerError::validation(msg));
    }
    Ok(())
}
