//! Weekly and monthly productivity summaries.
//!
//! A summary covers the half-open period `[period_start, period_end)`:
//! an ISO week starting on Monday, or a calendar month. Productive time is
//! the actual duration of completed tasks. Summaries are stored one per
//! `(owner, kind, period_start)`; building the same period again replaces
//! the stored row.

use super::calendar::{day_start, month_start, week_start, Clock};
use super::error::{TrackerError, TrackerResult};
use super::messages::Message;
use super::stats::average_score;
use super::task::{OwnerId, Task, TaskStatus};
use crate::db::summaries::Summaries;
use crate::db::tasks::{TaskQuery, Tasks};
use crate::msg_debug;
use chrono::{DateTime, Duration, Months, NaiveDate, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Category name used for tasks without one.
pub const UNCATEGORIZED: &str = "uncategorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryKind {
    Weekly,
    Monthly,
}

impl SummaryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryKind::Weekly => "weekly",
            SummaryKind::Monthly => "monthly",
        }
    }

    /// Half-open period of this kind containing `day`.
    pub fn period(&self, day: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            SummaryKind::Weekly => {
                let start = week_start(day);
                (start, start + Duration::days(7))
            }
            SummaryKind::Monthly => {
                let start = month_start(day);
                (start, start.checked_add_months(Months::new(1)).unwrap_or(NaiveDate::MAX))
            }
        }
    }
}

impl fmt::Display for SummaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SummaryKind {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(SummaryKind::Weekly),
            "monthly" => Ok(SummaryKind::Monthly),
            _ => Err(TrackerError::validation(Message::InvalidSummaryKind(s.to_string()))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub category: String,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub productive_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivitySummary {
    pub id: i64,
    pub owner: OwnerId,
    pub kind: SummaryKind,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    /// Minutes.
    pub total_productive_time: i64,
    pub average_productivity: f64,
    pub most_productive_category: Option<String>,
    pub least_productive_category: Option<String>,
    pub category_breakdown: Vec<CategoryBreakdown>,
    pub updated_at: DateTime<Utc>,
}

impl ProductivitySummary {
    /// Summarizes `tasks` for the given period. The result is not stored;
    /// `id` is 0 until it is.
    pub fn from_tasks(
        owner: OwnerId,
        kind: SummaryKind,
        (period_start, period_end): (NaiveDate, NaiveDate),
        tasks: &[Task],
        now: DateTime<Utc>,
    ) -> Self {
        let mut by_category: BTreeMap<String, CategoryBreakdown> = BTreeMap::new();
        for task in tasks {
            let name = task.category.clone().unwrap_or_else(|| UNCATEGORIZED.to_string());
            let entry = by_category.entry(name.clone()).or_insert_with(|| CategoryBreakdown {
                category: name,
                total_tasks: 0,
                completed_tasks: 0,
                productive_minutes: 0,
            });
            entry.total_tasks += 1;
            if task.status == TaskStatus::Completed {
                entry.completed_tasks += 1;
                entry.productive_minutes += task.actual_duration_minutes.unwrap_or(0);
            }
        }
        let category_breakdown: Vec<CategoryBreakdown> = by_category.into_values().collect();

        // Breakdown is sorted by name, so the first maximum/minimum wins ties.
        let most = category_breakdown
            .iter()
            .fold(None::<&CategoryBreakdown>, |best, c| match best {
                Some(b) if b.productive_minutes >= c.productive_minutes => Some(b),
                _ => Some(c),
            })
            .map(|c| c.category.clone());
        let least = category_breakdown
            .iter()
            .fold(None::<&CategoryBreakdown>, |worst, c| match worst {
                Some(w) if w.productive_minutes <= c.productive_minutes => Some(w),
                _ => Some(c),
            })
            .map(|c| c.category.clone());

        ProductivitySummary {
            id: 0,
            owner,
            kind,
            period_start,
            period_end,
            total_productive_time: category_breakdown.iter().map(|c| c.productive_minutes).sum(),
            average_productivity: average_score(tasks),
            most_productive_category: most,
            least_productive_category: least,
            category_breakdown,
            updated_at: now,
        }
    }
}

pub struct ProductivitySummaries<'a> {
    conn: &'a Connection,
    clock: &'a dyn Clock,
}

impl<'a> ProductivitySummaries<'a> {
    pub fn new(conn: &'a Connection, clock: &'a dyn Clock) -> Self {
        Self { conn, clock }
    }

    /// Builds and stores the `kind` summary of the period containing `anchor`.
    pub fn build(&self, owner: OwnerId, kind: SummaryKind, anchor: NaiveDate) -> TrackerResult<ProductivitySummary> {
        let (period_start, period_end) = kind.period(anchor);
        let query = TaskQuery::scheduled_within(owner, day_start(period_start), day_start(period_end));
        let tasks = Tasks::new(self.conn).find(&query)?;

        let now = self.clock.now();
        let summary = ProductivitySummary::from_tasks(owner, kind, (period_start, period_end), &tasks, now);
        let stored = Summaries::new(self.conn).upsert(&summary, now)?;

        msg_debug!(Message::ProductivitySummaryStored(kind.to_string(), period_start.to_string()));
        Ok(stored)
    }

    pub fn find(&self, owner: OwnerId, kind: SummaryKind, anchor: NaiveDate) -> TrackerResult<Option<ProductivitySummary>> {
        let (period_start, _) = kind.period(anchor);
        Ok(Summaries::new(self.conn).find_one(owner, kind, period_start)?)
    }

    pub fn list(&self, owner: OwnerId, kind: SummaryKind) -> TrackerResult<Vec<ProductivitySummary>> {
        Ok(Summaries::new(self.conn).list(owner, kind)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::task::RecurrencePattern;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(category: Option<&str>, status: TaskStatus, minutes: Option<i64>, score: Option<f64>) -> Task {
        let start = Utc.with_ymd_and_hms(2025, 5, 13, 9, 0, 0).unwrap();
        Task {
            id: 1,
            owner: 1,
            title: "t".to_string(),
            description: String::new(),
            category: category.map(str::to_string),
            scheduled_start: start,
            scheduled_end: start + Duration::hours(1),
            actual_start: None,
            actual_end: None,
            duration_minutes: 60,
            actual_duration_minutes: minutes,
            status,
            is_recurring: false,
            recurrence_pattern: RecurrencePattern::None,
            template_id: None,
            notes: None,
            reminder_type: None,
            productivity_score: score,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn periods_are_half_open() {
        assert_eq!(SummaryKind::Weekly.period(day(2025, 5, 15)), (day(2025, 5, 12), day(2025, 5, 19)));
        assert_eq!(SummaryKind::Monthly.period(day(2025, 12, 31)), (day(2025, 12, 1), day(2026, 1, 1)));
    }

    #[test]
    fn breakdown_picks_extremes_by_minutes() {
        let tasks = vec![
            task(Some("work"), TaskStatus::Completed, Some(90), Some(8.0)),
            task(Some("work"), TaskStatus::Missed, None, None),
            task(Some("health"), TaskStatus::Completed, Some(30), Some(6.0)),
            task(None, TaskStatus::Completed, Some(30), None),
        ];
        let now = Utc.with_ymd_and_hms(2025, 5, 19, 0, 0, 0).unwrap();
        let s = ProductivitySummary::from_tasks(1, SummaryKind::Weekly, SummaryKind::Weekly.period(day(2025, 5, 13)), &tasks, now);

        assert_eq!(s.total_productive_time, 150);
        assert_eq!(s.average_productivity, 7.0);
        assert_eq!(s.most_productive_category.as_deref(), Some("work"));
        // health and uncategorized tie at 30; ascending name wins.
        assert_eq!(s.least_productive_category.as_deref(), Some("health"));
        let work = s.category_breakdown.iter().find(|c| c.category == "work").unwrap();
        assert_eq!((work.total_tasks, work.completed_tasks, work.productive_minutes), (2, 1, 90));
    }

    #[test]
    fn empty_period_has_no_extremes() {
        let now = Utc.with_ymd_and_hms(2025, 5, 19, 0, 0, 0).unwrap();
        let s = ProductivitySummary::from_tasks(1, SummaryKind::Monthly, SummaryKind::Monthly.period(day(2025, 5, 1)), &[], now);
        assert_eq!(s.total_productive_time, 0);
        assert_eq!(s.average_productivity, 0.0);
        assert!(s.most_productive_category.is_none());
        assert!(s.category_breakdown.is_empty());
    }

    #[test]
    fn kind_parses_weekly_and_monthly() {
        assert_eq!("Monthly".parse::<SummaryKind>().unwrap(), SummaryKind::Monthly);
        let err = "daily".parse::<SummaryKind>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid summary type 'daily', expected weekly or monthly");
    }
}
