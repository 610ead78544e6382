//! Period statistics over tasks, daily rollups and time entries.
//!
//! Every rate is rounded to one decimal and is `0` whenever its divisor is
//! zero. Grouped results come back in ascending key order, except the
//! category breakdown which lists the largest groups first.

use super::calendar::{day_key, day_start, percent, round1, round2, Clock};
use super::error::{TrackerError, TrackerResult};
use super::messages::Message;
use super::task::{OwnerId, Task, TaskFilter, TaskStatus};
use crate::db::daily_activities::{DailyActivities, DateTotals};
use crate::db::tasks::{TaskQuery, Tasks};
use crate::db::time_entries::{TimeEntries, TimeEntry};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_TRENDS_DAYS: u32 = 30;
pub const DEFAULT_HEATMAP_DAYS: i64 = 365;

const NO_PROJECT: &str = "No Project";
const OTHER_CATEGORY: &str = "other";

/// Named reporting period ending now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Since midnight today.
    Day,
    /// The last 7 days.
    #[default]
    Week,
    /// The last calendar month.
    Month,
    /// The last calendar year.
    Year,
}

impl Period {
    pub fn range(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = match self {
            Period::Day => day_start(day_key(now)),
            Period::Week => now - Duration::days(7),
            Period::Month => now.checked_sub_months(Months::new(1)).unwrap_or(now),
            Period::Year => now.checked_sub_months(Months::new(12)).unwrap_or(now),
        };
        (start, now)
    }
}

impl FromStr for Period {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            _ => Err(TrackerError::validation(Message::InvalidPeriod(s.to_string()))),
        }
    }
}

/// Grouping key of [`StatisticsAggregator::grouped_report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Day,
    Week,
    Month,
    Project,
    Category,
}

impl GroupBy {
    /// Bucket key of `entry` under this grouping.
    pub fn key(&self, entry: &TimeEntry) -> String {
        match self {
            GroupBy::Day => entry.start_time.format("%Y-%m-%d").to_string(),
            GroupBy::Week => {
                let week = entry.start_time.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            GroupBy::Month => entry.start_time.format("%Y-%m").to_string(),
            GroupBy::Project => entry.project.clone().unwrap_or_else(|| NO_PROJECT.to_string()),
            GroupBy::Category => entry.category.clone().unwrap_or_else(|| OTHER_CATEGORY.to_string()),
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GroupBy::Day => "day",
            GroupBy::Week => "week",
            GroupBy::Month => "month",
            GroupBy::Project => "project",
            GroupBy::Category => "category",
        };
        f.write_str(name)
    }
}

impl FromStr for GroupBy {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" => Ok(GroupBy::Day),
            "week" => Ok(GroupBy::Week),
            "month" => Ok(GroupBy::Month),
            "project" => Ok(GroupBy::Project),
            "category" => Ok(GroupBy::Category),
            _ => Err(TrackerError::validation(Message::InvalidGroupBy(s.to_string()))),
        }
    }
}

/// Data the heatmap is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "camelCase")]
pub enum HeatmapSource {
    #[default]
    TimeEntries,
    /// Actual minutes of completed tasks, keyed by scheduled day.
    Tasks,
}

/// Heatmap intensity for `minutes` of activity in one day.
pub fn intensity(minutes: i64) -> u8 {
    let hours = minutes as f64 / 60.0;
    if hours < 1.0 {
        1
    } else if hours < 3.0 {
        2
    } else if hours < 5.0 {
        3
    } else if hours < 8.0 {
        4
    } else {
        5
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub in_progress_tasks: i64,
    pub missed_tasks: i64,
    pub scheduled_tasks: i64,
    pub completion_rate: f64,
    pub total_scheduled_minutes: i64,
    pub total_actual_minutes: i64,
    pub efficiency: f64,
    pub avg_productivity_score: f64,
    pub daily_breakdown: Vec<DateTotals>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStats {
    pub category: Option<String>,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub completion_rate: f64,
    pub total_scheduled_minutes: i64,
    pub total_actual_minutes: i64,
    pub avg_productivity_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub total_effective_minutes: i64,
    /// Percentage of the day's tasks that were completed.
    pub completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatmapCell {
    pub date: NaiveDate,
    pub minutes: i64,
    pub hours: f64,
    pub intensity: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupTotal {
    pub key: String,
    pub minutes: i64,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedReport {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub group_by: GroupBy,
    pub total_minutes: i64,
    pub total_hours: f64,
    pub groups: Vec<GroupTotal>,
}

pub struct StatisticsAggregator<'a> {
    conn: &'a Connection,
    clock: &'a dyn Clock,
}

impl<'a> StatisticsAggregator<'a> {
    pub fn new(conn: &'a Connection, clock: &'a dyn Clock) -> Self {
        Self { conn, clock }
    }

    /// Counts, minutes and rates over tasks scheduled in `[start, end]`, plus
    /// the rollup totals of every day in that range.
    pub fn summary_for_period(&self, owner: OwnerId, start: DateTime<Utc>, end: DateTime<Utc>) -> TrackerResult<PeriodSummary> {
        check_range(start, end)?;
        let tasks = Tasks::new(self.conn).find(&TaskQuery::scheduled_between(owner, start, end))?;
        let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count() as i64;

        let total_tasks = tasks.len() as i64;
        let completed_tasks = count(TaskStatus::Completed);
        let total_scheduled_minutes: i64 = tasks.iter().map(|t| t.duration_minutes).sum();
        let total_actual_minutes: i64 = tasks.iter().filter_map(|t| t.actual_duration_minutes).sum();
        let daily_breakdown = DailyActivities::new(self.conn).aggregate_by_date(owner, day_key(start), day_key(end))?;

        Ok(PeriodSummary {
            start,
            end,
            total_tasks,
            completed_tasks,
            in_progress_tasks: count(TaskStatus::InProgress),
            missed_tasks: count(TaskStatus::Missed),
            scheduled_tasks: count(TaskStatus::Scheduled),
            completion_rate: round1(percent(completed_tasks as f64, total_tasks as f64)),
            total_scheduled_minutes,
            total_actual_minutes,
            efficiency: round1(percent(total_actual_minutes as f64, total_scheduled_minutes as f64)),
            avg_productivity_score: average_score(&tasks),
            daily_breakdown,
        })
    }

    /// [`summary_for_period`](Self::summary_for_period) over a named period ending now.
    pub fn summary_for(&self, owner: OwnerId, period: Period) -> TrackerResult<PeriodSummary> {
        let (start, end) = period.range(self.clock.now());
        self.summary_for_period(owner, start, end)
    }

    /// Per-category totals, optionally limited to tasks scheduled in `range`.
    pub fn category_breakdown(
        &self,
        owner: OwnerId,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> TrackerResult<Vec<CategoryStats>> {
        let (from, to) = range.unwrap_or((DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC));
        check_range(from, to)?;

        let stats = Tasks::new(self.conn)
            .category_totals(owner, from, to)?
            .into_iter()
            .map(|totals| CategoryStats {
                completion_rate: round1(percent(totals.completed_tasks as f64, totals.total_tasks as f64)),
                avg_productivity_score: round1(totals.avg_productivity_score.unwrap_or(0.0)),
                category: totals.category,
                total_tasks: totals.total_tasks,
                completed_tasks: totals.completed_tasks,
                total_scheduled_minutes: totals.scheduled_minutes,
                total_actual_minutes: totals.actual_minutes,
            })
            .collect();
        Ok(stats)
    }

    /// Rollup totals of each of the trailing `days` days, oldest first.
    pub fn trends(&self, owner: OwnerId, days: u32) -> TrackerResult<Vec<TrendPoint>> {
        let today = day_key(self.clock.now());
        let from = today - Duration::days(days as i64);

        let points = DailyActivities::new(self.conn)
            .aggregate_by_date(owner, from, today)?
            .into_iter()
            .map(|totals| TrendPoint {
                date: totals.date,
                total_tasks: totals.total_tasks,
                completed_tasks: totals.completed_tasks,
                total_effective_minutes: totals.total_effective_minutes,
                completion_rate: round1(percent(totals.completed_tasks as f64, totals.total_tasks as f64)),
            })
            .collect();
        Ok(points)
    }

    /// Minutes of activity per day with an intensity level, defaulting to
    /// the last year when no range is given.
    pub fn heatmap(
        &self,
        owner: OwnerId,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
        source: HeatmapSource,
    ) -> TrackerResult<Vec<HeatmapCell>> {
        let (from, to) = range.unwrap_or_else(|| {
            let now = self.clock.now();
            (now - Duration::days(DEFAULT_HEATMAP_DAYS), now)
        });
        check_range(from, to)?;

        let mut minutes_by_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
        match source {
            HeatmapSource::TimeEntries => {
                for entry in TimeEntries::new(self.conn).find_completed(owner, from, to)? {
                    *minutes_by_day.entry(day_key(entry.start_time)).or_default() += entry.duration.unwrap_or(0);
                }
            }
            HeatmapSource::Tasks => {
                let query = TaskQuery::with_filter(
                    owner,
                    TaskFilter {
                        status: Some(TaskStatus::Completed),
                        scheduled_from: Some(from),
                        scheduled_to: Some(to),
                        ..Default::default()
                    },
                );
                for task in Tasks::new(self.conn).find(&query)? {
                    if let Some(minutes) = task.actual_duration_minutes {
                        *minutes_by_day.entry(day_key(task.scheduled_start)).or_default() += minutes;
                    }
                }
            }
        }

        Ok(minutes_by_day
            .into_iter()
            .map(|(date, minutes)| HeatmapCell {
                date,
                minutes,
                hours: round2(minutes as f64 / 60.0),
                intensity: intensity(minutes),
            })
            .collect())
    }

    /// Completed time entries started in `[start, end]`, totalled per group.
    pub fn grouped_report(
        &self,
        owner: OwnerId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        group_by: GroupBy,
    ) -> TrackerResult<GroupedReport> {
        check_range(start, end)?;
        let entries = TimeEntries::new(self.conn).find_completed(owner, start, end)?;

        let mut groups: BTreeMap<String, i64> = BTreeMap::new();
        for entry in &entries {
            *groups.entry(group_by.key(entry)).or_default() += entry.duration.unwrap_or(0);
        }
        let total_minutes = groups.values().sum();

        Ok(GroupedReport {
            start,
            end,
            group_by,
            total_minutes,
            total_hours: round2(total_minutes as f64 / 60.0),
            groups: groups
                .into_iter()
                .map(|(key, minutes)| GroupTotal {
                    key,
                    minutes,
                    hours: round2(minutes as f64 / 60.0),
                })
                .collect(),
        })
    }
}

/// Mean score over tasks that have one, 0 when none do.
pub fn average_score(tasks: &[Task]) -> f64 {
    let scores: Vec<f64> = tasks.iter().filter_map(|t| t.productivity_score).collect();
    if scores.is_empty() {
        return 0.0;
    }
    round1(scores.iter().sum::<f64>() / scores.len() as f64)
}

fn check_range(start: DateTime<Utc>, end: DateTime<Utc>) -> TrackerResult<()> {
    if end < start {
        return Err(TrackerError::validation(Message::InvalidRange(start.to_rfc3339(), end.to_rfc3339())));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(start: DateTime<Utc>, project: Option<&str>, category: Option<&str>) -> TimeEntry {
        TimeEntry {
            id: 1,
            owner: 1,
            project: project.map(str::to_string),
            description: "work".to_string(),
            category: category.map(str::to_string),
            start_time: start,
            end_time: None,
            duration: Some(30),
        }
    }

    #[test]
    fn intensity_thresholds() {
        assert_eq!(intensity(0), 1);
        assert_eq!(intensity(59), 1);
        assert_eq!(intensity(60), 2);
        assert_eq!(intensity(179), 2);
        assert_eq!(intensity(180), 3);
        assert_eq!(intensity(300), 4);
        assert_eq!(intensity(479), 4);
        assert_eq!(intensity(480), 5);
    }

    #[test]
    fn group_keys() {
        let sunday = Utc.with_ymd_and_hms(2025, 1, 5, 10, 0, 0).unwrap();
        let e = entry(sunday, None, None);
        assert_eq!(GroupBy::Day.key(&e), "2025-01-05");
        assert_eq!(GroupBy::Week.key(&e), "2025-W01");
        assert_eq!(GroupBy::Month.key(&e), "2025-01");
        assert_eq!(GroupBy::Project.key(&e), "No Project");
        assert_eq!(GroupBy::Category.key(&e), "other");

        let dec30 = Utc.with_ymd_and_hms(2024, 12, 30, 10, 0, 0).unwrap();
        assert_eq!(GroupBy::Week.key(&entry(dec30, Some("Atlas"), Some("work"))), "2025-W01");
        assert_eq!(GroupBy::Project.key(&entry(dec30, Some("Atlas"), None)), "Atlas");
    }

    #[test]
    fn period_ranges_end_now() {
        let now = Utc.with_ymd_and_hms(2025, 3, 31, 15, 30, 0).unwrap();
        assert_eq!(Period::Day.range(now).0, Utc.with_ymd_and_hms(2025, 3, 31, 0, 0, 0).unwrap());
        assert_eq!(Period::Week.range(now).0, Utc.with_ymd_and_hms(2025, 3, 24, 15, 30, 0).unwrap());
        assert_eq!(Period::Month.range(now).0, Utc.with_ymd_and_hms(2025, 2, 28, 15, 30, 0).unwrap());
        assert_eq!(Period::Year.range(now).0, Utc.with_ymd_and_hms(2024, 3, 31, 15, 30, 0).unwrap());
        assert_eq!(Period::Year.range(now).1, now);
    }

    #[test]
    fn selectors_parse_case_insensitively() {
        assert_eq!("Week".parse::<Period>().unwrap(), Period::Week);
        assert_eq!(" project ".parse::<GroupBy>().unwrap(), GroupBy::Project);

        let err = "fortnight".parse::<Period>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid period 'fortnight', expected day, week, month or year");
        assert!(matches!("hour".parse::<GroupBy>(), Err(TrackerError::Validation(_))));
    }
}
