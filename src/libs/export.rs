//! Export of tasks and daily rollups to CSV or JSON files.
//!
//! ```rust,no_run
//! use chrono::NaiveDate;
//! use taskroll::db::db::Db;
//! use taskroll::libs::export::{ExportData, ExportFormat, Exporter};
//!
//! let db = Db::new()?;
//! let exporter = Exporter::new(ExportFormat::Csv, None);
//! let from = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
//! let to = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
//! exporter.export(&db.conn, 1, ExportData::Tasks, from, to)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::{
    db::{
        daily_activities::{DailyActivities, DailyActivity},
        tasks::{TaskQuery, Tasks},
    },
    libs::{
        calendar::day_start,
        formatter::format_timestamp,
        messages::Message,
        task::{OwnerId, Task},
    },
    msg_error_anyhow, msg_info, msg_success,
};
use anyhow::Result;
use chrono::{Duration, NaiveDate, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    /// Comma-separated values, one row per record.
    Csv,
    /// Pretty-printed JSON array.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportData {
    /// Tasks scheduled in the range.
    Tasks,
    /// Daily rollups in the range.
    Days,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTask {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub status: String,
    pub scheduled_start: String,
    pub scheduled_end: String,
    pub duration_minutes: i64,
    pub actual_duration_minutes: Option<i64>,
    pub recurrence: String,
    pub productivity_score: Option<f64>,
}

impl From<&Task> for ExportTask {
    fn from(task: &Task) -> Self {
        ExportTask {
            id: task.id,
            title: task.title.clone(),
            category: task.category.clone().unwrap_or_default(),
            status: task.status.to_string(),
            scheduled_start: task.scheduled_start.to_rfc3339(),
            scheduled_end: task.scheduled_end.to_rfc3339(),
            duration_minutes: task.duration_minutes,
            actual_duration_minutes: task.actual_duration_minutes,
            recurrence: task.recurrence_pattern.to_string(),
            productivity_score: task.productivity_score,
        }
    }
}

pub struct Exporter {
    format: ExportFormat,
    output_path: PathBuf,
}

impl Exporter {
    /// Without an explicit path the file is named `taskroll_export_<timestamp>.<ext>`
    /// in the working directory.
    pub fn new(format: ExportFormat, output_path: Option<PathBuf>) -> Self {
        let default_name = format!("taskroll_export_{}", Utc::now().format("%Y%m%d_%H%M%S"));
        let extension = match format {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        };
        let output_path = output_path.unwrap_or_else(|| PathBuf::from(format!("{}.{}", default_name, extension)));

        Self { format, output_path }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Writes `data` of `owner` for the days `from..=to`. Returns the number
    /// of exported records; nothing is written when there are none.
    pub fn export(&self, conn: &Connection, owner: OwnerId, data: ExportData, from: NaiveDate, to: NaiveDate) -> Result<usize> {
        if to < from {
            return Err(msg_error_anyhow!(Message::InvalidRange(from.to_string(), to.to_string())));
        }

        let written = match data {
            ExportData::Tasks => {
                let query = TaskQuery::scheduled_within(owner, day_start(from), day_start(to + Duration::days(1)));
                let tasks: Vec<ExportTask> = Tasks::new(conn).find(&query)?.iter().map(ExportTask::from).collect();
                if !tasks.is_empty() {
                    self.write_tasks(&tasks)?;
                }
                tasks.len()
            }
            ExportData::Days => {
                let span = (to - from).num_days() + 1;
                let days = DailyActivities::new(conn).find_range(owner, from, to, span as u32)?;
                if !days.is_empty() {
                    self.write_days(&days)?;
                }
                days.len()
            }
        };

        if written == 0 {
            msg_info!(Message::ExportNothing);
        } else {
            msg_success!(Message::ExportCompleted(self.output_path.display().to_string()));
        }
        Ok(written)
    }

    fn write_tasks(&self, tasks: &[ExportTask]) -> Result<()> {
        match self.format {
            ExportFormat::Json => self.write_json(tasks),
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_path(&self.output_path)?;
                wtr.write_record([
                    "ID", "Title", "Category", "Status", "Start", "End", "Planned", "Actual", "Recurrence", "Score",
                ])?;
                for task in tasks {
                    wtr.write_record(&[
                        task.id.to_string(),
                        task.title.clone(),
                        task.category.clone(),
                        task.status.clone(),
                        task.scheduled_start.clone(),
                        task.scheduled_end.clone(),
                        task.duration_minutes.to_string(),
                        task.actual_duration_minutes.map(|m| m.to_string()).unwrap_or_default(),
                        task.recurrence.clone(),
                        task.productivity_score.map(|s| s.to_string()).unwrap_or_default(),
                    ])?;
                }
                wtr.flush()?;
                Ok(())
            }
        }
    }

    fn write_days(&self, days: &[DailyActivity]) -> Result<()> {
        match self.format {
            ExportFormat::Json => self.write_json(days),
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_path(&self.output_path)?;
                wtr.write_record(["Date", "Total", "Completed", "Missed", "Effective minutes", "Updated"])?;
                for day in days {
                    wtr.write_record(&[
                        day.date.to_string(),
                        day.total_tasks.to_string(),
                        day.completed_tasks.to_string(),
                        day.missed_tasks.to_string(),
                        day.total_effective_minutes.to_string(),
                        format_timestamp(day.updated_at),
                    ])?;
                }
                wtr.flush()?;
                Ok(())
            }
        }
    }

    fn write_json<T: Serialize>(&self, records: &[T]) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        File::create(&self.output_path)?.write_all(json.as_bytes())?;
        Ok(())
    }
}
