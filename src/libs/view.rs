use super::formatter::{format_minutes, format_optional_minutes, format_optional_timestamp, format_timestamp};
use super::reminders::Reminder;
use super::rollup::DayDetail;
use super::stats::{CategoryStats, GroupedReport, HeatmapCell, PeriodSummary, TrendPoint};
use super::summary::ProductivitySummary;
use super::task::Task;
use crate::db::daily_activities::DailyActivity;
use anyhow::Result;
use prettytable::{row, Table};

pub struct View {}

impl View {
    pub fn tasks(tasks: &[Task]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "TITLE", "CATEGORY", "STATUS", "START", "END", "PLANNED", "ACTUAL", "REPEAT"]);
        for task in tasks {
            table.add_row(row![
                task.id,
                task.title,
                task.category.as_deref().unwrap_or("-"),
                task.status,
                format_timestamp(task.scheduled_start),
                format_timestamp(task.scheduled_end),
                format_minutes(task.duration_minutes),
                format_optional_minutes(task.actual_duration_minutes),
                task.recurrence_pattern
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn task(task: &Task) -> Result<()> {
        let mut table = Table::new();
        table.add_row(row!["Title", task.title]);
        table.add_row(row!["Description", task.description]);
        table.add_row(row!["Category", task.category.as_deref().unwrap_or("-")]);
        table.add_row(row!["Status", task.status]);
        table.add_row(row!["Scheduled", format!("{} - {}", format_timestamp(task.scheduled_start), format_timestamp(task.scheduled_end))]);
        table.add_row(row!["Actual", format!("{} - {}", format_optional_timestamp(task.actual_start), format_optional_timestamp(task.actual_end))]);
        table.add_row(row!["Planned", format_minutes(task.duration_minutes)]);
        table.add_row(row!["Spent", format_optional_minutes(task.actual_duration_minutes)]);
        table.add_row(row!["Recurrence", task.recurrence_pattern]);
        if let Some(template_id) = task.template_id {
            table.add_row(row!["Template", format!("#{}", template_id)]);
        }
        table.add_row(row!["Notes", task.notes.as_deref().unwrap_or("")]);
        table.add_row(row![
            "Score",
            task.productivity_score.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string())
        ]);
        table.printstd();

        Ok(())
    }

    pub fn day(detail: &DayDetail) -> Result<()> {
        let activity = &detail.activity;
        let mut table = Table::new();
        table.add_row(row!["Tasks", activity.total_tasks]);
        table.add_row(row!["Completed", activity.completed_tasks]);
        table.add_row(row!["Missed", activity.missed_tasks]);
        table.add_row(row!["Effective", format_minutes(activity.total_effective_minutes)]);
        table.add_row(row!["Planned", format_minutes(detail.stats.total_scheduled_minutes)]);
        table.add_row(row!["Spent", format_minutes(detail.stats.total_actual_minutes)]);
        table.add_row(row!["Completion", format!("{:.1}%", detail.stats.completion_rate)]);
        table.add_row(row!["Productivity", format!("{:.1}", detail.stats.productivity_score)]);
        table.printstd();

        if !detail.tasks.is_empty() {
            Self::tasks(&detail.tasks)?;
        }
        Ok(())
    }

    pub fn days(days: &[DailyActivity]) -> Result<()> {
        let mut table = Table::new();
        table.add_row(row!["DATE", "TASKS", "COMPLETED", "MISSED", "EFFECTIVE"]);
        for day in days {
            table.add_row(row![
                day.date,
                day.total_tasks,
                day.completed_tasks,
                day.missed_tasks,
                format_minutes(day.total_effective_minutes)
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn period_summary(summary: &PeriodSummary) -> Result<()> {
        let mut table = Table::new();
        table.add_row(row!["Total", summary.total_tasks]);
        table.add_row(row!["Completed", summary.completed_tasks]);
        table.add_row(row!["In progress", summary.in_progress_tasks]);
        table.add_row(row!["Scheduled", summary.scheduled_tasks]);
        table.add_row(row!["Missed", summary.missed_tasks]);
        table.add_row(row!["Completion rate", format!("{:.1}%", summary.completion_rate)]);
        table.add_row(row!["Planned", format_minutes(summary.total_scheduled_minutes)]);
        table.add_row(row!["Spent", format_minutes(summary.total_actual_minutes)]);
        table.add_row(row!["Efficiency", format!("{:.1}%", summary.efficiency)]);
        table.add_row(row!["Avg score", format!("{:.1}", summary.avg_productivity_score)]);
        table.printstd();

        Ok(())
    }

    pub fn daily_breakdown(summary: &PeriodSummary) -> Result<()> {
        let mut table = Table::new();
        table.add_row(row!["DATE", "TASKS", "COMPLETED", "EFFECTIVE"]);
        for day in &summary.daily_breakdown {
            table.add_row(row![day.date, day.total_tasks, day.completed_tasks, format_minutes(day.total_effective_minutes)]);
        }
        table.printstd();

        Ok(())
    }

    pub fn categories(stats: &[CategoryStats]) -> Result<()> {
        let mut table = Table::new();
        table.add_row(row!["CATEGORY", "TASKS", "COMPLETED", "RATE", "PLANNED", "SPENT", "SCORE"]);
        for category in stats {
            table.add_row(row![
                category.category.as_deref().unwrap_or("(none)"),
                category.total_tasks,
                category.completed_tasks,
                format!("{:.1}%", category.completion_rate),
                format_minutes(category.total_scheduled_minutes),
                format_minutes(category.total_actual_minutes),
                format!("{:.1}", category.avg_productivity_score)
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn trends(points: &[TrendPoint]) -> Result<()> {
        let mut table = Table::new();
        table.add_row(row!["DATE", "TASKS", "COMPLETED", "RATE", "EFFECTIVE"]);
        for point in points {
            table.add_row(row![
                point.date,
                point.total_tasks,
                point.completed_tasks,
                format!("{:.1}%", point.completion_rate),
                format_minutes(point.total_effective_minutes)
            ]);
        }
        table.printstd();

        Ok(())
    }

    pub fn heatmap(cells: &[HeatmapCell]) -> Result<()> {
        let mut table = Table::new();
        table.add_row(row!["DATE", "HOURS", "LEVEL"]);
        for cell in cells {
            table.add_row(row![cell.date, format!("{:.2}", cell.hours), "#".repeat(cell.intensity as usize)]);
        }
        table.printstd();

        Ok(())
    }

    pub fn grouped_report(report: &GroupedReport) -> Result<()> {
        let mut table = Table::new();
        table.add_row(row![report.group_by.to_string().to_uppercase(), "MINUTES", "HOURS"]);
        for group in &report.groups {
            table.add_row(row![group.key, group.minutes, format!("{:.2}", group.hours)]);
        }
        table.add_row(row!["TOTAL", report.total_minutes, format!("{:.2}", report.total_hours)]);
        table.printstd();

        Ok(())
    }

    pub fn productivity_summary(summary: &ProductivitySummary) -> Result<()> {
        let mut table = Table::new();
        table.add_row(row!["CATEGORY", "TASKS", "COMPLETED", "PRODUCTIVE"]);
        for category in &summary.category_breakdown {
            table.add_row(row![
                category.category,
                category.total_tasks,
                category.completed_tasks,
                format_minutes(category.productive_minutes)
            ]);
        }
        table.add_row(row!["TOTAL", "", "", format_minutes(summary.total_productive_time)]);
        table.printstd();

        let mut extremes = Table::new();
        extremes.add_row(row!["Average score", format!("{:.1}", summary.average_productivity)]);
        extremes.add_row(row!["Most productive", summary.most_productive_category.as_deref().unwrap_or("-")]);
        extremes.add_row(row!["Least productive", summary.least_productive_category.as_deref().unwrap_or("-")]);
        extremes.printstd();

        Ok(())
    }

    pub fn reminders(reminders: &[Reminder]) -> Result<()> {
        let mut table = Table::new();
        table.add_row(row!["ID", "START", "TYPE", "MESSAGE"]);
        for reminder in reminders {
            table.add_row(row![
                reminder.task_id,
                format_timestamp(reminder.scheduled_start),
                reminder.reminder_type.as_str(),
                reminder.message
            ]);
        }
        table.printstd();

        Ok(())
    }
}
