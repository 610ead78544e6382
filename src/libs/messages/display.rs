//! Display implementation for taskroll application messages.
//!
//! All user-facing text is defined here, in one match over the [`Message`]
//! enum. Commands, the engine's validation errors and the logging macros all
//! render through this implementation, so wording stays consistent between
//! the CLI and the library API.
//!
//! ```rust
//! use taskroll::libs::messages::Message;
//!
//! assert_eq!(Message::TaskDeleted(7).to_string(), "Task #7 deleted");
//! ```

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let s = match self {
            // === TASK MESSAGES ===
            Message::TaskCreated(id, title) => format!("Task #{} '{}' created", id, title),
            Message::TaskUpdated(id) => format!("Task #{} updated", id),
            Message::TaskDeleted(id) => format!("Task #{} deleted", id),
            Message::TaskStarted(id) => format!("Task #{} started", id),
            Message::TaskStopped(id, minutes) => format!("Task #{} completed after {} min", id, minutes),
            Message::TaskNotFound => "Task not found".to_string(),
            Message::TasksNotFound => "No tasks found".to_string(),
            Message::TasksHeader => "Tasks".to_string(),
            Message::TasksSweptMissed(count) => format!("{} overdue task(s) marked as missed", count),
            Message::TaskDetailsHeader(id) => format!("Task #{}", id),

            // === VALIDATION MESSAGES ===
            Message::ScheduledEndNotAfterStart => "Scheduled end time must be after start time".to_string(),
            Message::ActualEndNotAfterStart => "Actual end time must be after start time".to_string(),
            Message::TitleRequired => "Task title must not be empty".to_string(),
            Message::NegativeDuration => "Duration must not be negative".to_string(),
            Message::InvalidDate(value) => format!("Invalid date '{}', expected YYYY-MM-DD", value),
            Message::InvalidTimestamp(value) => {
                format!("Invalid timestamp '{}', expected RFC 3339 or 'YYYY-MM-DD HH:MM'", value)
            }
            Message::InvalidStatus(value) => {
                format!("Invalid status '{}', expected scheduled, in-progress, completed or missed", value)
            }
            Message::InvalidRecurrencePattern(value) => {
                format!("Invalid recurrence pattern '{}', expected none, daily, weekly or monthly", value)
            }
            Message::InvalidReminderType(value) => format!("Invalid reminder type '{}', expected notification or call", value),
            Message::InvalidRange(start, end) => format!("Range end {} is before range start {}", end, start),
            Message::InvalidPeriod(value) => format!("Invalid period '{}', expected day, week, month or year", value),
            Message::InvalidGroupBy(value) => {
                format!("Invalid grouping '{}', expected day, week, month, project or category", value)
            }
            Message::InvalidSummaryKind(value) => format!("Invalid summary type '{}', expected weekly or monthly", value),

            // === STATE TRANSITION MESSAGES ===
            Message::CannotTransition(from, to) => format!("Cannot move a {} task to {}", from, to),

            // === RECURRENCE MESSAGES ===
            Message::OccurrencesGenerated(count) => format!("{} recurring occurrence(s) generated", count),
            Message::NoOccurrencesGenerated => "All recurring occurrences are already scheduled".to_string(),
            Message::RecurringCleanedUp(count) => format!("{} old recurring task(s) removed", count),

            // === ROLLUP MESSAGES ===
            Message::DayHeader(date) => format!("Activity for {}", date),
            Message::DaysHeader => "Daily activity".to_string(),
            Message::NoDailyActivities => "No daily activity recorded".to_string(),
            Message::RollupResynced(date) => format!("Daily activity for {} recalculated", date),
            Message::FollowUpFailed(step, error) => format!("Follow-up step '{}' failed: {}", step, error),

            // === STATISTICS MESSAGES ===
            Message::PeriodSummaryHeader(start, end) => format!("Productivity from {} to {}", start, end),
            Message::DailyBreakdownHeader => "Daily breakdown".to_string(),
            Message::CategoryStatsHeader => "Statistics by category".to_string(),
            Message::TrendsHeader(days) => format!("Trends for the last {} days", days),
            Message::HeatmapHeader(start, end) => format!("Activity heatmap from {} to {}", start, end),
            Message::GroupedReportHeader(group_by, total) => format!("Time by {} (total {})", group_by, total),
            Message::NoStatistics => "No data for the requested period".to_string(),

            // === PRODUCTIVITY SUMMARY MESSAGES ===
            Message::ProductivitySummaryHeader(kind, start, end) => {
                format!("{} productivity summary {} - {}", kind, start, end)
            }
            Message::ProductivitySummaryStored(kind, start) => format!("{} summary for {} stored", kind, start),

            // === REMINDER MESSAGES ===
            Message::RemindersHeader => "Upcoming reminders".to_string(),
            Message::NoRemindersDue => "No reminders due".to_string(),
            Message::ReminderText(title, time) => format!("Reminder: {} is scheduled to start at {}", title, time),

            // === TIME ENTRY MESSAGES ===
            Message::TimeEntryAdded(id) => format!("Time entry #{} recorded", id),
            Message::EntryEndNotAfterStart => "Time entry end must be after its start".to_string(),

            // === EXPORT MESSAGES ===
            Message::ExportCompleted(path) => format!("Export completed: {}", path),
            Message::ExportNothing => "Nothing to export".to_string(),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved".to_string(),
            Message::ConfigDeleted => "Configuration removed".to_string(),
            Message::ConfigModuleScheduler => "Scheduler settings".to_string(),
            Message::ConfigModuleUser => "User settings".to_string(),
            Message::PromptSelectModules => "Select modules to configure".to_string(),
            Message::PromptHorizonDays => "Days of recurring occurrences to pre-generate".to_string(),
            Message::PromptRetentionDays => "Days to keep finished recurring tasks".to_string(),
            Message::PromptReminderLookahead => "Reminder lookahead in minutes".to_string(),
            Message::PromptTrendsDays => "Default trend window in days".to_string(),
            Message::PromptHeatmapDays => "Default heatmap window in days".to_string(),
            Message::PromptOwnerId => "Owner id used by this installation".to_string(),

            // === MIGRATION MESSAGES ===
            Message::MigrationsFound(count) => format!("Found {} pending migration(s)", count),
            Message::RunningMigration(version, name) => format!("Running migration v{}: {}", version, name),
            Message::MigrationCompleted(version) => format!("Migration v{} completed", version),
            Message::MigrationFailed(version, error) => format!("Migration v{} failed: {}", version, error),
            Message::AllMigrationsCompleted => "All migrations completed".to_string(),
            Message::DatabaseVersion(version) => format!("Database schema version: v{}", version),
            Message::DatabaseNeedsUpdate => "Database has pending migrations".to_string(),
            Message::DatabaseUpToDate => "Database is up to date".to_string(),
            Message::MigrationHistory => "Applied migrations".to_string(),

            // === STORAGE MESSAGES ===
            Message::StorageFailure => "Storage operation failed".to_string(),
        };

        write!(f, "{}", s)
    }
}
