//! Task management command.
//!
//! Creation expands recurring templates immediately; follow-up problems are
//! reported as warnings while the task itself stays saved.

use super::Session;
use crate::{
    libs::{
        formatter::parse_timestamp,
        manager::TaskManager,
        messages::Message,
        task::{NewTask, RecurrencePattern, ReminderType, TaskFilter, TaskId, TaskPatch, TaskStatus},
        view::View,
    },
    msg_info, msg_print, msg_success, msg_warning,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct TaskArgs {
    #[command(subcommand)]
    command: TaskCommand,
}

#[derive(Debug, Subcommand)]
enum TaskCommand {
    /// Schedule a new task
    Add {
        /// Task title
        title: String,
        /// Scheduled start, e.g. "2025-03-03 09:00"
        #[arg(short, long, value_parser = parse_timestamp)]
        start: DateTime<Utc>,
        /// Scheduled end
        #[arg(short, long, value_parser = parse_timestamp)]
        end: DateTime<Utc>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Planned minutes, derived from the window when omitted
        #[arg(long)]
        duration: Option<i64>,
        /// none, daily, weekly or monthly
        #[arg(short, long, default_value = "none")]
        recurrence: RecurrencePattern,
        #[arg(long)]
        notes: Option<String>,
        /// notification or call
        #[arg(long, default_value = "notification")]
        reminder: ReminderType,
        /// Productivity score given to the task
        #[arg(long)]
        score: Option<f64>,
    },
    /// Change fields of a task
    Edit {
        id: TaskId,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long, value_parser = parse_timestamp)]
        start: Option<DateTime<Utc>>,
        #[arg(short, long, value_parser = parse_timestamp)]
        end: Option<DateTime<Utc>>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        duration: Option<i64>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        score: Option<f64>,
    },
    /// Delete a task
    Delete { id: TaskId },
    /// Start working on a task
    Start { id: TaskId },
    /// Finish a running task
    Stop { id: TaskId },
    /// List tasks
    List {
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(short, long)]
        category: Option<String>,
        /// Only recurring (true) or only one-off (false) tasks
        #[arg(long)]
        recurring: Option<bool>,
        #[arg(long, value_parser = parse_timestamp)]
        from: Option<DateTime<Utc>>,
        #[arg(long, value_parser = parse_timestamp)]
        to: Option<DateTime<Utc>>,
    },
    /// Show a single task
    Show { id: TaskId },
    /// Mark overdue scheduled tasks as missed
    Sweep,
}

pub fn cmd(args: TaskArgs) -> Result<()> {
    let session = Session::open()?;
    let manager = TaskManager::new(&session.db.conn, &session.clock).with_horizon_days(session.scheduler.recurrence_horizon_days);
    let owner = session.owner;

    match args.command {
        TaskCommand::Add {
            title,
            start,
            end,
            category,
            description,
            duration,
            recurrence,
            notes,
            reminder,
            score,
        } => {
            let input = NewTask {
                description,
                category,
                duration_minutes: duration,
                notes,
                reminder_type: Some(reminder),
                productivity_score: score,
                ..NewTask::new(&title, start, end).recurring(recurrence)
            };
            let outcome = manager.create(owner, input)?;

            msg_success!(Message::TaskCreated(outcome.task.id, outcome.task.title.clone()));
            if outcome.task.is_template() {
                msg_info!(Message::OccurrencesGenerated(outcome.generated.len()));
            }
            for issue in &outcome.issues {
                msg_warning!(Message::FollowUpFailed(issue.step.to_string(), issue.error.clone()));
            }
        }
        TaskCommand::Edit {
            id,
            title,
            start,
            end,
            category,
            description,
            duration,
            status,
            notes,
            score,
        } => {
            let patch = TaskPatch {
                title,
                description,
                category: category.map(Some),
                scheduled_start: start,
                scheduled_end: end,
                duration_minutes: duration,
                status,
                notes: notes.map(Some),
                productivity_score: score.map(Some),
                ..Default::default()
            };
            let task = manager.update(owner, id, patch)?;
            msg_success!(Message::TaskUpdated(task.id));
        }
        TaskCommand::Delete { id } => {
            let task = manager.delete(owner, id)?;
            msg_success!(Message::TaskDeleted(task.id));
        }
        TaskCommand::Start { id } => {
            let task = manager.start(owner, id)?;
            msg_success!(Message::TaskStarted(task.id));
        }
        TaskCommand::Stop { id } => {
            let task = manager.stop(owner, id)?;
            msg_success!(Message::TaskStopped(task.id, task.actual_duration_minutes.unwrap_or(0)));
        }
        TaskCommand::List {
            status,
            category,
            recurring,
            from,
            to,
        } => {
            let filter = TaskFilter {
                status,
                category,
                is_recurring: recurring,
                scheduled_from: from,
                scheduled_to: to,
            };
            let tasks = manager.list(owner, filter)?;
            if tasks.is_empty() {
                msg_info!(Message::TasksNotFound);
            } else {
                msg_print!(Message::TasksHeader, true);
                View::tasks(&tasks)?;
            }
        }
        TaskCommand::Show { id } => {
            let task = manager.get(owner, id)?;
            msg_print!(Message::TaskDetailsHeader(task.id), true);
            View::task(&task)?;
        }
        TaskCommand::Sweep => {
            let missed = manager.sweep_missed(owner)?;
            msg_info!(Message::TasksSweptMissed(missed.len()));
        }
    }

    Ok(())
}
