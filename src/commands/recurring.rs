use super::Session;
use crate::{
    libs::{calendar::Clock, formatter::parse_timestamp, messages::Message, recurrence::RecurrenceExpander},
    msg_info, msg_success,
};
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct RecurringArgs {
    #[command(subcommand)]
    command: RecurringCommand,
}

#[derive(Debug, Subcommand)]
enum RecurringCommand {
    /// Generate missing occurrences of every recurring template
    Process {
        /// Start of the window, now when omitted
        #[arg(long, value_parser = parse_timestamp)]
        from: Option<DateTime<Utc>>,
        /// End of the window, the configured horizon when omitted
        #[arg(long, value_parser = parse_timestamp)]
        to: Option<DateTime<Utc>>,
    },
    /// Remove finished recurring tasks older than the retention period
    Cleanup {
        /// Days to keep
        #[arg(short, long)]
        days: Option<i64>,
    },
}

pub fn cmd(args: RecurringArgs) -> Result<()> {
    let session = Session::open()?;
    let expander = RecurrenceExpander::new(&session.db.conn, &session.clock);

    match args.command {
        RecurringCommand::Process { from, to } => {
            let from = from.unwrap_or_else(|| session.clock.now());
            let to = to.unwrap_or(from + Duration::days(session.scheduler.recurrence_horizon_days));
            let generated = expander.process_recurring(session.owner, from, to)?;
            if generated.is_empty() {
                msg_info!(Message::NoOccurrencesGenerated);
            } else {
                msg_success!(Message::OccurrencesGenerated(generated.len()));
            }
        }
        RecurringCommand::Cleanup { days } => {
            let days = days.unwrap_or(session.scheduler.cleanup_retention_days);
            let removed = expander.cleanup_old_recurring(session.owner, days)?;
            msg_success!(Message::RecurringCleanedUp(removed));
        }
    }

    Ok(())
}
