use super::Session;
use crate::{
    db::time_entries::{NewTimeEntry, TimeEntries},
    libs::{formatter::parse_timestamp, messages::Message},
    msg_bail_anyhow, msg_success,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct EntryArgs {
    #[command(subcommand)]
    command: EntryCommand,
}

#[derive(Debug, Subcommand)]
enum EntryCommand {
    /// Record a time entry
    Add {
        description: String,
        #[arg(short, long, value_parser = parse_timestamp)]
        start: DateTime<Utc>,
        /// Leave out to record an entry that is still running
        #[arg(short, long, value_parser = parse_timestamp)]
        end: Option<DateTime<Utc>>,
        #[arg(short, long)]
        project: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
    },
}

pub fn cmd(args: EntryArgs) -> Result<()> {
    let session = Session::open()?;

    match args.command {
        EntryCommand::Add {
            description,
            start,
            end,
            project,
            category,
        } => {
            if matches!(end, Some(end) if end <= start) {
                msg_bail_anyhow!(Message::EntryEndNotAfterStart);
            }
            let entry = NewTimeEntry {
                project,
                description,
                category,
                start_time: start,
                end_time: end,
                duration: None,
            };
            let id = TimeEntries::new(&session.db.conn).insert(session.owner, &entry)?;
            msg_success!(Message::TimeEntryAdded(id));
        }
    }

    Ok(())
}
