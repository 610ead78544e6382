use super::Session;
use crate::{
    libs::{
        calendar::{day_key, Clock},
        formatter::parse_date,
        messages::Message,
        summary::{ProductivitySummaries, SummaryKind},
        view::View,
    },
    msg_print, msg_success,
};
use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[command(subcommand)]
    command: SummaryCommand,
}

#[derive(Debug, Subcommand)]
enum SummaryCommand {
    /// Build the summary of the ISO week containing a day
    Weekly {
        /// Any day of the week, today when omitted
        #[arg(value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Build the summary of the month containing a day
    Monthly {
        #[arg(value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
}

pub fn cmd(args: SummaryArgs) -> Result<()> {
    let session = Session::open()?;
    let summaries = ProductivitySummaries::new(&session.db.conn, &session.clock);

    let (kind, date) = match args.command {
        SummaryCommand::Weekly { date } => (SummaryKind::Weekly, date),
        SummaryCommand::Monthly { date } => (SummaryKind::Monthly, date),
    };
    let anchor = date.unwrap_or_else(|| day_key(session.clock.now()));

    let summary = summaries.build(session.owner, kind, anchor)?;
    msg_success!(Message::ProductivitySummaryStored(kind.to_string(), summary.period_start.to_string()));
    msg_print!(
        Message::ProductivitySummaryHeader(kind.to_string(), summary.period_start.to_string(), summary.period_end.to_string()),
        true
    );
    View::productivity_summary(&summary)?;

    Ok(())
}
