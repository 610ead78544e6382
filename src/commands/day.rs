use super::Session;
use crate::{
    libs::{
        calendar::{day_key, Clock},
        formatter::parse_date,
        messages::Message,
        rollup::{DailyRollup, DEFAULT_DAYS_LIMIT},
        view::View,
    },
    msg_info, msg_print, msg_success,
};
use anyhow::Result;
use chrono::{Duration, NaiveDate};
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct DayArgs {
    #[command(subcommand)]
    command: DayCommand,
}

#[derive(Debug, Subcommand)]
enum DayCommand {
    /// Show the rollup of a day with its tasks
    Show {
        /// Day as YYYY-MM-DD, today when omitted
        #[arg(value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Recompute the cached counters of a day
    Resync {
        #[arg(value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// List rollups in a date range, newest first
    List {
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
        #[arg(short, long, default_value_t = DEFAULT_DAYS_LIMIT)]
        limit: u32,
    },
}

pub fn cmd(args: DayArgs) -> Result<()> {
    let session = Session::open()?;
    let rollup = DailyRollup::new(&session.db.conn, &session.clock);
    let today = day_key(session.clock.now());

    match args.command {
        DayCommand::Show { date } => {
            let day = date.unwrap_or(today);
            let detail = rollup.day_detail(session.owner, day)?;
            msg_print!(Message::DayHeader(day.to_string()), true);
            View::day(&detail)?;
        }
        DayCommand::Resync { date } => {
            let day = date.unwrap_or(today);
            rollup.resync(session.owner, day)?;
            msg_success!(Message::RollupResynced(day.to_string()));
        }
        DayCommand::List { from, to, limit } => {
            let to = to.unwrap_or(today);
            let from = from.unwrap_or(to - Duration::days(i64::from(limit.max(1)) - 1));
            let days = rollup.list_days(session.owner, from, to, limit)?;
            if days.is_empty() {
                msg_info!(Message::NoDailyActivities);
            } else {
                msg_print!(Message::DaysHeader, true);
                View::days(&days)?;
            }
        }
    }

    Ok(())
}
