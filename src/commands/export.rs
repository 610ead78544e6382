//! Export of tasks or daily rollups for a date range.

use super::Session;
use crate::libs::{
    calendar::{day_key, Clock},
    export::{ExportData, ExportFormat, Exporter},
    formatter::parse_date,
};
use anyhow::Result;
use chrono::{Duration, NaiveDate};
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// What to export
    #[arg(value_enum)]
    data: ExportData,

    #[arg(short, long, value_enum, default_value = "csv")]
    format: ExportFormat,

    /// First day, 30 days before `--to` when omitted
    #[arg(long, value_parser = parse_date)]
    from: Option<NaiveDate>,

    /// Last day, today when omitted
    #[arg(long, value_parser = parse_date)]
    to: Option<NaiveDate>,

    /// Output file, `taskroll_export_<timestamp>.<ext>` when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn cmd(args: ExportArgs) -> Result<()> {
    let session = Session::open()?;
    let to = args.to.unwrap_or_else(|| day_key(session.clock.now()));
    let from = args.from.unwrap_or(to - Duration::days(30));

    Exporter::new(args.format, args.output).export(&session.db.conn, session.owner, args.data, from, to)?;
    Ok(())
}
