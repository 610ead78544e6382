//! Statistics over tasks, daily rollups and time entries.

use super::Session;
use crate::{
    libs::{
        calendar::{day_key, day_start, Clock},
        formatter::{format_minutes, parse_date},
        messages::Message,
        stats::{GroupBy, HeatmapSource, Period, StatisticsAggregator},
        view::View,
    },
    msg_info, msg_print,
};
use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::{Args, Subcommand};

#[derive(Debug, Args)]
pub struct StatsArgs {
    #[command(subcommand)]
    command: StatsCommand,
}

#[derive(Debug, Subcommand)]
enum StatsCommand {
    /// Totals and rates for a period ending now
    Summary {
        /// day, week, month or year
        #[arg(short, long, default_value = "week")]
        period: Period,
        /// Also print the per-day rollup totals
        #[arg(long)]
        daily: bool,
    },
    /// Totals per task category
    Categories {
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
    },
    /// Completion trend over the trailing days
    Trends {
        #[arg(short, long)]
        days: Option<u32>,
    },
    /// Hours of activity per day
    Heatmap {
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
        #[arg(short, long, value_enum, default_value = "time-entries")]
        source: HeatmapSource,
    },
    /// Time entry totals grouped by day, week, month, project or category
    Report {
        #[arg(long, value_parser = parse_date)]
        from: NaiveDate,
        #[arg(long, value_parser = parse_date)]
        to: NaiveDate,
        #[arg(short, long, default_value = "day")]
        group_by: GroupBy,
    },
}

pub fn cmd(args: StatsArgs) -> Result<()> {
    let session = Session::open()?;
    let stats = StatisticsAggregator::new(&session.db.conn, &session.clock);
    let owner = session.owner;

    match args.command {
        StatsCommand::Summary { period, daily } => {
            let summary = stats.summary_for(owner, period)?;
            msg_print!(Message::PeriodSummaryHeader(summary.start.to_rfc3339(), summary.end.to_rfc3339()), true);
            View::period_summary(&summary)?;
            if daily && !summary.daily_breakdown.is_empty() {
                msg_print!(Message::DailyBreakdownHeader, true);
                View::daily_breakdown(&summary)?;
            }
        }
        StatsCommand::Categories { from, to } => {
            let range = match (from, to) {
                (None, None) => None,
                (from, to) => Some(inclusive_days(from.unwrap_or(NaiveDate::MIN), to.unwrap_or(NaiveDate::MAX))),
            };
            let categories = stats.category_breakdown(owner, range)?;
            if categories.is_empty() {
                msg_info!(Message::NoStatistics);
            } else {
                msg_print!(Message::CategoryStatsHeader, true);
                View::categories(&categories)?;
            }
        }
        StatsCommand::Trends { days } => {
            let days = days.unwrap_or(session.scheduler.trends_days);
            let points = stats.trends(owner, days)?;
            if points.is_empty() {
                msg_info!(Message::NoStatistics);
            } else {
                msg_print!(Message::TrendsHeader(days), true);
                View::trends(&points)?;
            }
        }
        StatsCommand::Heatmap { from, to, source } => {
            let now = session.clock.now();
            let range = match (from, to) {
                (None, None) => (now - Duration::days(session.scheduler.heatmap_days), now),
                (from, to) => {
                    let to = to.unwrap_or_else(|| day_key(now));
                    inclusive_days(from.unwrap_or(to - Duration::days(session.scheduler.heatmap_days)), to)
                }
            };
            let cells = stats.heatmap(owner, Some(range), source)?;
            if cells.is_empty() {
                msg_info!(Message::NoStatistics);
            } else {
                msg_print!(Message::HeatmapHeader(range.0.date_naive().to_string(), range.1.date_naive().to_string()), true);
                View::heatmap(&cells)?;
            }
        }
        StatsCommand::Report { from, to, group_by } => {
            let (start, end) = inclusive_days(from, to);
            let report = stats.grouped_report(owner, start, end, group_by)?;
            msg_print!(Message::GroupedReportHeader(group_by.to_string(), format_minutes(report.total_minutes)), true);
            View::grouped_report(&report)?;
        }
    }

    Ok(())
}

/// Instant range covering the calendar days `from..=to`.
fn inclusive_days(from: NaiveDate, to: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let end = to
        .succ_opt()
        .map(|next| day_start(next) - Duration::milliseconds(1))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (day_start(from), end)
}
