//! Command-line interface.
//!
//! Every subcommand lives in its own module with an `Args` struct and a
//! `cmd` function. Commands that touch the engine open a [`Session`]: the
//! default database, the user's configuration and the wall clock.

pub mod day;
pub mod entry;
pub mod export;
pub mod init;
pub mod migrations;
pub mod recurring;
pub mod remind;
pub mod stats;
pub mod summary;
pub mod task;

use crate::{
    db::db::Db,
    libs::{
        calendar::SystemClock,
        config::{Config, SchedulerConfig},
        task::OwnerId,
    },
};
use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init(init::InitArgs),
    #[command(about = "Create, edit and track tasks")]
    Task(task::TaskArgs),
    #[command(about = "Daily activity rollups")]
    Day(day::DayArgs),
    #[command(about = "Statistics over tasks and time entries")]
    Stats(stats::StatsArgs),
    #[command(about = "Recurring task maintenance")]
    Recurring(recurring::RecurringArgs),
    #[command(about = "Weekly and monthly productivity summaries")]
    Summary(summary::SummaryArgs),
    #[command(about = "Show reminders that are due")]
    Remind(remind::RemindArgs),
    #[command(about = "Record time entries")]
    Entry(entry::EntryArgs),
    #[command(about = "Export data to CSV or JSON")]
    Export(export::ExportArgs),
    #[command(about = "Database migration status")]
    Migrations(migrations::MigrationsArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Task(args) => task::cmd(args),
            Commands::Day(args) => day::cmd(args),
            Commands::Stats(args) => stats::cmd(args),
            Commands::Recurring(args) => recurring::cmd(args),
            Commands::Summary(args) => summary::cmd(args),
            Commands::Remind(args) => remind::cmd(args),
            Commands::Entry(args) => entry::cmd(args),
            Commands::Export(args) => export::cmd(args),
            Commands::Migrations(args) => migrations::cmd(args),
        }
    }
}

/// Database, settings and clock shared by the engine-backed commands.
pub struct Session {
    pub db: Db,
    pub clock: SystemClock,
    pub owner: OwnerId,
    pub scheduler: SchedulerConfig,
}

impl Session {
    pub fn open() -> Result<Self> {
        let config = Config::read()?;
        Ok(Self {
            db: Db::new()?,
            clock: SystemClock,
            owner: config.owner_id(),
            scheduler: config.scheduler_or_default(),
        })
    }
}
