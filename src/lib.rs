//! # taskroll
//!
//! Scheduling and productivity tracking for personal tasks.
//!
//! ## Features
//!
//! - **Task lifecycle**: scheduled, in progress, completed or missed, with
//!   planned and actual time windows
//! - **Recurrence**: daily, weekly and monthly templates expanded ahead of time
//! - **Daily rollups**: per-day counters kept in step with task changes
//! - **Statistics**: period summaries, category breakdowns, trends, heatmaps
//!   and grouped time reports
//! - **Productivity summaries**: stored weekly and monthly digests
//! - **Export**: tasks and rollups to CSV or JSON
//!
//! ## Usage
//!
//! ```rust,no_run
//! use taskroll::commands::Cli;
//!
//! fn main() -> anyhow::Result<()> {
//!     Cli::menu()
//! }
//! ```

pub mod commands;
pub mod db;
pub mod libs;
