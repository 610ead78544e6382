//! Core library modules for taskroll.
//!
//! - **Engine**: [`manager`], [`recurrence`], [`rollup`], [`stats`],
//!   [`summary`], [`reminders`]
//! - **Model**: [`task`], [`calendar`], [`error`]
//! - **Infrastructure**: [`config`], [`data_storage`], [`messages`]
//! - **Presentation**: [`view`], [`formatter`], [`export`]
//!
//! Engine types borrow a SQLite connection and a [`calendar::Clock`], so the
//! same code runs against the user's database or a scratch one.
//!
//! ```rust
//! use chrono::{Duration, TimeZone, Utc};
//! use taskroll::db::db::Db;
//! use taskroll::libs::calendar::FixedClock;
//! use taskroll::libs::manager::TaskManager;
//! use taskroll::libs::task::NewTask;
//!
//! let db = Db::open_in_memory()?;
//! let start = Utc.with_ymd_and_hms(2025, 5, 5, 9, 0, 0).unwrap();
//! let clock = FixedClock(start - Duration::hours(1));
//! let manager = TaskManager::new(&db.conn, &clock);
//!
//! let outcome = manager.create(1, NewTask::new("Review PRs", start, start + Duration::minutes(45)))?;
//! assert_eq!(outcome.task.duration_minutes, 45);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod calendar;
pub mod config;
pub mod data_storage;
pub mod error;
pub mod export;
pub mod formatter;
pub mod manager;
pub mod messages;
pub mod recurrence;
pub mod reminders;
pub mod rollup;
pub mod stats;
pub mod summary;
pub mod task;
pub mod view;
