//! Versioned schema migrations.
//!
//! Every database opened through [`Db`](super::db::Db) is brought to the
//! latest version before use. Applied versions are recorded in the
//! `migrations` table; all pending migrations run inside one transaction so a
//! failure leaves the schema untouched.
//!
//! ```rust
//! use taskroll::db::migrations::{init_with_migrations, get_db_version};
//! use rusqlite::Connection;
//!
//! let mut conn = Connection::open_in_memory()?;
//! init_with_migrations(&mut conn)?;
//! assert!(get_db_version(&conn)? >= 3);
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::libs::messages::Message;
use crate::{msg_debug, msg_error};
use anyhow::Result;
use rusqlite::{params, Connection, Transaction};

const MIGRATIONS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS migrations (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL UNIQUE,
    name TEXT NOT NULL,
    applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

#[derive(Debug, Clone)]
struct Migration {
    version: u32,
    name: &'static str,
    up: fn(&Transaction) -> Result<()>,
}

/// Registry of all schema migrations in version order.
pub struct MigrationManager {
    migrations: Vec<Migration>,
}

impl MigrationManager {
    pub fn new() -> Self {
        let mut manager = Self { migrations: Vec::new() };
        manager.register_migrations();
        manager
    }

    fn register_migrations(&mut self) {
        // Version 1: tasks, per-day rollups and the rollup's task reference set.
        // Instants are stored as UTC epoch milliseconds, day keys as YYYY-MM-DD.
        self.add_migration(1, "create_tasks_and_daily_activities", |tx| {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS tasks (
                    id INTEGER NOT NULL PRIMARY KEY,
                    owner INTEGER NOT NULL,
                    title TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    category TEXT,
                    scheduled_start INTEGER NOT NULL,
                    scheduled_end INTEGER NOT NULL,
                    actual_start INTEGER,
                    actual_end INTEGER,
                    duration_minutes INTEGER NOT NULL,
                    actual_duration_minutes INTEGER,
                    status TEXT NOT NULL DEFAULT 'scheduled',
                    is_recurring BOOLEAN NOT NULL DEFAULT FALSE,
                    recurrence_pattern TEXT NOT NULL DEFAULT 'none',
                    template_id INTEGER,
                    notes TEXT,
                    reminder_type TEXT,
                    productivity_score REAL,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL,
                    CHECK (scheduled_end > scheduled_start)
                )",
                [],
            )?;
            tx.execute(
                "CREATE TABLE IF NOT EXISTS daily_activities (
                    id INTEGER NOT NULL PRIMARY KEY,
                    owner INTEGER NOT NULL,
                    date DATE NOT NULL,
                    total_tasks INTEGER NOT NULL DEFAULT 0,
                    completed_tasks INTEGER NOT NULL DEFAULT 0,
                    missed_tasks INTEGER NOT NULL DEFAULT 0,
                    total_effective_minutes INTEGER NOT NULL DEFAULT 0,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL,
                    UNIQUE (owner, date)
                )",
                [],
            )?;
            tx.execute(
                "CREATE TABLE IF NOT EXISTS daily_activity_tasks (
                    activity_id INTEGER NOT NULL,
                    task_id INTEGER NOT NULL,
                    PRIMARY KEY (activity_id, task_id),
                    FOREIGN KEY (activity_id) REFERENCES daily_activities(id) ON DELETE CASCADE
                )",
                [],
            )?;

            tx.execute("CREATE INDEX IF NOT EXISTS idx_tasks_owner_start ON tasks(owner, scheduled_start)", [])?;
            tx.execute(
                "CREATE INDEX IF NOT EXISTS idx_tasks_occurrence ON tasks(owner, title, scheduled_start)",
                [],
            )?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_tasks_template ON tasks(template_id)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_activity_tasks_task ON daily_activity_tasks(task_id)", [])?;
            Ok(())
        });

        // Version 2: weekly and monthly productivity summaries.
        self.add_migration(2, "add_productivity_summaries", |tx| {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS productivity_summaries (
                    id INTEGER NOT NULL PRIMARY KEY,
                    owner INTEGER NOT NULL,
                    kind TEXT NOT NULL,
                    period_start DATE NOT NULL,
                    period_end DATE NOT NULL,
                    total_productive_time INTEGER NOT NULL DEFAULT 0,
                    average_productivity REAL NOT NULL DEFAULT 0,
                    most_productive_category TEXT,
                    least_productive_category TEXT,
                    category_breakdown TEXT NOT NULL DEFAULT '[]',
                    updated_at INTEGER NOT NULL,
                    UNIQUE (owner, kind, period_start)
                )",
                [],
            )?;
            Ok(())
        });

        // Version 3: time entries feeding the heatmap and grouped reports.
        self.add_migration(3, "add_time_entries", |tx| {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS time_entries (
                    id INTEGER NOT NULL PRIMARY KEY,
                    owner INTEGER NOT NULL,
                    project TEXT,
                    description TEXT NOT NULL,
                    category TEXT,
                    start_time INTEGER NOT NULL,
                    end_time INTEGER,
                    duration INTEGER
                )",
                [],
            )?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_time_entries_owner_start ON time_entries(owner, start_time)", [])?;
            Ok(())
        });
    }

    fn add_migration(&mut self, version: u32, name: &'static str, up: fn(&Transaction) -> Result<()>) {
        self.migrations.push(Migration { version, name, up });
    }

    pub fn run_migrations(&self, conn: &mut Connection) -> Result<()> {
        conn.execute(MIGRATIONS_TABLE, [])?;

        let current_version = self.get_current_version(conn)?;
        let pending: Vec<&Migration> = self.migrations.iter().filter(|m| m.version > current_version).collect();

        if pending.is_empty() {
            msg_debug!(Message::DatabaseUpToDate);
            return Ok(());
        }

        msg_debug!(Message::MigrationsFound(pending.len()));

        let tx = conn.transaction()?;

        for migration in pending {
            msg_debug!(Message::RunningMigration(migration.version, migration.name.to_string()));

            match (migration.up)(&tx) {
                Ok(()) => {
                    tx.execute(
                        "INSERT INTO migrations (version, name) VALUES (?1, ?2)",
                        params![migration.version, migration.name],
                    )?;
                    msg_debug!(Message::MigrationCompleted(migration.version));
                }
                Err(e) => {
                    msg_error!(Message::MigrationFailed(migration.version, e.to_string()));
                    return Err(e);
                }
            }
        }

        tx.commit()?;
        msg_debug!(Message::AllMigrationsCompleted);

        Ok(())
    }

    fn get_current_version(&self, conn: &Connection) -> Result<u32> {
        let version: Option<u32> = conn.query_row("SELECT MAX(version) FROM migrations", [], |row| row.get(0)).unwrap_or(Some(0));

        Ok(version.unwrap_or(0))
    }

    pub fn is_migration_applied(&self, conn: &Connection, version: u32) -> Result<bool> {
        let count: i32 = conn.query_row("SELECT COUNT(*) FROM migrations WHERE version = ?1", params![version], |row| row.get(0))?;

        Ok(count > 0)
    }

    pub fn get_migration_history(&self, conn: &Connection) -> Result<Vec<(u32, String, String)>> {
        let mut stmt = conn.prepare("SELECT version, name, applied_at FROM migrations ORDER BY version")?;

        let history = stmt
            .query_map([], |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(history)
    }
}

impl Default for MigrationManager {
    fn default() -> Self {
        Self::new()
    }
}

pub fn init_with_migrations(conn: &mut Connection) -> Result<()> {
    let manager = MigrationManager::new();
    manager.run_migrations(conn)?;
    Ok(())
}

pub fn get_db_version(conn: &Connection) -> Result<u32> {
    let manager = MigrationManager::new();
    manager.get_current_version(conn)
}

pub fn needs_migration(conn: &Connection) -> Result<bool> {
    let manager = MigrationManager::new();
    let current = manager.get_current_version(conn)?;
    let latest = manager.migrations.last().map(|m| m.version).unwrap_or(0);
    Ok(current < latest)
}
