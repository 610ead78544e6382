#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use rusqlite::Connection;
    use std::path::PathBuf;
    use taskroll::db::db::{Db, DB_FILE_NAME};
    use taskroll::db::migrations::{get_db_version, needs_migration, MigrationManager};
    use taskroll::libs::calendar::FixedClock;
    use taskroll::libs::manager::TaskManager;
    use taskroll::libs::task::NewTask;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct MigrationTestContext {
        db_path: PathBuf,
        _temp_dir: TempDir,
    }

    impl TestContext for MigrationTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            MigrationTestContext {
                db_path: temp_dir.path().join(DB_FILE_NAME),
                _temp_dir: temp_dir,
            }
        }
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_migrations_run_on_open(ctx: &mut MigrationTestContext) {
        let db = Db::open(&ctx.db_path).unwrap();

        assert_eq!(get_db_version(&db.conn).unwrap(), 3);
        assert!(!needs_migration(&db.conn).unwrap());

        for table in ["tasks", "daily_activities", "daily_activity_tasks", "productivity_summaries", "time_entries"] {
            let found: i64 = db
                .conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(found, 1, "missing table {}", table);
        }
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_migration_history(ctx: &mut MigrationTestContext) {
        let mut conn = Connection::open(&ctx.db_path).unwrap();
        let manager = MigrationManager::new();

        manager.run_migrations(&mut conn).unwrap();

        let history = manager.get_migration_history(&conn).unwrap();
        let versions: Vec<u32> = history.iter().map(|(version, _, _)| *version).collect();
        assert_eq!(versions, vec![1, 2, 3]);
        assert_eq!(history[2].1, "add_time_entries");
        assert!(manager.is_migration_applied(&conn, 2).unwrap());
        assert!(!manager.is_migration_applied(&conn, 4).unwrap());
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_migration_idempotency(ctx: &mut MigrationTestContext) {
        let mut conn = Connection::open(&ctx.db_path).unwrap();
        let manager = MigrationManager::default();

        assert_eq!(get_db_version(&conn).unwrap(), 0);
        assert!(needs_migration(&conn).unwrap());

        manager.run_migrations(&mut conn).unwrap();
        let version1 = get_db_version(&conn).unwrap();
        manager.run_migrations(&mut conn).unwrap();
        let version2 = get_db_version(&conn).unwrap();

        assert_eq!(version1, version2);
        assert_eq!(manager.get_migration_history(&conn).unwrap().len(), 3);
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_data_survives_reopen(ctx: &mut MigrationTestContext) {
        let nine = Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap();
        let clock = FixedClock(nine);
        let id = {
            let db = Db::open(&ctx.db_path).unwrap();
            TaskManager::new(&db.conn, &clock)
                .create(1, NewTask::new("Persisted", nine, nine + Duration::minutes(20)))
                .unwrap()
                .task
                .id
        };

        let db = Db::open(&ctx.db_path).unwrap();
        let task = TaskManager::new(&db.conn, &clock).get(1, id).unwrap();
        assert_eq!(task.title, "Persisted");
        assert_eq!(task.scheduled_start, nine);
    }
}
