#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use taskroll::db::db::{Db, DB_FILE_NAME};
    use taskroll::libs::calendar::FixedClock;
    use taskroll::libs::export::{ExportData, ExportFormat, Exporter};
    use taskroll::libs::manager::TaskManager;
    use taskroll::libs::task::NewTask;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct ExportTestContext {
        db: Db,
        temp_dir: TempDir,
    }

    impl TestContext for ExportTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db = Db::open(temp_dir.path().join(DB_FILE_NAME)).unwrap();
            ExportTestContext { db, temp_dir }
        }
    }

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, d, h, 0, 0).unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn seed(ctx: &ExportTestContext) {
        let clock = FixedClock(at(1, 7));
        let manager = TaskManager::new(&ctx.db.conn, &clock);
        manager
            .create(1, NewTask::new("Write report", at(3, 9), at(3, 10)).category("Work").score(7.0))
            .unwrap();
        manager.create(1, NewTask::new("Gym", at(4, 18), at(4, 19))).unwrap();
        manager.create(1, NewTask::new("Out of range", at(9, 9), at(9, 10))).unwrap();
        manager.create(2, NewTask::new("Someone else", at(3, 9), at(3, 10))).unwrap();
    }

    #[test_context(ExportTestContext)]
    #[test]
    fn test_export_tasks_csv(ctx: &mut ExportTestContext) {
        seed(ctx);
        let path = ctx.temp_dir.path().join("tasks.csv");
        let exporter = Exporter::new(ExportFormat::Csv, Some(path.clone()));

        let written = exporter.export(&ctx.db.conn, 1, ExportData::Tasks, date(3), date(4)).unwrap();
        assert_eq!(written, 2);
        assert_eq!(exporter.output_path(), path.as_path());

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "ID");
        assert_eq!(&headers[1], "Title");

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "Write report");
        assert_eq!(&rows[0][2], "Work");
        assert_eq!(&rows[0][6], "60");
        assert_eq!(&rows[0][9], "7");
        assert_eq!(&rows[1][1], "Gym");
        assert_eq!(&rows[1][2], "");
    }

    #[test_context(ExportTestContext)]
    #[test]
    fn test_export_tasks_json(ctx: &mut ExportTestContext) {
        seed(ctx);
        let path = ctx.temp_dir.path().join("tasks.json");
        let exporter = Exporter::new(ExportFormat::Json, Some(path.clone()));

        assert_eq!(exporter.export(&ctx.db.conn, 1, ExportData::Tasks, date(1), date(31)).unwrap(), 3);

        let json: Vec<serde_json::Value> = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json.len(), 3);
        assert_eq!(json[0]["title"], "Write report");
        assert_eq!(json[0]["durationMinutes"], 60);
        assert_eq!(json[2]["title"], "Out of range");
    }

    #[test_context(ExportTestContext)]
    #[test]
    fn test_export_days(ctx: &mut ExportTestContext) {
        seed(ctx);
        let path = ctx.temp_dir.path().join("days.csv");
        let exporter = Exporter::new(ExportFormat::Csv, Some(path.clone()));

        let written = exporter.export(&ctx.db.conn, 1, ExportData::Days, date(1), date(5)).unwrap();
        assert_eq!(written, 2);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let dates: Vec<String> = reader.records().map(|r| r.unwrap()[0].to_string()).collect();
        assert_eq!(dates, vec!["2025-03-04", "2025-03-03"]);
    }

    #[test_context(ExportTestContext)]
    #[test]
    fn test_empty_and_invalid_ranges(ctx: &mut ExportTestContext) {
        seed(ctx);
        let path = ctx.temp_dir.path().join("empty.json");
        let exporter = Exporter::new(ExportFormat::Json, Some(path.clone()));

        let written = exporter.export(&ctx.db.conn, 1, ExportData::Tasks, date(20), date(25)).unwrap();
        assert_eq!(written, 0);
        assert!(!path.exists());

        assert!(exporter.export(&ctx.db.conn, 1, ExportData::Tasks, date(5), date(3)).is_err());
    }
}
