#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use taskroll::db::db::{Db, DB_FILE_NAME};
    use taskroll::db::summaries::Summaries;
    use taskroll::libs::calendar::FixedClock;
    use taskroll::libs::manager::TaskManager;
    use taskroll::libs::summary::{ProductivitySummaries, SummaryKind};
    use taskroll::libs::task::{NewTask, Task};
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct SummaryTestContext {
        db: Db,
        _temp_dir: TempDir,
    }

    impl TestContext for SummaryTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db = Db::open(temp_dir.path().join(DB_FILE_NAME)).unwrap();
            SummaryTestContext { db, _temp_dir: temp_dir }
        }
    }

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, d, h, 0, 0).unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn schedule(ctx: &SummaryTestContext, input: NewTask) -> Task {
        TaskManager::new(&ctx.db.conn, &FixedClock(at(1, 7))).create(1, input).unwrap().task
    }

    fn complete(ctx: &SummaryTestContext, task: &Task, minutes: i64) {
        TaskManager::new(&ctx.db.conn, &FixedClock(task.scheduled_start)).start(1, task.id).unwrap();
        TaskManager::new(&ctx.db.conn, &FixedClock(task.scheduled_start + Duration::minutes(minutes)))
            .stop(1, task.id)
            .unwrap();
    }

    fn seed(ctx: &SummaryTestContext) {
        let w1 = schedule(ctx, NewTask::new("Spec review", at(3, 9), at(3, 10)).category("Work").score(9.0));
        let w2 = schedule(ctx, NewTask::new("Code review", at(4, 9), at(4, 10)).category("Work").score(6.0));
        schedule(ctx, NewTask::new("Groceries", at(5, 18), at(5, 19)).category("Personal").score(3.0));
        let loose = schedule(ctx, NewTask::new("Inbox zero", at(9, 20), at(9, 21)));
        let next_week = schedule(ctx, NewTask::new("Retro", at(10, 9), at(10, 10)).category("Work"));
        complete(ctx, &w1, 50);
        complete(ctx, &w2, 30);
        complete(ctx, &loose, 20);
        complete(ctx, &next_week, 45);
    }

    #[test_context(SummaryTestContext)]
    #[test]
    fn test_weekly_summary(ctx: &mut SummaryTestContext) {
        seed(ctx);
        let clock = FixedClock(at(10, 8));
        let summary = ProductivitySummaries::new(&ctx.db.conn, &clock)
            .build(1, SummaryKind::Weekly, date(5))
            .unwrap();

        assert!(summary.id > 0);
        assert_eq!(summary.period_start, date(3));
        assert_eq!(summary.period_end, date(10));
        assert_eq!(summary.total_productive_time, 100);
        assert_eq!(summary.average_productivity, 6.0);

        let names: Vec<&str> = summary.category_breakdown.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Personal", "Work", "uncategorized"]);
        let work = &summary.category_breakdown[1];
        assert_eq!(work.total_tasks, 2);
        assert_eq!(work.completed_tasks, 2);
        assert_eq!(work.productive_minutes, 80);

        assert_eq!(summary.most_productive_category.as_deref(), Some("Work"));
        assert_eq!(summary.least_productive_category.as_deref(), Some("Personal"));
    }

    #[test_context(SummaryTestContext)]
    #[test]
    fn test_rebuild_replaces_stored_summary(ctx: &mut SummaryTestContext) {
        seed(ctx);
        let clock = FixedClock(at(10, 8));
        let summaries = ProductivitySummaries::new(&ctx.db.conn, &clock);
        let first = summaries.build(1, SummaryKind::Weekly, date(3)).unwrap();

        let extra = schedule(ctx, NewTask::new("Late push", at(8, 9), at(8, 10)).category("Work"));
        complete(ctx, &extra, 60);
        let second = summaries.build(1, SummaryKind::Weekly, date(9)).unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.total_productive_time, 160);
        assert_eq!(summaries.list(1, SummaryKind::Weekly).unwrap().len(), 1);
        assert_eq!(summaries.find(1, SummaryKind::Weekly, date(4)).unwrap(), Some(second));
        assert_eq!(Summaries::new(&ctx.db.conn).count(1).unwrap(), 1);
    }

    #[test_context(SummaryTestContext)]
    #[test]
    fn test_monthly_summary_covers_calendar_month(ctx: &mut SummaryTestContext) {
        seed(ctx);
        let clock = FixedClock(at(20, 8));
        let summaries = ProductivitySummaries::new(&ctx.db.conn, &clock);
        let monthly = summaries.build(1, SummaryKind::Monthly, date(20)).unwrap();

        assert_eq!(monthly.period_start, date(1));
        assert_eq!(monthly.period_end, NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
        assert_eq!(monthly.total_productive_time, 145);
        assert_eq!(monthly.most_productive_category.as_deref(), Some("Work"));

        assert!(summaries.find(1, SummaryKind::Weekly, date(20)).unwrap().is_none());
        assert!(summaries.find(2, SummaryKind::Monthly, date(20)).unwrap().is_none());
    }

    #[test_context(SummaryTestContext)]
    #[test]
    fn test_empty_period(ctx: &mut SummaryTestContext) {
        let clock = FixedClock(at(10, 8));
        let summary = ProductivitySummaries::new(&ctx.db.conn, &clock)
            .build(1, SummaryKind::Weekly, date(10))
            .unwrap();

        assert_eq!(summary.total_productive_time, 0);
        assert_eq!(summary.average_productivity, 0.0);
        assert!(summary.category_breakdown.is_empty());
        assert_eq!(summary.most_productive_category, None);
        assert_eq!(summary.least_productive_category, None);
    }
}
