#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use taskroll::db::db::{Db, DB_FILE_NAME};
    use taskroll::db::tasks::{TaskQuery, Tasks};
    use taskroll::libs::calendar::FixedClock;
    use taskroll::libs::manager::TaskManager;
    use taskroll::libs::recurrence::RecurrenceExpander;
    use taskroll::libs::rollup::DailyRollup;
    use taskroll::libs::task::{NewTask, RecurrencePattern, Task, TaskPatch, TaskStatus};
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct RecurrenceTestContext {
        db: Db,
        _temp_dir: TempDir,
    }

    impl TestContext for RecurrenceTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db = Db::open(temp_dir.path().join(DB_FILE_NAME)).unwrap();
            RecurrenceTestContext { db, _temp_dir: temp_dir }
        }
    }

    fn day_one() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap()
    }

    fn standup(pattern: RecurrencePattern) -> NewTask {
        NewTask::new("Standup", day_one(), day_one() + Duration::minutes(15)).recurring(pattern)
    }

    fn total(ctx: &RecurrenceTestContext) -> i64 {
        Tasks::new(&ctx.db.conn).count(&TaskQuery::for_owner(1)).unwrap()
    }

    #[test_context(RecurrenceTestContext)]
    #[test]
    fn test_daily_template_fills_horizon(ctx: &mut RecurrenceTestContext) {
        let clock = FixedClock(day_one());
        let outcome = TaskManager::new(&ctx.db.conn, &clock).create(1, standup(RecurrencePattern::Daily)).unwrap();
        let template = outcome.task;

        assert!(template.is_template());
        assert_eq!(outcome.generated.len(), 30);
        assert_eq!(total(ctx), 31);

        for (k, occurrence) in outcome.generated.iter().enumerate() {
            let expected = day_one() + Duration::days(k as i64 + 1);
            assert_eq!(occurrence.scheduled_start, expected);
            assert_eq!(occurrence.scheduled_end - occurrence.scheduled_start, Duration::minutes(15));
            assert_eq!(occurrence.template_id, Some(template.id));
            assert_eq!(occurrence.status, TaskStatus::Scheduled);
            assert!(occurrence.is_recurring);
            assert!(!occurrence.is_template());
        }
    }

    #[test_context(RecurrenceTestContext)]
    #[test]
    fn test_expansion_is_idempotent(ctx: &mut RecurrenceTestContext) {
        let clock = FixedClock(day_one());
        let template = TaskManager::new(&ctx.db.conn, &clock).create(1, standup(RecurrencePattern::Daily)).unwrap().task;

        let expander = RecurrenceExpander::new(&ctx.db.conn, &clock);
        let again = expander.expand_default(&template, 30).unwrap();
        assert!(again.is_empty());
        assert_eq!(total(ctx), 31);

        let further = expander.expand_default(&template, 32).unwrap();
        assert_eq!(further.len(), 2);
        assert_eq!(total(ctx), 33);
    }

    #[test_context(RecurrenceTestContext)]
    #[test]
    fn test_weekly_template_generates_four(ctx: &mut RecurrenceTestContext) {
        let clock = FixedClock(day_one());
        let outcome = TaskManager::new(&ctx.db.conn, &clock).create(1, standup(RecurrencePattern::Weekly)).unwrap();

        let starts: Vec<DateTime<Utc>> = outcome.generated.iter().map(|t| t.scheduled_start).collect();
        assert_eq!(
            starts,
            (1..=4).map(|w| day_one() + Duration::weeks(w)).collect::<Vec<_>>()
        );
    }

    #[test_context(RecurrenceTestContext)]
    #[test]
    fn test_monthly_steps_clamp_to_month_end(ctx: &mut RecurrenceTestContext) {
        let jan31 = Utc.with_ymd_and_hms(2025, 1, 31, 10, 0, 0).unwrap();
        let clock = FixedClock(jan31);
        let input = NewTask::new("Invoices", jan31, jan31 + Duration::minutes(60)).recurring(RecurrencePattern::Monthly);
        let template = TaskManager::new(&ctx.db.conn, &clock)
            .with_horizon_days(0)
            .create(1, input)
            .unwrap()
            .task;

        let horizon = Utc.with_ymd_and_hms(2025, 5, 31, 23, 0, 0).unwrap();
        let generated = RecurrenceExpander::new(&ctx.db.conn, &clock).expand(&template, horizon).unwrap();

        let days: Vec<NaiveDate> = generated.iter().map(|t| t.scheduled_start.date_naive()).collect();
        assert_eq!(
            days,
            vec![
                NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
                NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
                NaiveDate::from_ymd_opt(2025, 4, 30).unwrap(),
                NaiveDate::from_ymd_opt(2025, 5, 31).unwrap(),
            ]
        );
        assert!(generated.iter().all(|t| t.duration_minutes == 60));
        assert!(generated.iter().all(|t| t.scheduled_end - t.scheduled_start == Duration::minutes(60)));
    }

    #[test_context(RecurrenceTestContext)]
    #[test]
    fn test_occurrence_lands_in_its_day(ctx: &mut RecurrenceTestContext) {
        let clock = FixedClock(day_one());
        let outcome = TaskManager::new(&ctx.db.conn, &clock).create(1, standup(RecurrencePattern::Daily)).unwrap();

        let day_six = (day_one() + Duration::days(5)).date_naive();
        let detail = DailyRollup::new(&ctx.db.conn, &clock).day_detail(1, day_six).unwrap();

        assert_eq!(detail.activity.total_tasks, 1);
        assert_eq!(detail.tasks.len(), 1);
        assert_eq!(detail.tasks[0].title, "Standup");
        assert_eq!(detail.tasks[0].template_id, Some(outcome.task.id));
        assert_eq!(detail.stats.total_scheduled_minutes, 15);
    }

    #[test_context(RecurrenceTestContext)]
    #[test]
    fn test_process_recurring_does_not_backfill(ctx: &mut RecurrenceTestContext) {
        let clock = FixedClock(day_one());
        let manager = TaskManager::new(&ctx.db.conn, &clock).with_horizon_days(0);
        let template = manager.create(1, standup(RecurrencePattern::Daily)).unwrap().task;
        manager
            .create(1, NewTask::new("One-off", day_one(), day_one() + Duration::minutes(30)))
            .unwrap();
        assert_eq!(total(ctx), 2);

        let from = day_one() + Duration::days(10);
        let to = day_one() + Duration::days(14);
        let expander = RecurrenceExpander::new(&ctx.db.conn, &clock);
        let generated = expander.process_recurring(1, from, to).unwrap();

        assert_eq!(generated.len(), 5);
        assert!(generated.iter().all(|t| t.scheduled_start >= from && t.scheduled_start <= to));
        assert!(generated.iter().all(|t| t.template_id == Some(template.id)));

        assert!(expander.process_recurring(1, from, to).unwrap().is_empty());
        assert_eq!(total(ctx), 7);
    }

    #[test_context(RecurrenceTestContext)]
    #[test]
    fn test_occurrences_are_not_templates(ctx: &mut RecurrenceTestContext) {
        let clock = FixedClock(day_one());
        TaskManager::new(&ctx.db.conn, &clock).create(1, standup(RecurrencePattern::Weekly)).unwrap();

        let later = day_one() + Duration::days(60);
        let generated = RecurrenceExpander::new(&ctx.db.conn, &clock)
            .process_recurring(1, day_one(), later)
            .unwrap();

        // Weeks 5 through 8; existing occurrences never seed their own series.
        assert_eq!(generated.len(), 4);
        assert_eq!(total(ctx), 9);
    }

    #[test_context(RecurrenceTestContext)]
    #[test]
    fn test_cleanup_removes_old_finished_occurrences(ctx: &mut RecurrenceTestContext) {
        let clock = FixedClock(day_one());
        let generated: Vec<Task> = TaskManager::new(&ctx.db.conn, &clock)
            .create(1, standup(RecurrencePattern::Daily))
            .unwrap()
            .generated;
        let (done, skipped) = (&generated[0], &generated[1]);

        let start = FixedClock(done.scheduled_start);
        TaskManager::new(&ctx.db.conn, &start).start(1, done.id).unwrap();
        let stop = FixedClock(done.scheduled_end);
        TaskManager::new(&ctx.db.conn, &stop).stop(1, done.id).unwrap();
        let patch = TaskPatch {
            status: Some(TaskStatus::Missed),
            ..Default::default()
        };
        TaskManager::new(&ctx.db.conn, &stop).update(1, skipped.id, patch).unwrap();

        let done_day = done.scheduled_start.date_naive();
        let before = DailyRollup::new(&ctx.db.conn, &stop).get_or_create(1, done_day).unwrap();
        assert_eq!(before.completed_tasks, 1);
        assert_eq!(before.total_effective_minutes, 15);

        let much_later = FixedClock(day_one() + Duration::days(40));
        let removed = RecurrenceExpander::new(&ctx.db.conn, &much_later).cleanup_old_recurring(1, 30).unwrap();
        assert_eq!(removed, 2);
        assert_eq!(total(ctx), 29);

        let after = DailyRollup::new(&ctx.db.conn, &much_later).get_or_create(1, done_day).unwrap();
        assert_eq!(after.total_tasks, 0);
        assert_eq!(after.completed_tasks, 0);
        assert_eq!(after.total_effective_minutes, 0);
        assert!(after.tasks.is_empty());
    }

    #[test_context(RecurrenceTestContext)]
    #[test]
    fn test_enabling_recurrence_on_update_expands(ctx: &mut RecurrenceTestContext) {
        let clock = FixedClock(day_one());
        let manager = TaskManager::new(&ctx.db.conn, &clock);
        let task = manager
            .create(1, NewTask::new("Standup", day_one(), day_one() + Duration::minutes(15)))
            .unwrap()
            .task;
        assert_eq!(total(ctx), 1);

        let patch = TaskPatch {
            is_recurring: Some(true),
            recurrence_pattern: Some(RecurrencePattern::Daily),
            ..Default::default()
        };
        let template = manager.update(1, task.id, patch).unwrap();
        assert!(template.is_template());
        assert_eq!(total(ctx), 31);

        let patch = TaskPatch {
            title: Some("Daily standup".to_string()),
            ..Default::default()
        };
        manager.update(1, task.id, patch).unwrap();
        assert_eq!(total(ctx), 31);

        let patch = TaskPatch {
            recurrence_pattern: Some(RecurrencePattern::Weekly),
            ..Default::default()
        };
        manager.update(1, task.id, patch).unwrap();
        assert_eq!(total(ctx), 35);
    }
}
