#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use taskroll::db::db::{Db, DB_FILE_NAME};
    use taskroll::db::tasks::{SortOrder, TaskQuery, Tasks};
    use taskroll::libs::calendar::FixedClock;
    use taskroll::libs::error::TrackerError;
    use taskroll::libs::manager::TaskManager;
    use taskroll::libs::rollup::DailyRollup;
    use taskroll::libs::task::{NewTask, RecurrencePattern, ReminderType, TaskFilter, TaskPatch, TaskStatus};
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct TaskTestContext {
        db: Db,
        clock: FixedClock,
        _temp_dir: TempDir,
    }

    impl TestContext for TaskTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db = Db::open(temp_dir.path().join(DB_FILE_NAME)).unwrap();
            TaskTestContext {
                db,
                clock: FixedClock(at(2025, 3, 3, 8, 0)),
                _temp_dir: temp_dir,
            }
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn task(title: &str, start: DateTime<Utc>, minutes: i64) -> NewTask {
        NewTask::new(title, start, start + Duration::minutes(minutes))
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_create_derives_fields(ctx: &mut TaskTestContext) {
        let manager = TaskManager::new(&ctx.db.conn, &ctx.clock);

        let outcome = manager.create(1, task("Write report", at(2025, 3, 3, 9, 0), 90).category("Work")).unwrap();
        let created = outcome.task;

        assert!(created.id > 0);
        assert_eq!(created.duration_minutes, 90);
        assert_eq!(created.status, TaskStatus::Scheduled);
        assert_eq!(created.category.as_deref(), Some("Work"));
        assert_eq!(created.reminder_type, Some(ReminderType::Notification));
        assert_eq!(created.recurrence_pattern, RecurrencePattern::None);
        assert_eq!(created.template_id, None);
        assert_eq!(created.created_at, ctx.clock.0);
        assert!(outcome.generated.is_empty());
        assert!(outcome.issues.is_empty());

        let stored = manager.get(1, created.id).unwrap();
        assert_eq!(stored, created);
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_create_rejects_invalid_input(ctx: &mut TaskTestContext) {
        let manager = TaskManager::new(&ctx.db.conn, &ctx.clock);
        let nine = at(2025, 3, 3, 9, 0);

        let empty_window = manager.create(1, NewTask::new("Nothing", nine, nine));
        assert!(matches!(empty_window, Err(TrackerError::Validation(_))));

        let backwards = manager.create(1, NewTask::new("Backwards", nine, nine - Duration::minutes(5)));
        assert!(matches!(backwards, Err(TrackerError::Validation(_))));

        let untitled = manager.create(1, task("   ", nine, 30));
        assert!(matches!(untitled, Err(TrackerError::Validation(_))));

        let tasks = Tasks::new(&ctx.db.conn);
        assert_eq!(tasks.count(&TaskQuery::for_owner(1)).unwrap(), 0);
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_other_owner_sees_not_found(ctx: &mut TaskTestContext) {
        let manager = TaskManager::new(&ctx.db.conn, &ctx.clock);
        let created = manager.create(1, task("Private", at(2025, 3, 3, 9, 0), 30)).unwrap().task;

        assert!(matches!(manager.get(2, created.id), Err(TrackerError::NotFound { .. })));
        assert!(matches!(manager.delete(2, created.id), Err(TrackerError::NotFound { .. })));
        assert!(matches!(
            manager.update(2, created.id, TaskPatch::default()),
            Err(TrackerError::NotFound { .. })
        ));
        assert!(manager.get(1, created.id).is_ok());
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_update_fields_and_duration(ctx: &mut TaskTestContext) {
        let manager = TaskManager::new(&ctx.db.conn, &ctx.clock);
        let created = manager.create(1, task("Draft", at(2025, 3, 3, 9, 0), 60)).unwrap().task;

        let patch = TaskPatch {
            title: Some("Final".to_string()),
            notes: Some(Some("bring slides".to_string())),
            productivity_score: Some(Some(8.0)),
            ..TaskPatch::reschedule(at(2025, 3, 3, 10, 0), at(2025, 3, 3, 10, 45))
        };
        let updated = manager.update(1, created.id, patch).unwrap();

        assert_eq!(updated.title, "Final");
        assert_eq!(updated.notes.as_deref(), Some("bring slides"));
        assert_eq!(updated.productivity_score, Some(8.0));
        assert_eq!(updated.duration_minutes, 45);

        let bad = manager.update(1, created.id, TaskPatch::reschedule(at(2025, 3, 3, 11, 0), at(2025, 3, 3, 11, 0)));
        assert!(matches!(bad, Err(TrackerError::Validation(_))));
        assert_eq!(manager.get(1, created.id).unwrap().title, "Final");
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_status_patch_follows_state_machine(ctx: &mut TaskTestContext) {
        let manager = TaskManager::new(&ctx.db.conn, &ctx.clock);
        let created = manager.create(1, task("Gym", at(2025, 3, 3, 18, 0), 60)).unwrap().task;

        let to_completed = TaskPatch {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        let err = manager.update(1, created.id, to_completed).unwrap_err();
        assert!(matches!(
            err,
            TrackerError::InvalidStateTransition {
                from: TaskStatus::Scheduled,
                to: TaskStatus::Completed
            }
        ));

        let to_missed = TaskPatch {
            status: Some(TaskStatus::Missed),
            ..Default::default()
        };
        assert_eq!(manager.update(1, created.id, to_missed).unwrap().status, TaskStatus::Missed);

        let back = TaskPatch {
            status: Some(TaskStatus::Scheduled),
            ..Default::default()
        };
        assert!(matches!(
            manager.update(1, created.id, back),
            Err(TrackerError::InvalidStateTransition { .. })
        ));
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_list_filters_and_order(ctx: &mut TaskTestContext) {
        let manager = TaskManager::new(&ctx.db.conn, &ctx.clock);
        let late = manager.create(1, task("Late", at(2025, 3, 4, 15, 0), 30).category("Work")).unwrap().task;
        let early = manager.create(1, task("Early", at(2025, 3, 3, 9, 0), 30).category("Work")).unwrap().task;
        let home = manager.create(1, task("Laundry", at(2025, 3, 3, 19, 0), 30).category("Home")).unwrap().task;
        manager.create(2, task("Someone else", at(2025, 3, 3, 9, 0), 30)).unwrap();

        let all = manager.list(1, TaskFilter::default()).unwrap();
        let ids: Vec<i64> = all.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![early.id, home.id, late.id]);

        let work = manager
            .list(
                1,
                TaskFilter {
                    category: Some("Work".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(work.len(), 2);

        let monday = manager
            .list(
                1,
                TaskFilter {
                    scheduled_from: Some(at(2025, 3, 3, 0, 0)),
                    scheduled_to: Some(at(2025, 3, 3, 23, 59)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(monday.iter().map(|t| t.id).collect::<Vec<_>>(), vec![early.id, home.id]);
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_query_paging_and_descending_order(ctx: &mut TaskTestContext) {
        let manager = TaskManager::new(&ctx.db.conn, &ctx.clock);
        for hour in 9..14 {
            manager.create(1, task(&format!("Slot {}", hour), at(2025, 3, 3, hour, 0), 30)).unwrap();
        }

        let tasks = Tasks::new(&ctx.db.conn);
        let page = tasks
            .find(&TaskQuery {
                order: SortOrder::Descending,
                limit: Some(2),
                skip: Some(1),
                ..TaskQuery::for_owner(1)
            })
            .unwrap();
        let titles: Vec<&str> = page.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Slot 12", "Slot 11"]);
        assert_eq!(tasks.count(&TaskQuery::for_owner(1)).unwrap(), 5);
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_delete_removes_task_and_reference(ctx: &mut TaskTestContext) {
        let manager = TaskManager::new(&ctx.db.conn, &ctx.clock);
        let created = manager.create(1, task("Dentist", at(2025, 3, 3, 14, 0), 60)).unwrap().task;
        let day = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();

        let deleted = manager.delete(1, created.id).unwrap();
        assert_eq!(deleted.id, created.id);
        assert!(matches!(manager.get(1, created.id), Err(TrackerError::NotFound { .. })));
        assert!(matches!(manager.delete(1, created.id), Err(TrackerError::NotFound { .. })));

        let activity = DailyRollup::new(&ctx.db.conn, &ctx.clock).get_or_create(1, day).unwrap();
        assert_eq!(activity.total_tasks, 0);
        assert!(activity.tasks.is_empty());
    }
}
