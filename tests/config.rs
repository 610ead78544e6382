#[cfg(test)]
mod tests {
    use taskroll::libs::config::{Config, SchedulerConfig, UserConfig, CONFIG_FILE_NAME};
    use taskroll::libs::data_storage::DataStorage;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct ConfigTestContext {
        storage: DataStorage,
        temp_dir: TempDir,
    }

    impl TestContext for ConfigTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let storage = DataStorage::at(temp_dir.path().join("taskroll"));
            ConfigTestContext { storage, temp_dir }
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.scheduler.is_none());
        assert!(config.user.is_none());
        assert_eq!(config.owner_id(), 1);

        let scheduler = config.scheduler_or_default();
        assert_eq!(scheduler.recurrence_horizon_days, 30);
        assert_eq!(scheduler.cleanup_retention_days, 30);
        assert_eq!(scheduler.reminder_lookahead_minutes, 15);
        assert_eq!(scheduler.trends_days, 30);
        assert_eq!(scheduler.heatmap_days, 365);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_missing_file_reads_as_defaults(ctx: &mut ConfigTestContext) {
        let config = Config::read_from(&ctx.storage).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_save_and_read_back(ctx: &mut ConfigTestContext) {
        let config = Config {
            scheduler: Some(SchedulerConfig {
                recurrence_horizon_days: 14,
                ..Default::default()
            }),
            user: Some(UserConfig { owner_id: 7 }),
        };
        config.save_to(&ctx.storage).unwrap();

        let path = ctx.temp_dir.path().join("taskroll").join(CONFIG_FILE_NAME);
        assert!(path.exists());

        let loaded = Config::read_from(&ctx.storage).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.owner_id(), 7);
        assert_eq!(loaded.scheduler_or_default().recurrence_horizon_days, 14);
        assert_eq!(loaded.scheduler_or_default().reminder_lookahead_minutes, 15);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_partial_file_keeps_other_sections_default(ctx: &mut ConfigTestContext) {
        let path = ctx.storage.get_path(CONFIG_FILE_NAME).unwrap();
        std::fs::write(&path, r#"{ "user": { "owner_id": 3 } }"#).unwrap();

        let config = Config::read_from(&ctx.storage).unwrap();
        assert_eq!(config.owner_id(), 3);
        assert!(config.scheduler.is_none());
        assert_eq!(config.scheduler_or_default(), SchedulerConfig::default());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_malformed_file_is_an_error(ctx: &mut ConfigTestContext) {
        let path = ctx.storage.get_path(CONFIG_FILE_NAME).unwrap();
        std::fs::write(&path, "not json").unwrap();

        assert!(Config::read_from(&ctx.storage).is_err());
    }
}
