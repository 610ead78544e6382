/// Every piece of user-facing text, rendered by the `Display` impl in `display.rs`.
#[derive(Debug, Clone)]
pub enum Message {
    // === TASK MESSAGES ===
    TaskCreated(i64, String), // id, title
    TaskUpdated(i64),
    TaskDeleted(i64),
    TaskStarted(i64),
    TaskStopped(i64, i64), // id, actual minutes
    TaskNotFound,
    TasksNotFound,
    TasksHeader,
    TasksSweptMissed(usize),
    TaskDetailsHeader(i64),

    // === VALIDATION MESSAGES ===
    ScheduledEndNotAfterStart,
    ActualEndNotAfterStart,
    TitleRequired,
    NegativeDuration,
    InvalidDate(String),
    InvalidTimestamp(String),
    InvalidStatus(String),
    InvalidRecurrencePattern(String),
    InvalidReminderType(String),
    InvalidRange(String, String), // start, end
    InvalidPeriod(String),
    InvalidGroupBy(String),
    InvalidSummaryKind(String),

    // === STATE TRANSITION MESSAGES ===
    CannotTransition(String, String), // from, to

    // === RECURRENCE MESSAGES ===
    OccurrencesGenerated(usize),
    NoOccurrencesGenerated,
    RecurringCleanedUp(usize),

    // === ROLLUP MESSAGES ===
    DayHeader(String),
    DaysHeader,
    NoDailyActivities,
    RollupResynced(String),
    FollowUpFailed(String, String), // step, error

    // === STATISTICS MESSAGES ===
    PeriodSummaryHeader(String, String),
    DailyBreakdownHeader,
    CategoryStatsHeader,
    TrendsHeader(u32),
    HeatmapHeader(String, String),
    GroupedReportHeader(String, String), // group by, total
    NoStatistics,

    // === PRODUCTIVITY SUMMARY MESSAGES ===
    ProductivitySummaryHeader(String, String, String), // kind, start, end
    ProductivitySummaryStored(String, String),         // kind, start

    // === REMINDER MESSAGES ===
    RemindersHeader,
    NoRemindersDue,
    ReminderText(String, String), // title, time

    // === TIME ENTRY MESSAGES ===
    TimeEntryAdded(i64),
    EntryEndNotAfterStart,

    // === EXPORT MESSAGES ===
    ExportCompleted(String),
    ExportNothing,

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigDeleted,
    ConfigModuleScheduler,
    ConfigModuleUser,
    PromptSelectModules,
    PromptHorizonDays,
    PromptRetentionDays,
    PromptReminderLookahead,
    PromptTrendsDays,
    PromptHeatmapDays,
    PromptOwnerId,

    // === MIGRATION MESSAGES ===
    MigrationsFound(usize),
    RunningMigration(u32, String),
    MigrationCompleted(u32),
    MigrationFailed(u32, String),
    AllMigrationsCompleted,
    DatabaseVersion(u32),
    DatabaseNeedsUpdate,
    DatabaseUpToDate,
    MigrationHistory,

    // === STORAGE MESSAGES ===
    StorageFailure,
}
