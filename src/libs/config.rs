//! Configuration management for taskroll.
//!
//! Settings live in `config.json` next to the database in the platform data
//! directory (see [`DataStorage`]). Every section is optional; a missing
//! file or section means defaults. `taskroll init` runs an interactive
//! wizard over the sections.
//!
//! ```rust,no_run
//! use taskroll::libs::config::Config;
//!
//! let config = Config::read()?;
//! let scheduler = config.scheduler_or_default();
//! println!("Occurrences are generated {} days ahead", scheduler.recurrence_horizon_days);
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::libs::recurrence::{DEFAULT_HORIZON_DAYS, DEFAULT_RETENTION_DAYS};
use crate::libs::reminders::DEFAULT_LOOKAHEAD_MINUTES;
use crate::libs::stats::DEFAULT_TRENDS_DAYS;
use crate::libs::task::OwnerId;
use crate::msg_print;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Input, MultiSelect};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};

pub const CONFIG_FILE_NAME: &str = "config.json";

/// A section offered by the setup wizard.
#[derive(Debug, Clone)]
pub struct ConfigModule {
    pub key: String,
    pub name: String,
}

/// Scheduling engine settings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SchedulerConfig {
    /// Days ahead that recurring templates are expanded when created.
    pub recurrence_horizon_days: i64,

    /// Finished recurring tasks older than this many days are removed by cleanup.
    pub cleanup_retention_days: i64,

    /// Reminders are due for tasks starting within this many minutes.
    pub reminder_lookahead_minutes: i64,

    /// Trailing window of `stats trends`.
    pub trends_days: u32,

    /// Trailing window of `stats heatmap`.
    pub heatmap_days: i64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            recurrence_horizon_days: DEFAULT_HORIZON_DAYS,
            cleanup_retention_days: DEFAULT_RETENTION_DAYS,
            reminder_lookahead_minutes: DEFAULT_LOOKAHEAD_MINUTES,
            trends_days: DEFAULT_TRENDS_DAYS,
            heatmap_days: 365,
        }
    }
}

/// Identity of the local user.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UserConfig {
    /// Owner all CLI operations act as.
    pub owner_id: OwnerId,
}

impl Default for UserConfig {
    fn default() -> Self {
        UserConfig { owner_id: 1 }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<SchedulerConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserConfig>,
}

impl Config {
    /// Reads the configuration from the default location.
    pub fn read() -> Result<Config> {
        Self::read_from(&DataStorage::new())
    }

    /// Reads the configuration from `storage`, returning defaults when the
    /// file does not exist.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be read or parsed.
    pub fn read_from(storage: &DataStorage) -> Result<Config> {
        let config_file_path = storage.get_path(CONFIG_FILE_NAME)?;
        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&DataStorage::new())
    }

    /// Writes the configuration as pretty-printed JSON, replacing any existing file.
    pub fn save_to(&self, storage: &DataStorage) -> Result<()> {
        let config_file_path = storage.get_path(CONFIG_FILE_NAME)?;
        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    pub fn scheduler_or_default(&self) -> SchedulerConfig {
        self.scheduler.clone().unwrap_or_default()
    }

    pub fn owner_id(&self) -> OwnerId {
        self.user.clone().unwrap_or_default().owner_id
    }

    /// Interactive setup wizard. Current values are offered as defaults;
    /// sections the user does not select are left unchanged.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let modules = vec![
            ConfigModule {
                key: "scheduler".to_string(),
                name: Message::ConfigModuleScheduler.to_string(),
            },
            ConfigModule {
                key: "user".to_string(),
                name: Message::ConfigModuleUser.to_string(),
            },
        ];

        let selected = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectModules.to_string())
            .items(&modules.iter().map(|module| &module.name).collect::<Vec<_>>())
            .interact()?;

        for &selection in &selected {
            match modules[selection].key.as_str() {
                "scheduler" => {
                    let default = config.scheduler_or_default();
                    msg_print!(Message::ConfigModuleScheduler);
                    config.scheduler = Some(SchedulerConfig {
                        recurrence_horizon_days: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptHorizonDays.to_string())
                            .default(default.recurrence_horizon_days)
                            .interact_text()?,
                        cleanup_retention_days: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptRetentionDays.to_string())
                            .default(default.cleanup_retention_days)
                            .interact_text()?,
                        reminder_lookahead_minutes: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptReminderLookahead.to_string())
                            .default(default.reminder_lookahead_minutes)
                            .interact_text()?,
                        trends_days: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptTrendsDays.to_string())
                            .default(default.trends_days)
                            .interact_text()?,
                        heatmap_days: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptHeatmapDays.to_string())
                            .default(default.heatmap_days)
                            .interact_text()?,
                    });
                }
                "user" => {
                    let default = config.user.clone().unwrap_or_default();
                    msg_print!(Message::ConfigModuleUser);
                    config.user = Some(UserConfig {
                        owner_id: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptOwnerId.to_string())
                            .default(default.owner_id)
                            .interact_text()?,
                    });
                }
                _ => {}
            }
        }

        Ok(config)
    }
}
