//! Configuration management for teumnirm.
//!
//! Settings live in a single JSON file inside the platform data directory:
//!
//! - **Windows**: `%LOCALAPPDATA%\teumnirm\config.json`
//! - **macOS**: `~/Library/Application Support/teumnirm/config.json`
//! - **Linux**: `~/.local/share/teumnirm/config.json`
//!
//! A missing file means defaults. The file is read once at startup and
//! written through when the user changes the break interval at runtime. The
//! run state itself (paused or not) is never stored; every launch starts
//! monitoring.
//!
//! ## Modules
//!
//! - **Timer**: break interval, idle thresholds, auto-dismiss and output toggles
//! - **Hue**: bridge address, API username and the lights to flash
//!
//! ```rust,no_run
//! use teumnirm::libs::config::Config;
//!
//! let mut config = Config::read()?;
//! config.hue = None;
//! config.save()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::api::hue::HueConfig;
use crate::libs::controller::TimerSettings;
use crate::libs::messages::Message;
use crate::{msg_bail_anyhow, msg_print};
use anyhow::Result;
use chrono::TimeDelta;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration file name inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// A module offered by the interactive setup wizard.
#[derive(Debug, Clone)]
pub struct ConfigModule {
    /// Routing key used by [`Config::init`]
    pub key: String,
    /// Name shown in the selection list
    pub name: String,
}

/// Timing and output settings of the break reminder.
///
/// Durations are stored as plain integers so the file stays easy to edit by
/// hand: seconds for the user-facing intervals, milliseconds for the two
/// internal cadences.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TimerConfig {
    /// Continuous usage in seconds before a break is due.
    pub break_interval: u64,

    /// Seconds without input after which the usage timer is suspended.
    ///
    /// A short pause (reading, a sip of coffee) stops the clock but keeps the
    /// usage accrued so far.
    pub idle_threshold: u64,

    /// Fraction of `break_interval` of idleness after which accrued usage is
    /// discarded. The user has effectively had their break already.
    pub idle_reset_ratio: f64,

    /// Seconds the break prompt stays up before it dismisses itself.
    pub auto_restore_interval: u64,

    /// Minimum milliseconds between two forwarded input events.
    pub activity_throttle: u64,

    /// Milliseconds between two timer ticks.
    pub tick_interval: u64,

    /// Print the time left until the next break once a minute.
    pub show_timer: bool,

    /// Raise a desktop notification when a break starts.
    pub notifications: bool,
}

impl Default for TimerConfig {
    /// - 55 minute break interval
    /// - 3 minute idle threshold
    /// - reset after idling for half the interval
    /// - 5 minute auto-dismiss
    /// - 500ms activity throttle, 1s tick
    fn default() -> Self {
        TimerConfig {
            break_interval: 55 * 60,
            idle_threshold: 3 * 60,
            idle_reset_ratio: 0.5,
            auto_restore_interval: 5 * 60,
            activity_throttle: 500,
            tick_interval: 1000,
            show_timer: true,
            notifications: true,
        }
    }
}

impl TimerConfig {
    /// Rejects values the timer cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.break_interval == 0 {
            msg_bail_anyhow!(Message::InvalidBreakInterval);
        }
        if self.tick_interval == 0 {
            msg_bail_anyhow!(Message::InvalidTickInterval);
        }
        if !self.idle_reset_ratio.is_finite() {
            msg_bail_anyhow!(Message::InvalidIdleResetRatio(self.idle_reset_ratio));
        }
        Ok(())
    }

    /// Controller view of this configuration. The ratio is clamped to [0, 1].
    pub fn settings(&self) -> TimerSettings {
        TimerSettings {
            break_interval: seconds(self.break_interval),
            idle_threshold: seconds(self.idle_threshold),
            idle_reset_ratio: self.idle_reset_ratio.clamp(0.0, 1.0),
            auto_restore_interval: seconds(self.auto_restore_interval),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval.max(1))
    }

    pub fn activity_throttle(&self) -> Duration {
        Duration::from_millis(self.activity_throttle)
    }

    pub fn module() -> ConfigModule {
        ConfigModule {
            key: "timer".to_string(),
            name: "Timer".to_string(),
        }
    }

    /// Prompts for every timer setting, pre-filled with `current`.
    pub fn init(current: &Option<Self>) -> Result<Self> {
        let default = current.clone().unwrap_or_default();
        msg_print!(Message::ConfigModuleTimer);

        let break_minutes: u64 = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptBreakInterval.to_string())
            .default(default.break_interval / 60)
            .interact_text()?;
        let idle_minutes: u64 = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptIdleThreshold.to_string())
            .default(default.idle_threshold / 60)
            .interact_text()?;
        let idle_reset_ratio: f64 = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptIdleResetRatio.to_string())
            .default(default.idle_reset_ratio)
            .validate_with(|ratio: &f64| {
                if (0.0..=1.0).contains(ratio) {
                    Ok(())
                } else {
                    Err(Message::InvalidIdleResetRatio(*ratio).to_string())
                }
            })
            .interact_text()?;
        let auto_restore_minutes: u64 = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptAutoRestoreInterval.to_string())
            .default(default.auto_restore_interval / 60)
            .interact_text()?;
        let show_timer = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptShowTimer.to_string())
            .default(default.show_timer)
            .interact()?;
        let notifications = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptNotifications.to_string())
            .default(default.notifications)
            .interact()?;

        let config = Self {
            break_interval: minutes_to_seconds(break_minutes),
            idle_threshold: minutes_to_seconds(idle_minutes),
            idle_reset_ratio,
            auto_restore_interval: minutes_to_seconds(auto_restore_minutes),
            show_timer,
            notifications,
            ..default
        };
        config.validate()?;
        Ok(config)
    }
}

/// Minutes as entered by the user to the seconds stored in the file.
/// Saturates instead of overflowing.
pub fn minutes_to_seconds(minutes: u64) -> u64 {
    minutes.saturating_mul(60)
}

fn seconds(value: u64) -> TimeDelta {
    i64::try_from(value)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or_else(TimeDelta::max_value)
}

/// Root configuration object.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    /// Timer settings; defaults apply when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerConfig>,

    /// Hue integration; lights are left alone when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue: Option<HueConfig>,
}

impl Config {
    /// Location of the configuration file in the data directory.
    pub fn path() -> Result<PathBuf> {
        DataStorage::new().get_path(CONFIG_FILE_NAME)
    }

    /// Loads the configuration file, or defaults when there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn read() -> Result<Config> {
        Self::read_from(&Self::path()?)
    }

    pub fn read_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        config.timer().validate()?;
        Ok(config)
    }

    /// Writes the configuration as pretty-printed JSON.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let config_file = File::create(path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Removes the configuration file. Returns whether there was one.
    pub fn delete() -> Result<bool> {
        let config_file_path = Self::path()?;
        if !config_file_path.exists() {
            return Ok(false);
        }
        fs::remove_file(config_file_path)?;
        Ok(true)
    }

    /// Effective timer settings.
    pub fn timer(&self) -> TimerConfig {
        self.timer.clone().unwrap_or_default()
    }

    /// Interactive setup wizard. Starts from the current file when readable.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let modules = vec![TimerConfig::module(), HueConfig::module()];

        let selected = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectModules.to_string())
            .items(&modules.iter().map(|module| &module.name).collect::<Vec<_>>())
            .interact()?;

        for &selection in &selected {
            match modules[selection].key.as_str() {
                "timer" => config.timer = Some(TimerConfig::init(&config.timer)?),
                "hue" => config.hue = Some(HueConfig::init(&config.hue)?),
                _ => {}
            }
        }

        Ok(config)
    }
}
