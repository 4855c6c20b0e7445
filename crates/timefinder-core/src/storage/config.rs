//! TOML-based application configuration.
//!
//! Stores:
//! - Scheduler knobs (working-day window, buffer, slot granularity, task cap)
//! - Calendar provider settings (API base URL, calendar id)
//!
//! Configuration is stored at `~/.config/timefinder/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::calendar::GOOGLE_CALENDAR_BASE_URL;
use crate::error::ConfigError;

/// Scheduler-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSection {
    #[serde(default = "default_buffer_minutes")]
    pub buffer_minutes: i64,
    /// Working-day start, wall clock ("HH:MM").
    #[serde(default = "default_day_start")]
    pub day_start: String,
    /// Working-day end, wall clock ("HH:MM").
    #[serde(default = "default_day_end")]
    pub day_end: String,
    #[serde(default = "default_slot_minutes")]
    pub slot_minutes: i64,
    /// Highest-priority tasks considered per scheduling run.
    #[serde(default = "default_max_tasks")]
    pub max_tasks_per_run: usize,
}

/// Calendar provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerSection,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

fn default_buffer_minutes() -> i64 {
    10
}
fn default_day_start() -> String {
    "08:00".to_string()
}
fn default_day_end() -> String {
    "20:00".to_string()
}
fn default_slot_minutes() -> i64 {
    30
}
fn default_max_tasks() -> usize {
    5
}
fn default_base_url() -> String {
    GOOGLE_CALENDAR_BASE_URL.to_string()
}
fn default_calendar_id() -> String {
    "primary".to_string()
}

impl Default for SchedulerSection {
    fn default() -> Self {
        Self {
            buffer_minutes: default_buffer_minutes(),
            day_start: default_day_start(),
            day_end: default_day_end(),
            slot_minutes: default_slot_minutes(),
            max_tasks_per_run: default_max_tasks(),
        }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            calendar_id: default_calendar_id(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
                path: path.clone(),
                message: e.to_string(),
            })?;
        Ok(Self::parse_toml(&path, &content)?)
    }

    fn parse_toml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseFailed(format!(
            "{}: {e}",
            path.display()
        )))
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Persist to disk.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }
}
