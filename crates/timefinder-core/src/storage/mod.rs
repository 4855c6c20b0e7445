mod config;
pub mod database;

pub use config::{CalendarConfig, Config, SchedulerSection};
pub use database::{Database, UserRecord};

use std::path::PathBuf;

/// Returns `~/.config/timefinder[-dev]/` based on TIMEFINDER_ENV.
///
/// Set TIMEFINDER_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TIMEFINDER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("timefinder-dev")
    } else {
        base_dir.join("timefinder")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
