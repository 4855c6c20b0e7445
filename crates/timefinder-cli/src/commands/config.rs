//! Configuration commands for CLI.

use clap::Subcommand;
use timefinder_core::storage::Config;
use timefinder_core::ConfigError;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Key, e.g. scheduler.buffer_minutes or calendar.calendar_id
        key: String,
        /// New value
        value: String,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load_or_default();
            println!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load_or_default();
            apply(&mut config, &key, &value)?;
            config.save()?;
            println!("{key} = {value}");
        }
    }
    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
    match key {
        "scheduler.buffer_minutes" => {
            let minutes: i64 = value.parse()?;
            if minutes < 0 {
                return Err(invalid(key, "must not be negative"));
            }
            config.scheduler.buffer_minutes = minutes;
        }
        "scheduler.day_start" => config.scheduler.day_start = value.to_string(),
        "scheduler.day_end" => config.scheduler.day_end = value.to_string(),
        "scheduler.slot_minutes" => {
            let minutes: i64 = value.parse()?;
            if minutes <= 0 {
                return Err(invalid(key, "must be positive"));
            }
            config.scheduler.slot_minutes = minutes;
        }
        "scheduler.max_tasks_per_run" => config.scheduler.max_tasks_per_run = value.parse()?,
        "calendar.base_url" => config.calendar.base_url = value.to_string(),
        "calendar.calendar_id" => config.calendar.calendar_id = value.to_string(),
        other => return Err(format!("unknown config key '{other}'").into()),
    }
    Ok(())
}

fn invalid(key: &str, message: &str) -> Box<dyn std::error::Error> {
    Box::new(ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    })
}
