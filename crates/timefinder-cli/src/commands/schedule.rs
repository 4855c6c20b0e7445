//! Scheduling commands for CLI.

use clap::Subcommand;
use timefinder_core::storage::{Config, Database};
use timefinder_core::{GoogleCalendarClient, Scheduler, SchedulerConfig};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Schedule the user's top pending tasks into today's free time
    Run {
        /// User key (OIDC sub)
        sub: String,
    },
    /// Show today's discretized availability without assigning anything
    Slots {
        /// User key (OIDC sub)
        sub: String,
    },
}

pub fn run(action: ScheduleAction) -> Result<(), Box<dyn std::error::Error>> {
    // The calendar client bridges to async reqwest via Handle::current().
    let rt = tokio::runtime::Runtime::new()?;
    let _guard = rt.enter();

    let config = Config::load_or_default();
    let scheduler = Scheduler::with_config(
        GoogleCalendarClient::new(config.calendar.base_url.clone()),
        scheduler_config(&config),
    );
    let db = Database::open()?;

    match action {
        ScheduleAction::Run { sub } => {
            let outcome = scheduler.schedule_day(&db, &sub)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        ScheduleAction::Slots { sub } => {
            let slots = scheduler.available_slots(&db, &sub)?;
            println!("{}", serde_json::to_string_pretty(&slots)?);
        }
    }
    Ok(())
}

fn scheduler_config(config: &Config) -> SchedulerConfig {
    SchedulerConfig {
        buffer_minutes: config.scheduler.buffer_minutes,
        day_start: config.scheduler.day_start.clone(),
        day_end: config.scheduler.day_end.clone(),
        slot_minutes: config.scheduler.slot_minutes,
        max_tasks_per_run: config.scheduler.max_tasks_per_run,
        calendar_id: config.calendar.calendar_id.clone(),
    }
}
