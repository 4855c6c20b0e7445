//! Reminder commands for CLI.

use chrono::Utc;
use chrono_tz::Tz;
use clap::Subcommand;
use timefinder_core::calendar::CalendarApi;
use timefinder_core::storage::{Config, Database};
use timefinder_core::{notifications, GoogleCalendarClient};

#[derive(Subcommand)]
pub enum RemindAction {
    /// Print the reminders a push would create
    Plan {
        /// IANA timezone (default UTC)
        #[arg(long, default_value = "UTC")]
        timezone: String,
    },
    /// Create weekday reminders on the user's calendar
    Push {
        /// User key (OIDC sub)
        sub: String,
    },
}

pub fn run(action: RemindAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        RemindAction::Plan { timezone } => {
            let tz: Tz = timezone.parse().map_err(|_| format!("unknown timezone '{timezone}'"))?;
            let reminders = notifications::plan_reminders(Utc::now().with_timezone(&tz), tz)?;
            println!("{}", serde_json::to_string_pretty(&reminders)?);
        }
        RemindAction::Push { sub } => {
            let rt = tokio::runtime::Runtime::new()?;
            let _guard = rt.enter();

            let db = Database::open()?;
            let user = db
                .find_user(&sub)?
                .ok_or_else(|| format!("user '{sub}' not found"))?;
            let token = user
                .access_token
                .ok_or_else(|| format!("user '{sub}' has no access token"))?;

            let config = Config::load_or_default();
            let client = GoogleCalendarClient::new(config.calendar.base_url.clone());
            let tz: Tz = client.primary_timezone(&token).parse().unwrap_or(Tz::UTC);

            let responses = notifications::push_reminders(
                &client,
                &token,
                &config.calendar.calendar_id,
                Utc::now().with_timezone(&tz),
                tz,
            )?;
            println!("created {} reminders", responses.len());
        }
    }
    Ok(())
}
