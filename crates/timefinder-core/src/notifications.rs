//! Daily reminder events nudging the user back into TimeFinder.
//!
//! Plans two 15-minute weekday reminders for the next 30 days: a morning
//! "confirm your scheduled tasks" at 07:45 and an evening check-in at 20:15.
//! Planning is pure; `push_reminders` creates the events, skipping any whose
//! exact time range already exists on the calendar.

use chrono::{DateTime, Datelike, Duration, NaiveTime};
use chrono_tz::Tz;
use serde::Serialize;
use serde_json::json;

use crate::calendar::CalendarApi;
use crate::error::{Result, ValidationError};
use crate::interval::local_datetime;

/// Days of reminders planned ahead.
pub const REMINDER_HORIZON_DAYS: i64 = 30;

const MORNING_REMINDER: (u32, u32) = (7, 45);
const EVENING_REMINDER: (u32, u32) = (20, 15);
const REMINDER_MINUTES: i64 = 15;
const SIGNUP_URL: &str = "http://localhost:3000/googleconnect";

/// A planned reminder event.
#[derive(Debug, Clone, Serialize)]
pub struct Reminder {
    pub summary: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl Reminder {
    /// Calendar event body with a 15-minute popup override.
    pub fn payload(&self) -> serde_json::Value {
        let description =
            format!("Click [here]({SIGNUP_URL}) to visit TimeFinder and manage your tasks!");
        json!({
            "summary": self.summary,
            "description": description,
            "start": {"dateTime": self.start.to_rfc3339()},
            "end": {"dateTime": self.end.to_rfc3339()},
            "reminders": {
                "useDefault": false,
                "overrides": [{"method": "popup", "minutes": 15}],
            },
        })
    }
}

/// Plan weekday reminders from `from` (inclusive) over the horizon.
pub fn plan_reminders(from: DateTime<Tz>, tz: Tz) -> Result<Vec<Reminder>, ValidationError> {
    let mut reminders = Vec::new();

    for offset in 0..=REMINDER_HORIZON_DAYS {
        let date = (from + Duration::days(offset)).date_naive();
        if date.weekday().num_days_from_monday() >= 5 {
            continue; // weekends stay quiet
        }

        for (hour, minute, summary) in [
            (
                MORNING_REMINDER.0,
                MORNING_REMINDER.1,
                "Confirm Scheduled Tasks \u{1f499} TimeFinder",
            ),
            (EVENING_REMINDER.0, EVENING_REMINDER.1, "Check TimeFinder"),
        ] {
            let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
                ValidationError::InvalidValue {
                    field: "reminder_time".to_string(),
                    message: format!("{hour:02}:{minute:02}"),
                }
            })?;
            let start = local_datetime(date, time, tz)?;
            reminders.push(Reminder {
                summary: summary.to_string(),
                start,
                end: start + Duration::minutes(REMINDER_MINUTES),
            });
        }
    }

    Ok(reminders)
}

/// Create the planned reminders on the user's calendar, skipping ones that
/// already exist. Returns the provider responses for the created events.
pub fn push_reminders(
    calendar: &dyn CalendarApi,
    access_token: &str,
    calendar_id: &str,
    from: DateTime<Tz>,
    tz: Tz,
) -> Result<Vec<serde_json::Value>> {
    let mut responses = Vec::new();

    for reminder in plan_reminders(from, tz)? {
        if already_scheduled(calendar, access_token, calendar_id, &reminder) {
            continue;
        }
        let response = calendar.create_event(access_token, calendar_id, &reminder.payload())?;
        responses.push(response);
    }

    Ok(responses)
}

/// True when an event with exactly this start/end already exists. A failed
/// lookup counts as not scheduled, so the reminder is created anyway.
fn already_scheduled(
    calendar: &dyn CalendarApi,
    access_token: &str,
    calendar_id: &str,
    reminder: &Reminder,
) -> bool {
    let events = match calendar.list_events_between(
        access_token,
        calendar_id,
        reminder.start,
        reminder.end,
    ) {
        Ok(events) => events,
        Err(_) => return false,
    };

    let start = reminder.start.to_rfc3339();
    let end = reminder.end.to_rfc3339();
    events.iter().any(|event| {
        event["start"]["dateTime"].as_str() == Some(start.as_str())
            && event["end"]["dateTime"].as_str() == Some(end.as_str())
    })
}
