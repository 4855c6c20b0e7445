//! Google Calendar client.
//!
//! Thin wrapper over the Calendar v3 REST API, parameterized on a base URL
//! so tests can point it at a local mock server. Callers supply a bearer
//! access token per request; token acquisition/refresh is out of scope.

use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use reqwest::Client;

use crate::error::CalendarError;
use crate::interval::Interval;

/// Calendar capabilities the scheduler depends on. Object-safe so tests
/// can inject a fake provider.
pub trait CalendarApi: Send + Sync {
    /// IANA timezone of the user's primary calendar. Falls back to "UTC"
    /// on any failure.
    fn primary_timezone(&self, access_token: &str) -> String;

    /// Busy intervals on `date`, converted to `tz`. Entries without a
    /// concrete `dateTime` (all-day events) are skipped.
    fn list_busy_intervals(
        &self,
        access_token: &str,
        date: NaiveDate,
        tz: Tz,
    ) -> Result<Vec<Interval>, CalendarError>;

    /// Create an event and return the provider's response body.
    fn create_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, CalendarError>;

    /// Raw events within `[from, to]`, used for reminder deduplication.
    fn list_events_between(
        &self,
        access_token: &str,
        calendar_id: &str,
        from: DateTime<Tz>,
        to: DateTime<Tz>,
    ) -> Result<Vec<serde_json::Value>, CalendarError>;
}

/// Google Calendar REST client.
pub struct GoogleCalendarClient {
    base_url: String,
}

/// Default Google Calendar API base URL.
pub const GOOGLE_CALENDAR_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

impl GoogleCalendarClient {
    /// Create a client against the given API base URL (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn get_json(
        &self,
        url: &str,
        access_token: &str,
    ) -> Result<serde_json::Value, CalendarError> {
        let response = tokio::runtime::Handle::current().block_on(async {
            Client::new().get(url).bearer_auth(access_token).send().await
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CalendarError::Status {
                status: status.as_u16(),
            });
        }

        let body: serde_json::Value =
            tokio::runtime::Handle::current().block_on(response.json())?;
        if let Some(err) = body.get("error") {
            return Err(CalendarError::Api(err.to_string()));
        }
        Ok(body)
    }

    fn events_url(&self, calendar_id: &str, params: &[(&str, String)]) -> String {
        let query = params
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}/calendars/{calendar_id}/events?{query}", self.base_url)
    }
}

impl CalendarApi for GoogleCalendarClient {
    fn primary_timezone(&self, access_token: &str) -> String {
        let url = format!("{}/users/me/calendarList/primary", self.base_url);
        match self.get_json(&url, access_token) {
            Ok(body) => body["timeZone"].as_str().unwrap_or("UTC").to_string(),
            Err(_) => "UTC".to_string(),
        }
    }

    fn list_busy_intervals(
        &self,
        access_token: &str,
        date: NaiveDate,
        tz: Tz,
    ) -> Result<Vec<Interval>, CalendarError> {
        let url = self.events_url(
            "primary",
            &[
                ("timeMin", format!("{date}T00:00:00Z")),
                ("timeMax", format!("{date}T23:59:59Z")),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ],
        );
        let body = self.get_json(&url, access_token)?;
        let items = body["items"]
            .as_array()
            .ok_or(CalendarError::MissingField("items"))?;

        let mut busy = Vec::new();
        for item in items {
            let start_str = item["start"]["dateTime"].as_str();
            let end_str = item["end"]["dateTime"].as_str();
            let (Some(start_str), Some(end_str)) = (start_str, end_str) else {
                continue; // all-day or malformed entry
            };

            let (Ok(start), Ok(end)) = (
                DateTime::parse_from_rfc3339(start_str),
                DateTime::parse_from_rfc3339(end_str),
            ) else {
                continue;
            };

            if let Ok(interval) =
                Interval::new(start.with_timezone(&tz), end.with_timezone(&tz))
            {
                busy.push(interval);
            }
        }

        Ok(busy)
    }

    fn create_event(
        &self,
        access_token: &str,
        calendar_id: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, CalendarError> {
        let url = format!("{}/calendars/{calendar_id}/events", self.base_url);

        let response = tokio::runtime::Handle::current().block_on(async {
            Client::new()
                .post(&url)
                .bearer_auth(access_token)
                .json(body)
                .send()
                .await
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CalendarError::Status {
                status: status.as_u16(),
            });
        }

        let created: serde_json::Value =
            tokio::runtime::Handle::current().block_on(response.json())?;
        if let Some(err) = created.get("error") {
            return Err(CalendarError::Api(err.to_string()));
        }
        Ok(created)
    }

    fn list_events_between(
        &self,
        access_token: &str,
        calendar_id: &str,
        from: DateTime<Tz>,
        to: DateTime<Tz>,
    ) -> Result<Vec<serde_json::Value>, CalendarError> {
        let url = self.events_url(
            calendar_id,
            &[
                ("timeMin", from.to_rfc3339()),
                ("timeMax", to.to_rfc3339()),
                ("singleEvents", "true".to_string()),
            ],
        );
        let body = self.get_json(&url, access_token)?;
        Ok(body["items"].as_array().cloned().unwrap_or_default())
    }
}
