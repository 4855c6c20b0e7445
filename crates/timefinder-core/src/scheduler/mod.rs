//! Scheduling facade: one entry point that turns a user's calendar and task
//! backlog into committed calendar events.
//!
//! Pipeline per run:
//! - Resolve the user's calendar timezone (UTC fallback)
//! - Fetch today's busy intervals and subtract them (buffer-padded) from
//!   the working-day window
//! - Discretize free time into slots and tag the concentration window
//! - Sort pending tasks by priority, keep the top N, assign first-fit
//! - Create one calendar event per assignment and mark the task scheduled
//!
//! Event-creation failures do not roll back earlier assignments; they are
//! reported alongside the successes and the affected task stays unscheduled.

use chrono::Utc;
use chrono_tz::Tz;
use serde::Serialize;
use serde_json::json;

use crate::assign::{Assignment, TaskAssigner};
use crate::calendar::CalendarApi;
use crate::error::{CoreError, Result, ValidationError};
use crate::interval::{local_datetime, parse_wall_clock, Interval};
use crate::slots::{ConcentrationWindow, FreeSlotCalculator, Slot, SlotDiscretizer};
use crate::storage::{Database, UserRecord};
use crate::task::sort_by_priority;

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Buffer after meetings and scheduled tasks (minutes)
    pub buffer_minutes: i64,
    /// Working-day start, wall clock
    pub day_start: String,
    /// Working-day end, wall clock
    pub day_end: String,
    /// Slot granularity (minutes)
    pub slot_minutes: i64,
    /// Highest-priority tasks considered per run
    pub max_tasks_per_run: usize,
    /// Calendar that receives the created events
    pub calendar_id: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            buffer_minutes: 10,
            day_start: "08:00".to_string(),
            day_end: "20:00".to_string(),
            slot_minutes: 30,
            max_tasks_per_run: 5,
            calendar_id: "primary".to_string(),
        }
    }
}

impl SchedulerConfig {
    /// Reject numeric knobs the pipeline cannot run with: the discretizer
    /// needs a positive granularity and a negative buffer would invert
    /// padded intervals.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.slot_minutes <= 0 {
            return Err(ValidationError::InvalidValue {
                field: "slot_minutes".to_string(),
                message: format!("must be positive, got {}", self.slot_minutes),
            });
        }
        if self.buffer_minutes < 0 {
            return Err(ValidationError::InvalidValue {
                field: "buffer_minutes".to_string(),
                message: format!("must not be negative, got {}", self.buffer_minutes),
            });
        }
        Ok(())
    }
}

/// An assignment whose calendar event could not be created.
#[derive(Debug, Serialize)]
pub struct EventFailure {
    pub task_id: String,
    pub task_name: String,
    pub error: String,
}

/// Result of one scheduling run. `created_events` holds the provider
/// responses in assignment order; a partial run keeps both lists.
#[derive(Debug, Serialize, Default)]
pub struct ScheduleOutcome {
    pub assignments: Vec<Assignment>,
    pub created_events: Vec<serde_json::Value>,
    pub failed_events: Vec<EventFailure>,
}

/// Orchestrates calculator, discretizer and assigner against the injected
/// calendar provider and store.
pub struct Scheduler<C: CalendarApi> {
    calendar: C,
    config: SchedulerConfig,
}

impl<C: CalendarApi> Scheduler<C> {
    /// Create a scheduler with default config.
    pub fn new(calendar: C) -> Self {
        Self {
            calendar,
            config: SchedulerConfig::default(),
        }
    }

    /// Create with custom config.
    pub fn with_config(calendar: C, config: SchedulerConfig) -> Self {
        Self { calendar, config }
    }

    /// Schedule the user's top pending tasks into today's free time and
    /// create a calendar event for each committed assignment.
    pub fn schedule_day(&self, db: &Database, sub: &str) -> Result<ScheduleOutcome> {
        let user = self.require_user(db, sub)?;
        let token = self.require_token(&user)?;

        let (tz, mut slots) = self.compute_slots(&user, &token)?;

        let mut tasks = db.pending_tasks(sub)?;
        sort_by_priority(&mut tasks);
        tasks.truncate(self.config.max_tasks_per_run);

        let assigner = TaskAssigner::new(self.config.buffer_minutes);
        let assignments = assigner.assign(&tasks, &mut slots);

        let mut outcome = ScheduleOutcome {
            assignments: Vec::with_capacity(assignments.len()),
            ..Default::default()
        };

        for assignment in assignments {
            let payload = event_payload(&assignment, tz);
            match self
                .calendar
                .create_event(&token, &self.config.calendar_id, &payload)
            {
                Ok(response) => {
                    db.mark_task_scheduled(
                        &assignment.task_id,
                        &assignment.start.with_timezone(&Utc),
                        &assignment.end.with_timezone(&Utc),
                    )?;
                    outcome.created_events.push(response);
                }
                Err(err) => outcome.failed_events.push(EventFailure {
                    task_id: assignment.task_id.clone(),
                    task_name: assignment.task_name.clone(),
                    error: err.to_string(),
                }),
            }
            outcome.assignments.push(assignment);
        }

        Ok(outcome)
    }

    /// Compute today's discretized availability for a user without
    /// assigning anything.
    pub fn available_slots(&self, db: &Database, sub: &str) -> Result<Vec<Slot>> {
        let user = self.require_user(db, sub)?;
        let token = self.require_token(&user)?;
        let (_, slots) = self.compute_slots(&user, &token)?;
        Ok(slots)
    }

    fn require_user(&self, db: &Database, sub: &str) -> Result<UserRecord> {
        db.find_user(sub)?.ok_or_else(|| {
            CoreError::Custom(format!("user '{sub}' not found"))
        })
    }

    fn require_token(&self, user: &UserRecord) -> Result<String> {
        user.access_token.clone().ok_or_else(|| {
            CoreError::Custom(format!("user '{}' has no access token", user.sub))
        })
    }

    /// Fetch calendar data and build the tagged slot list for today in the
    /// user's timezone.
    fn compute_slots(&self, user: &UserRecord, token: &str) -> Result<(Tz, Vec<Slot>)> {
        self.config.validate()?;

        let tz = self
            .calendar
            .primary_timezone(token)
            .parse::<Tz>()
            .unwrap_or(Tz::UTC);
        let today = Utc::now().with_timezone(&tz).date_naive();

        let window = Interval::new(
            local_datetime(today, parse_wall_clock(&self.config.day_start)?, tz)?,
            local_datetime(today, parse_wall_clock(&self.config.day_end)?, tz)?,
        )?;

        let busy = self.calendar.list_busy_intervals(token, today, tz)?;

        let free = FreeSlotCalculator::new()
            .with_buffer(self.config.buffer_minutes)
            .free_intervals(&window, &busy);

        // A window that fails to parse is treated as absent rather than
        // failing the run.
        let concentration = user.concentration_window.as_ref().and_then(|(start, end)| {
            ConcentrationWindow::parse(start, end, today, tz).ok()
        });

        let slots = SlotDiscretizer::new()
            .with_slot_minutes(self.config.slot_minutes)
            .discretize(&free, concentration.as_ref());

        Ok((tz, slots))
    }
}

/// Calendar event body for a committed assignment.
fn event_payload(assignment: &Assignment, tz: Tz) -> serde_json::Value {
    json!({
        "summary": format!("{} \u{1f499} TimeFinder", assignment.task_name),
        "start": {
            "dateTime": assignment.start.to_rfc3339(),
            "timeZone": tz.name(),
        },
        "end": {
            "dateTime": assignment.end.to_rfc3339(),
            "timeZone": tz.name(),
        },
        "colorId": "5",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalendarError;
    use crate::task::{Concentration, Priority};
    use chrono::{DateTime, NaiveDate};
    use std::sync::Mutex;

    /// In-memory calendar provider for facade tests.
    struct FakeCalendar {
        timezone: String,
        busy: Vec<(String, String)>,
        fail_event_for: Option<String>,
        created: Mutex<Vec<serde_json::Value>>,
    }

    impl FakeCalendar {
        fn empty() -> Self {
            Self {
                timezone: "UTC".to_string(),
                busy: Vec::new(),
                fail_event_for: None,
                created: Mutex::new(Vec::new()),
            }
        }
    }

    impl CalendarApi for FakeCalendar {
        fn primary_timezone(&self, _token: &str) -> String {
            self.timezone.clone()
        }

        fn list_busy_intervals(
            &self,
            _token: &str,
            _date: NaiveDate,
            tz: Tz,
        ) -> Result<Vec<Interval>, CalendarError> {
            self.busy
                .iter()
                .map(|(start, end)| {
                    let start = DateTime::parse_from_rfc3339(start)
                        .unwrap()
                        .with_timezone(&tz);
                    let end = DateTime::parse_from_rfc3339(end)
                        .unwrap()
                        .with_timezone(&tz);
                    Interval::new(start, end).map_err(|_| CalendarError::MissingField("start"))
                })
                .collect()
        }

        fn create_event(
            &self,
            _token: &str,
            _calendar_id: &str,
            body: &serde_json::Value,
        ) -> Result<serde_json::Value, CalendarError> {
            if let Some(ref needle) = self.fail_event_for {
                if body["summary"].as_str().unwrap_or("").contains(needle) {
                    return Err(CalendarError::Status { status: 500 });
                }
            }
            self.created.lock().unwrap().push(body.clone());
            Ok(json!({"id": "evt", "status": "confirmed"}))
        }

        fn list_events_between(
            &self,
            _token: &str,
            _calendar_id: &str,
            _from: chrono::DateTime<Tz>,
            _to: chrono::DateTime<Tz>,
        ) -> Result<Vec<serde_json::Value>, CalendarError> {
            Ok(Vec::new())
        }
    }

    fn seeded_db() -> Database {
        let db = Database::open_memory().unwrap();
        db.upsert_user("sub-1", "a@example.com", None, Some("tok"))
            .unwrap();
        db
    }

    #[test]
    fn missing_user_is_an_error() {
        let scheduler = Scheduler::new(FakeCalendar::empty());
        let db = Database::open_memory().unwrap();
        assert!(scheduler.schedule_day(&db, "ghost").is_err());
    }

    #[test]
    fn no_tasks_yields_empty_outcome() {
        let scheduler = Scheduler::new(FakeCalendar::empty());
        let db = seeded_db();

        let outcome = scheduler.schedule_day(&db, "sub-1").unwrap();
        assert!(outcome.assignments.is_empty());
        assert!(outcome.created_events.is_empty());
        assert!(outcome.failed_events.is_empty());
    }

    #[test]
    fn schedules_tasks_and_creates_events() {
        let scheduler = Scheduler::new(FakeCalendar::empty());
        let db = seeded_db();
        db.add_task("sub-1", "report", Priority::High, 60, Concentration::Low)
            .unwrap();
        db.add_task("sub-1", "emails", Priority::Low, 30, Concentration::Low)
            .unwrap();

        let outcome = scheduler.schedule_day(&db, "sub-1").unwrap();
        assert_eq!(outcome.assignments.len(), 2);
        assert_eq!(outcome.created_events.len(), 2);

        // High priority task is placed first, at the start of the day.
        assert_eq!(outcome.assignments[0].task_name, "report");

        let pending = db.pending_tasks("sub-1").unwrap();
        assert!(pending.iter().all(|t| t.is_scheduled));
    }

    #[test]
    fn caps_tasks_per_run() {
        let scheduler = Scheduler::new(FakeCalendar::empty());
        let db = seeded_db();
        for i in 0..8 {
            db.add_task(
                "sub-1",
                &format!("task {i}"),
                Priority::Medium,
                30,
                Concentration::Low,
            )
            .unwrap();
        }

        let outcome = scheduler.schedule_day(&db, "sub-1").unwrap();
        assert_eq!(outcome.assignments.len(), 5);
    }

    #[test]
    fn event_failure_is_partial_success() {
        let calendar = FakeCalendar {
            fail_event_for: Some("flaky".to_string()),
            ..FakeCalendar::empty()
        };
        let scheduler = Scheduler::new(calendar);
        let db = seeded_db();
        db.add_task("sub-1", "flaky", Priority::High, 30, Concentration::Low)
            .unwrap();
        db.add_task("sub-1", "solid", Priority::Low, 30, Concentration::Low)
            .unwrap();

        let outcome = scheduler.schedule_day(&db, "sub-1").unwrap();
        assert_eq!(outcome.assignments.len(), 2);
        assert_eq!(outcome.created_events.len(), 1);
        assert_eq!(outcome.failed_events.len(), 1);
        assert_eq!(outcome.failed_events[0].task_name, "flaky");

        // Only the task whose event was created is marked scheduled.
        let pending = db.pending_tasks("sub-1").unwrap();
        let flaky = pending.iter().find(|t| t.name == "flaky").unwrap();
        let solid = pending.iter().find(|t| t.name == "solid").unwrap();
        assert!(!flaky.is_scheduled);
        assert!(solid.is_scheduled);
    }

    #[test]
    fn available_slots_respects_busy_time() {
        let today = Utc::now().date_naive();
        let calendar = FakeCalendar {
            busy: vec![(
                format!("{today}T10:00:00+00:00"),
                format!("{today}T11:00:00+00:00"),
            )],
            ..FakeCalendar::empty()
        };
        let scheduler = Scheduler::new(calendar);
        let db = seeded_db();

        let slots = scheduler.available_slots(&db, "sub-1").unwrap();
        assert!(!slots.is_empty());
        // No slot may overlap the meeting or its 10-minute buffer.
        for pair in slots.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
        let total: i64 = slots.iter().map(|s| s.duration_minutes()).sum();
        assert_eq!(total, 720 - 70);
    }

    #[test]
    fn non_positive_slot_minutes_fails_the_run() {
        // A zero granularity used to make slot generation spin forever;
        // the run must instead fail up front.
        let scheduler = Scheduler::with_config(
            FakeCalendar::empty(),
            SchedulerConfig {
                slot_minutes: 0,
                ..SchedulerConfig::default()
            },
        );
        let db = seeded_db();
        db.add_task("sub-1", "report", Priority::High, 60, Concentration::Low)
            .unwrap();

        let err = scheduler.schedule_day(&db, "sub-1").unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(db.pending_tasks("sub-1").unwrap().iter().all(|t| !t.is_scheduled));
    }

    #[test]
    fn negative_buffer_fails_the_run() {
        let scheduler = Scheduler::with_config(
            FakeCalendar::empty(),
            SchedulerConfig {
                buffer_minutes: -10,
                ..SchedulerConfig::default()
            },
        );
        let db = seeded_db();

        let err = scheduler.available_slots(&db, "sub-1").unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn unparseable_timezone_falls_back_to_utc() {
        let calendar = FakeCalendar {
            timezone: "Mars/Olympus".to_string(),
            ..FakeCalendar::empty()
        };
        let scheduler = Scheduler::new(calendar);
        let db = seeded_db();

        // The run still succeeds; all times resolve against UTC.
        let slots = scheduler.available_slots(&db, "sub-1").unwrap();
        assert_eq!(slots.first().unwrap().start.timezone(), Tz::UTC);
    }
}
