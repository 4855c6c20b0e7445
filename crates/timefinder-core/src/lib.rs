//! # TimeFinder Core Library
//!
//! This library provides the core business logic for TimeFinder, a daily
//! task scheduler that places a user's pending tasks into the free time of
//! their calendar. It implements a CLI-first philosophy where all operations
//! are available via a standalone CLI binary.
//!
//! ## Architecture
//!
//! - **Free-slot pipeline**: working-day window minus buffer-padded busy
//!   intervals, discretized into fixed-width slots tagged with the user's
//!   concentration window
//! - **Task assignment**: greedy first-fit placement of priority-sorted
//!   tasks, routed by concentration demand
//! - **Storage**: SQLite user/task store and TOML-based configuration
//! - **Calendar**: Google Calendar client behind an injectable trait
//!
//! ## Key Components
//!
//! - [`Scheduler`]: orchestrates one scheduling run end to end
//! - [`FreeSlotCalculator`] / [`SlotDiscretizer`] / [`TaskAssigner`]: the
//!   pipeline stages, usable standalone
//! - [`Database`]: user and task persistence
//! - [`CalendarApi`]: calendar capabilities the scheduler depends on

pub mod assign;
pub mod calendar;
pub mod error;
pub mod interval;
pub mod notifications;
pub mod scheduler;
pub mod slots;
pub mod storage;
pub mod task;

pub use assign::{Assignment, TaskAssigner};
pub use calendar::{CalendarApi, GoogleCalendarClient};
pub use error::{CalendarError, ConfigError, CoreError, DatabaseError, ValidationError};
pub use interval::Interval;
pub use notifications::{plan_reminders, push_reminders, Reminder};
pub use scheduler::{EventFailure, ScheduleOutcome, Scheduler, SchedulerConfig};
pub use slots::{ConcentrationWindow, FreeSlotCalculator, Slot, SlotDiscretizer};
pub use storage::{Config, Database, UserRecord};
pub use task::{sort_by_priority, Concentration, Priority, Task};
