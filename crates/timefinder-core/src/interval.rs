//! Half-open time intervals in the user's local timezone.
//!
//! The whole scheduling pipeline works on `[start, end)` intervals over
//! `DateTime<Tz>`. Intervals are immutable; subtraction and splitting
//! produce fresh values.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::ValidationError;

/// A half-open `[start, end)` time interval. Invariant: `start < end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interval {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl Interval {
    /// Create a new interval, rejecting empty or inverted ranges.
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>) -> Result<Self, ValidationError> {
        if start >= end {
            return Err(ValidationError::InvalidTimeRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    /// Get duration in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Check if this interval overlaps another (half-open semantics).
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Check if this interval fully contains another.
    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Return a copy whose end is pushed back by `minutes`.
    pub fn pad_end(&self, minutes: i64) -> Interval {
        Interval {
            start: self.start,
            end: self.end + Duration::minutes(minutes),
        }
    }

    /// Subtract `busy` from this interval, yielding zero, one or two
    /// sub-intervals.
    ///
    /// - Disjoint: the interval is returned unchanged.
    /// - Partial overlap: the uncovered head and/or tail survive.
    /// - Fully covered: nothing survives.
    pub fn subtract(&self, busy: &Interval) -> Vec<Interval> {
        let mut remaining = Vec::new();

        if self.start < busy.start {
            remaining.push(Interval {
                start: self.start,
                end: self.end.min(busy.start),
            });
        }
        if self.end > busy.end {
            remaining.push(Interval {
                start: self.start.max(busy.end),
                end: self.end,
            });
        }

        remaining
    }
}

/// Parse a wall-clock string in `HH:MM` or `HH:MM:SS` form.
pub fn parse_wall_clock(value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| ValidationError::InvalidValue {
            field: "time".to_string(),
            message: format!("expected HH:MM or HH:MM:SS, got '{value}'"),
        })
}

/// Resolve a wall-clock time on a given date to a zone-aware timestamp.
///
/// Ambiguous local times (DST fall-back) resolve to the earlier instant;
/// nonexistent local times (DST spring-forward) are an error.
pub fn local_datetime(
    date: NaiveDate,
    time: NaiveTime,
    tz: Tz,
) -> Result<DateTime<Tz>, ValidationError> {
    tz.from_local_datetime(&NaiveDateTime::new(date, time))
        .earliest()
        .ok_or_else(|| ValidationError::NonexistentLocalTime {
            time: NaiveDateTime::new(date, time).to_string(),
            timezone: tz.name().to_string(),
        })
}
