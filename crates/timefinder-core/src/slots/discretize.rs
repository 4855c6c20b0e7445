//! Discretization of free intervals into fixed-width assignable slots.

use chrono::{DateTime, Duration, NaiveDate};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::ValidationError;
use crate::interval::{local_datetime, parse_wall_clock, Interval};

/// Default slot granularity in minutes.
pub const DEFAULT_SLOT_MINUTES: i64 = 30;

/// A fixed-granularity subdivision of a free interval, the unit of task
/// assignment. `available` is flipped off by the assigner as tasks consume
/// the day; slots live for a single scheduling run and are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slot {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub available: bool,
    pub concentration_time: bool,
}

impl Slot {
    /// Get duration in minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Check if this slot overlaps a half-open `[start, end)` range.
    pub fn overlaps_range(&self, start: DateTime<Tz>, end: DateTime<Tz>) -> bool {
        self.start < end && self.end > start
    }
}

/// A user's daily concentration window, resolved onto a concrete date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConcentrationWindow {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl ConcentrationWindow {
    /// Resolve `"HH:MM"` (or `"HH:MM:SS"`) bounds onto `date` in `tz`.
    pub fn parse(
        start: &str,
        end: &str,
        date: NaiveDate,
        tz: Tz,
    ) -> Result<Self, ValidationError> {
        let start = local_datetime(date, parse_wall_clock(start)?, tz)?;
        let end = local_datetime(date, parse_wall_clock(end)?, tz)?;
        if start >= end {
            return Err(ValidationError::InvalidTimeRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
            });
        }
        Ok(Self { start, end })
    }

    /// Strict containment: the whole `[start, end)` range must lie inside
    /// the window. A range straddling either boundary does not count.
    pub fn covers(&self, start: DateTime<Tz>, end: DateTime<Tz>) -> bool {
        self.start <= start && end <= self.end
    }
}

/// Splits free intervals into fixed-width slots.
pub struct SlotDiscretizer {
    slot_minutes: i64,
}

impl SlotDiscretizer {
    /// Create a discretizer with the default 30-minute granularity.
    pub fn new() -> Self {
        Self {
            slot_minutes: DEFAULT_SLOT_MINUTES,
        }
    }

    /// Set the slot granularity.
    pub fn with_slot_minutes(mut self, minutes: i64) -> Self {
        self.slot_minutes = minutes;
        self
    }

    /// Split each free interval into slots no longer than the granularity;
    /// the final slot of an interval may be shorter. Every slot starts out
    /// available. `concentration_time` is set only when the slot lies
    /// entirely inside the concentration window.
    ///
    /// A non-positive granularity yields no slots; callers that take the
    /// granularity from external input validate it first.
    pub fn discretize(
        &self,
        free: &[Interval],
        concentration: Option<&ConcentrationWindow>,
    ) -> Vec<Slot> {
        if self.slot_minutes <= 0 {
            return Vec::new();
        }
        let step = Duration::minutes(self.slot_minutes);
        let mut slots = Vec::new();

        for interval in free {
            let mut cursor = interval.start;
            while cursor < interval.end {
                let slot_end = (cursor + step).min(interval.end);
                let concentration_time = concentration
                    .map(|window| window.covers(cursor, slot_end))
                    .unwrap_or(false);

                slots.push(Slot {
                    start: cursor,
                    end: slot_end,
                    available: true,
                    concentration_time,
                });
                cursor = cursor + step;
            }
        }

        slots
    }
}

impl Default for SlotDiscretizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Tz> {
        Tz::UTC.with_ymd_and_hms(2024, 6, 3, hour, min, 0).unwrap()
    }

    fn iv(start_h: u32, start_m: u32, end_h: u32, end_m: u32) -> Interval {
        Interval::new(at(start_h, start_m), at(end_h, end_m)).unwrap()
    }

    fn window(start_h: u32, start_m: u32, end_h: u32, end_m: u32) -> ConcentrationWindow {
        ConcentrationWindow {
            start: at(start_h, start_m),
            end: at(end_h, end_m),
        }
    }

    #[test]
    fn splits_into_half_hour_slots_with_short_tail() {
        let slots = SlotDiscretizer::new().discretize(&[iv(9, 0, 10, 15)], None);

        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].start, at(9, 0));
        assert_eq!(slots[0].end, at(9, 30));
        assert_eq!(slots[2].start, at(10, 0));
        assert_eq!(slots[2].end, at(10, 15));
        assert_eq!(slots[2].duration_minutes(), 15);
        assert!(slots.iter().all(|s| s.available));
    }

    #[test]
    fn slots_cover_intervals_without_gaps_or_overlap() {
        let free = vec![iv(8, 0, 10, 0), iv(11, 10, 12, 0)];
        let slots = SlotDiscretizer::new().discretize(&free, None);

        for pair in slots.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
        let total: i64 = slots.iter().map(|s| s.duration_minutes()).sum();
        assert_eq!(total, 120 + 50);
    }

    #[test]
    fn concentration_requires_strict_containment() {
        let conc = window(9, 0, 12, 0);
        let slots = SlotDiscretizer::new().discretize(&[iv(8, 0, 13, 0)], Some(&conc));

        let find = |h: u32, m: u32| slots.iter().find(|s| s.start == at(h, m)).unwrap();
        assert!(!find(8, 30).concentration_time);
        assert!(find(9, 0).concentration_time);
        assert!(find(9, 30).concentration_time);
        assert!(find(11, 30).concentration_time);
        assert!(!find(12, 0).concentration_time);
    }

    #[test]
    fn slot_straddling_window_end_is_not_concentration() {
        // Slot [11:45, 12:15) exceeds a 09:00-12:00 window.
        let conc = window(9, 0, 12, 0);
        let slots = SlotDiscretizer::new().discretize(&[iv(11, 45, 12, 15)], Some(&conc));

        assert_eq!(slots.len(), 1);
        assert!(!slots[0].concentration_time);
    }

    #[test]
    fn non_positive_granularity_yields_no_slots() {
        // The cursor cannot advance with a zero or negative step, so these
        // granularities must short-circuit instead of looping.
        let free = [iv(8, 0, 9, 0)];
        assert!(SlotDiscretizer::new()
            .with_slot_minutes(0)
            .discretize(&free, None)
            .is_empty());
        assert!(SlotDiscretizer::new()
            .with_slot_minutes(-30)
            .discretize(&free, None)
            .is_empty());
    }

    #[test]
    fn no_window_means_no_concentration_slots() {
        let slots = SlotDiscretizer::new().discretize(&[iv(9, 0, 12, 0)], None);
        assert!(slots.iter().all(|s| !s.concentration_time));
    }

    #[test]
    fn concentration_window_parses_wall_clock_bounds() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let conc = ConcentrationWindow::parse("09:00", "12:00", date, Tz::UTC).unwrap();
        assert_eq!(conc.start, at(9, 0));
        assert_eq!(conc.end, at(12, 0));

        assert!(ConcentrationWindow::parse("12:00", "09:00", date, Tz::UTC).is_err());
        assert!(ConcentrationWindow::parse("noon", "13:00", date, Tz::UTC).is_err());
    }
}
