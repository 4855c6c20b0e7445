//! Free-interval calculation: working-day window minus busy calendar time.
//!
//! Each busy interval is padded on its end with a buffer before subtraction,
//! so a gap always follows a meeting before anything can be scheduled.

use crate::interval::Interval;

/// Default buffer appended after every busy interval, in minutes.
pub const DEFAULT_BUFFER_MINUTES: i64 = 10;

/// Computes the free intervals of a working day.
pub struct FreeSlotCalculator {
    buffer_minutes: i64,
}

impl FreeSlotCalculator {
    /// Create a calculator with the default 10-minute buffer.
    pub fn new() -> Self {
        Self {
            buffer_minutes: DEFAULT_BUFFER_MINUTES,
        }
    }

    /// Set the buffer appended after each busy interval.
    pub fn with_buffer(mut self, minutes: i64) -> Self {
        self.buffer_minutes = minutes;
        self
    }

    /// Subtract `busy` intervals (end-padded with the buffer) from the
    /// working-day `window`.
    ///
    /// Returns an ordered, non-overlapping list of free intervals covering
    /// exactly the window minus the union of padded busy intervals. Each
    /// busy interval is applied across the whole current free list before
    /// the next one is taken, so the order of `busy` does not matter.
    pub fn free_intervals(&self, window: &Interval, busy: &[Interval]) -> Vec<Interval> {
        let mut free = vec![window.clone()];

        for event in busy {
            let padded = event.pad_end(self.buffer_minutes);
            let mut next = Vec::with_capacity(free.len() + 1);
            for interval in &free {
                next.extend(interval.subtract(&padded));
            }
            free = next;
        }

        free
    }
}

impl Default for FreeSlotCalculator {
    fn default() -> Self {
        Self::new()
    }
}
