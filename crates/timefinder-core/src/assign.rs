//! Greedy first-fit assignment of tasks to discretized slots.
//!
//! Two passes over the priority-sorted task list:
//! 1. High-concentration tasks may only start in concentration-time slots,
//!    low-concentration tasks only outside them.
//! 2. Medium-concentration tasks try concentration time first, then fall
//!    back to any available slot.
//!
//! Slot availability is mutated in place as assignments commit, so earlier
//! placements constrain later feasibility checks. The pass is strictly
//! sequential.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use serde::Serialize;

use crate::slots::Slot;
use crate::task::{Concentration, Task};

/// A committed task placement.
#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub task_id: String,
    pub task_name: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

/// First-fit task assigner.
pub struct TaskAssigner {
    buffer_minutes: i64,
}

impl TaskAssigner {
    /// Create an assigner with the given post-task buffer.
    pub fn new(buffer_minutes: i64) -> Self {
        Self { buffer_minutes }
    }

    /// Assign each task to the earliest feasible run of slots.
    ///
    /// `tasks` must already be priority-sorted; the returned assignments
    /// preserve task-processing order (pass 1 in input order, then the
    /// deferred medium-concentration tasks), not slot order. Tasks that fit
    /// nowhere are silently dropped.
    pub fn assign(&self, tasks: &[Task], slots: &mut [Slot]) -> Vec<Assignment> {
        let mut assignments = Vec::new();
        let mut deferred = Vec::new();

        for task in tasks {
            let wants_concentration = match task.concentration {
                Concentration::High => true,
                Concentration::Low => false,
                Concentration::Medium => {
                    deferred.push(task);
                    continue;
                }
            };
            self.place(task, slots, Some(wants_concentration), &mut assignments);
        }

        for task in deferred {
            if !self.place(task, slots, Some(true), &mut assignments) {
                self.place(task, slots, None, &mut assignments);
            }
        }

        assignments
    }

    /// Try to place a task starting in the first candidate slot that passes
    /// the feasibility walk. `wants_concentration` filters candidate start
    /// slots; `None` accepts any available slot.
    fn place(
        &self,
        task: &Task,
        slots: &mut [Slot],
        wants_concentration: Option<bool>,
        assignments: &mut Vec<Assignment>,
    ) -> bool {
        for index in 0..slots.len() {
            let slot = &slots[index];
            if !slot.available {
                continue;
            }
            if let Some(wanted) = wants_concentration {
                if slot.concentration_time != wanted {
                    continue;
                }
            }
            if self.fits(task, slots, index) {
                self.commit(task, slots, index, assignments);
                return true;
            }
        }
        false
    }

    /// Walk forward from `start_index` through consecutive available slots,
    /// accumulating their durations until `duration + buffer` is reached.
    /// An unavailable slot before the threshold rejects this candidate.
    fn fits(&self, task: &Task, slots: &[Slot], start_index: usize) -> bool {
        let required = Duration::minutes(task.duration_minutes + self.buffer_minutes);
        let mut accumulated = Duration::zero();

        for slot in &slots[start_index..] {
            if !slot.available {
                return false;
            }
            accumulated = accumulated + (slot.end - slot.start);
            if accumulated >= required {
                return true;
            }
        }

        false
    }

    /// Commit the task at the chosen slot and consume every slot that
    /// intersects `[start, end + buffer)`. Partial overlap is enough to
    /// consume a slot; there is no slot splitting on commit.
    fn commit(
        &self,
        task: &Task,
        slots: &mut [Slot],
        start_index: usize,
        assignments: &mut Vec<Assignment>,
    ) {
        let start = slots[start_index].start;
        let end = start + Duration::minutes(task.duration_minutes);
        let consumed_until = end + Duration::minutes(self.buffer_minutes);

        for slot in slots.iter_mut() {
            if slot.overlaps_range(start, consumed_until) {
                slot.available = false;
            }
        }

        assignments.push(Assignment {
            task_id: task.id.clone(),
            task_name: task.name.clone(),
            start,
            end,
        });
    }
}
