//! Free-time computation and slot discretization.
//!
//! This module provides:
//! - Free-interval calculation (working day minus buffer-padded busy time)
//! - Discretization of free intervals into fixed-width assignable slots
//! - Concentration-window tagging of slots

mod discretize;
mod free;

pub use discretize::{ConcentrationWindow, Slot, SlotDiscretizer, DEFAULT_SLOT_MINUTES};
pub use free::{FreeSlotCalculator, DEFAULT_BUFFER_MINUTES};
