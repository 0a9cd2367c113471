//! Recurrence date engine.
//!
//! # Responsibility
//! - Parse and format `YYYYMMDD` calendar dates.
//! - Compute the next occurrence of a repeat rule after a reference date.
//! - Decide the stored date of a task at save time (`normalize`).
//!
//! # Invariants
//! - Everything here is pure: no I/O, no shared state, no wall clock reads.
//! - A computed occurrence is always strictly after its reference date.

mod date;
pub mod normalize;
mod repeat;

pub use date::{format_date, parse_date, DATE_FORMAT, MAX_DATE_YEAR};
pub use repeat::{next_date, RecurrenceError, RepeatRule, MAX_DAY_INTERVAL, MIN_DAY_INTERVAL};
