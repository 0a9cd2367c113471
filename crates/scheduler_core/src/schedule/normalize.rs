//! Save-time date normalization for tasks.
//!
//! # Invariants
//! - On success `task.date` is a valid, non-empty `YYYYMMDD` date.
//! - A repeating task whose date is today or earlier moves to its next
//!   occurrence after today.
//! - A non-repeating task is never stored in the past; it snaps to today.
//! - Future dates are kept as given.

use super::date::{format_date, parse_date};
use super::repeat::{next_date, RecurrenceError};
use crate::model::task::Task;
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Caller-visible validation failure raised while normalizing a task date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskDateError {
    /// `task.date` is not a valid `YYYYMMDD` date.
    InvalidDate(String),
    /// `task.repeat` could not produce a next occurrence.
    Repeat(RecurrenceError),
}

impl Display for TaskDateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDate(value) => write!(f, "error in date: invalid date `{value}`"),
            Self::Repeat(err) => write!(f, "error in repeat: {err}"),
        }
    }
}

impl Error for TaskDateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidDate(_) => None,
            Self::Repeat(err) => Some(err),
        }
    }
}

impl From<RecurrenceError> for TaskDateError {
    fn from(value: RecurrenceError) -> Self {
        Self::Repeat(value)
    }
}

/// Derives the date a task should be stored with, relative to `today`.
///
/// Only `task.date` is mutated. An empty date defaults to `today` before any
/// other check, so that default survives even when the repeat rule is
/// rejected afterwards.
pub fn normalize_task_date(task: &mut Task, today: NaiveDate) -> Result<(), TaskDateError> {
    if task.date.is_empty() {
        task.date = format_date(today);
    }

    let date =
        parse_date(&task.date).ok_or_else(|| TaskDateError::InvalidDate(task.date.clone()))?;

    if task.is_repeating() {
        let next = next_date(today, &task.date, &task.repeat)?;
        if date <= today {
            task.date = next;
        }
        return Ok(());
    }

    if date <= today {
        task.date = format_date(today);
    }
    Ok(())
}
