//! Repeat rule grammar and next-occurrence computation.
//!
//! Grammar: `""` (no recurrence), `"y"` (yearly), `"d <N>"` with N in
//! `[MIN_DAY_INTERVAL, MAX_DAY_INTERVAL]`. `"w"` and `"m"` are recognized
//! but rejected.

use super::date::{format_date, parse_date, MAX_DATE_YEAR};
use chrono::{Datelike, Days, NaiveDate};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const MIN_DAY_INTERVAL: u32 = 1;
pub const MAX_DAY_INTERVAL: u32 = 400;

const DAILY_PREFIX: &str = "d ";

/// Failure to compute a next occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    /// The repeat rule is empty; non-repeating tasks have no next occurrence.
    EmptyRule,
    /// The start date is not a valid `YYYYMMDD` date.
    InvalidDate(String),
    /// `d <N>` with N missing, non-numeric or outside `[1, 400]`.
    InvalidInterval(String),
    /// Weekly (`w`) or monthly (`m`) rules.
    UnsupportedRule(String),
    /// Any other rule text.
    UnknownRule(String),
    /// Date arithmetic left the representable calendar range.
    DateOutOfRange,
}

impl Display for RecurrenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRule => write!(f, "repeat cannot be empty"),
            Self::InvalidDate(value) => write!(f, "incorrect start date `{value}`"),
            Self::InvalidInterval(value) => write!(
                f,
                "daily interval should be from {MIN_DAY_INTERVAL} to {MAX_DAY_INTERVAL}, got `{value}`"
            ),
            Self::UnsupportedRule(rule) => write!(f, "repeat rule `{rule}` is not supported"),
            Self::UnknownRule(rule) => write!(f, "unknown repeat rule `{rule}`"),
            Self::DateOutOfRange => write!(f, "next date is out of the supported calendar range"),
        }
    }
}

impl Error for RecurrenceError {}

/// A parsed, valid repeat rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatRule {
    /// Same month and day every year.
    Yearly,
    /// Every N days, N in `[1, 400]`.
    EveryDays(u32),
}

impl RepeatRule {
    /// Parses rule text. The empty rule is an error here: callers decide
    /// what "no recurrence" means before asking for a rule.
    pub fn parse(value: &str) -> Result<Self, RecurrenceError> {
        if value.is_empty() {
            return Err(RecurrenceError::EmptyRule);
        }
        if value == "y" {
            return Ok(Self::Yearly);
        }
        if let Some(interval) = value.strip_prefix(DAILY_PREFIX) {
            let days = interval
                .parse::<i64>()
                .map_err(|_| RecurrenceError::InvalidInterval(interval.to_string()))?;
            return match u32::try_from(days) {
                Ok(days) if (MIN_DAY_INTERVAL..=MAX_DAY_INTERVAL).contains(&days) => {
                    Ok(Self::EveryDays(days))
                }
                _ => Err(RecurrenceError::InvalidInterval(interval.to_string())),
            };
        }
        if value == "w" || value == "m" {
            return Err(RecurrenceError::UnsupportedRule(value.to_string()));
        }
        Err(RecurrenceError::UnknownRule(value.to_string()))
    }

    /// Moves `date` forward by exactly one rule step.
    ///
    /// Yearly steps keep month/day; Feb 29 lands on Mar 1 in non-leap years.
    /// Returns `None` once the result would not fit a `YYYYMMDD` string.
    pub fn step(self, date: NaiveDate) -> Option<NaiveDate> {
        let next = match self {
            Self::Yearly => {
                let year = date.year().checked_add(1)?;
                NaiveDate::from_ymd_opt(year, date.month(), date.day())
                    .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
            }
            Self::EveryDays(days) => date.checked_add_days(Days::new(u64::from(days))),
        }?;
        (next.year() <= MAX_DATE_YEAR).then_some(next)
    }

    /// Returns the first date reachable from `start` by one or more steps
    /// that is strictly after `reference`.
    ///
    /// `start` is always advanced at least once, even when it is already
    /// after `reference`.
    pub fn next_after(
        self,
        start: NaiveDate,
        reference: NaiveDate,
    ) -> Result<NaiveDate, RecurrenceError> {
        std::iter::successors(self.step(start), |current| self.step(*current))
            .find(|candidate| *candidate > reference)
            .ok_or(RecurrenceError::DateOutOfRange)
    }
}

/// Computes the next occurrence of `repeat` starting from `start_date`,
/// strictly after `reference`.
///
/// Checks run in order: empty rule, start date syntax, rule grammar.
pub fn next_date(
    reference: NaiveDate,
    start_date: &str,
    repeat: &str,
) -> Result<String, RecurrenceError> {
    if repeat.is_empty() {
        return Err(RecurrenceError::EmptyRule);
    }
    let start = parse_date(start_date)
        .ok_or_else(|| RecurrenceError::InvalidDate(start_date.to_string()))?;
    let rule = RepeatRule::parse(repeat)?;
    rule.next_after(start, reference).map(format_date)
}
