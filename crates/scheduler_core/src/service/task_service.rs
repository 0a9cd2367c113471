//! Task use-case service.
//!
//! # Responsibility
//! - Provide create/update/get/list/delete/complete entry points.
//! - Run date normalization before every create and update.
//! - Apply the completion workflow for repeating and one-off tasks.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Completing a repeating task changes only its stored date.
//! - Completing a one-off task deletes it.
//! - "Today" is read once per call from the injected `Clock`.

use crate::model::task::{Task, TaskId, TaskValidationError};
use crate::repo::task_repo::{normalize_list_limit, RepoError, TaskRepository};
use crate::schedule::normalize::{normalize_task_date, TaskDateError};
use crate::schedule::{next_date, RecurrenceError};
use crate::service::clock::Clock;
use chrono::{Days, NaiveDate};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for task use-cases.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Caller-owned fields are invalid (empty title, missing id).
    Validation(TaskValidationError),
    /// Date or repeat rule rejected during normalization.
    Date(TaskDateError),
    /// Next occurrence could not be computed.
    Recurrence(RecurrenceError),
    /// Target task does not exist.
    TaskNotFound(TaskId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Date(err) => write!(f, "{err}"),
            Self::Recurrence(err) => write!(f, "{err}"),
            Self::TaskNotFound(id) => write!(f, "task id={id} not found"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Date(err) => Some(err),
            Self::Recurrence(err) => Some(err),
            Self::TaskNotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for TaskServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<TaskDateError> for TaskServiceError {
    fn from(value: TaskDateError) -> Self {
        Self::Date(value)
    }
}

impl From<RecurrenceError> for TaskServiceError {
    fn from(value: RecurrenceError) -> Self {
        Self::Recurrence(value)
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::TaskNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Outcome of marking a task done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// One-off task reached its terminal state and was removed.
    Deleted,
    /// Repeating task moved to its next occurrence.
    Rescheduled { date: String },
}

/// Task service facade over repository and clock implementations.
pub struct TaskService<R: TaskRepository, C: Clock> {
    repo: R,
    clock: C,
}

impl<R: TaskRepository, C: Clock> TaskService<R, C> {
    /// Creates a service using the provided repository and clock.
    pub fn new(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    /// Validates, normalizes and inserts a task. Any caller-provided id is ignored.
    pub fn add_task(&self, mut task: Task) -> Result<TaskId, TaskServiceError> {
        task.validate()?;
        normalize_task_date(&mut task, self.clock.today())?;

        let id = self.repo.create_task(&task)?;
        info!(
            "event=task_create module=service status=ok id={} repeating={}",
            id,
            task.is_repeating()
        );
        Ok(id)
    }

    /// Validates, normalizes and replaces a stored task.
    ///
    /// Returns the normalized task that was written.
    pub fn update_task(&self, mut task: Task) -> Result<Task, TaskServiceError> {
        let id = task.validate_for_update()?;
        normalize_task_date(&mut task, self.clock.today())?;

        self.repo.update_task(&task)?;
        info!("event=task_update module=service status=ok id={id}");
        Ok(task)
    }

    /// Gets one task by id.
    pub fn get_task(&self, id: TaskId) -> Result<Task, TaskServiceError> {
        Ok(self.repo.get_task(id)?)
    }

    /// Lists tasks earliest date first; `limit` defaults to 50.
    pub fn list_tasks(&self, limit: Option<u32>) -> Result<Vec<Task>, TaskServiceError> {
        Ok(self.repo.list_tasks(normalize_list_limit(limit))?)
    }

    /// Deletes a task. Deleting a missing id succeeds.
    pub fn delete_task(&self, id: TaskId) -> Result<(), TaskServiceError> {
        self.repo.delete_task(id)?;
        info!("event=task_delete module=service status=ok id={id}");
        Ok(())
    }

    /// Marks a task done.
    ///
    /// One-off tasks are deleted. Repeating tasks advance to the first
    /// occurrence after tomorrow, so a task completed today never comes
    /// back on the same day.
    pub fn complete_task(&self, id: TaskId) -> Result<Completion, TaskServiceError> {
        let task = self.repo.get_task(id)?;

        if !task.is_repeating() {
            self.repo.delete_task(id)?;
            info!("event=task_complete module=service status=ok id={id} outcome=deleted");
            return Ok(Completion::Deleted);
        }

        let tomorrow = tomorrow_of(self.clock.today())?;
        let date = match next_date(tomorrow, &task.date, &task.repeat) {
            Ok(date) => date,
            Err(err) => {
                warn!(
                    "event=task_complete module=service status=error id={} error_code=next_date_failed error={}",
                    id, err
                );
                return Err(err.into());
            }
        };

        self.repo.update_task_date(id, &date)?;
        info!(
            "event=task_complete module=service status=ok id={} outcome=rescheduled date={}",
            id, date
        );
        Ok(Completion::Rescheduled { date })
    }

    /// Computes the next occurrence relative to `reference`, or to today
    /// when no reference is given.
    pub fn next_date(
        &self,
        reference: Option<NaiveDate>,
        date: &str,
        repeat: &str,
    ) -> Result<String, TaskServiceError> {
        let reference = reference.unwrap_or_else(|| self.clock.today());
        Ok(next_date(reference, date, repeat)?)
    }
}

fn tomorrow_of(today: NaiveDate) -> Result<NaiveDate, RecurrenceError> {
    today
        .checked_add_days(Days::new(1))
        .ok_or(RecurrenceError::DateOutOfRange)
}
