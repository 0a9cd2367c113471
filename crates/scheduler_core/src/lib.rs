//! Core domain logic for the task scheduler.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod schedule;
pub mod service;

pub use logging::{
    active_log_settings, default_log_level, init_logging, LogSettings, LoggingError,
};
pub use model::task::{Task, TaskId, TaskValidationError};
pub use repo::task_repo::{
    normalize_list_limit, RepoError, RepoResult, SqliteTaskRepository, TaskRepository,
    DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT,
};
pub use schedule::normalize::{normalize_task_date, TaskDateError};
pub use schedule::{
    format_date, next_date, parse_date, RecurrenceError, RepeatRule, DATE_FORMAT, MAX_DATE_YEAR,
};
pub use service::clock::{Clock, FixedClock, SystemClock};
pub use service::task_service::{Completion, TaskService, TaskServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
