//! Shared server state.
//!
//! # Invariants
//! - One SQLite connection per process, guarded by a mutex.
//! - Storage work never runs on async worker threads.

use crate::error::ApiError;
use rusqlite::Connection;
use chrono::NaiveDate;
use scheduler_core::{Clock, SqliteTaskRepository, TaskService};
use std::sync::{Arc, Mutex};

/// Clock shared across request handlers.
pub type SharedClock = dyn Clock + Send + Sync;

/// Service type handed to request closures.
pub type RequestService<'a> = TaskService<SqliteTaskRepository<'a>, &'a SharedClock>;

/// Shared application state.
pub struct AppState {
    conn: Mutex<Connection>,
    clock: Box<SharedClock>,
}

impl AppState {
    /// Wraps a migrated connection and the clock used for "today".
    pub fn new(conn: Connection, clock: impl Clock + Send + Sync + 'static) -> Self {
        Self {
            conn: Mutex::new(conn),
            clock: Box::new(clock),
        }
    }

    /// Returns "today" according to the configured clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Runs `op` against a task service on the blocking thread pool.
    pub async fn with_service<T, E, F>(self: &Arc<Self>, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        E: Into<ApiError>,
        F: for<'a> FnOnce(&RequestService<'a>) -> Result<T, E> + Send + 'static,
    {
        let state = Arc::clone(self);
        tokio::task::spawn_blocking(move || {
            let conn = state
                .conn
                .lock()
                .map_err(|_| ApiError::internal("database lock poisoned"))?;
            let repo = SqliteTaskRepository::try_new(&conn).map_err(ApiError::from)?;
            let service = TaskService::new(repo, state.clock.as_ref());
            op(&service).map_err(Into::into)
        })
        .await
        .map_err(|err| ApiError::internal(format!("request worker failed: {err}")))?
    }
}
