//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/fetch/update/delete/list APIs over the `scheduler` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate the task and its date before SQL mutations.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Listing is ordered by `date ASC, id ASC` and always bounded.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::task::{Task, TaskId, TaskValidationError};
use crate::schedule::parse_date;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Limit applied when callers do not ask for one.
pub const DEFAULT_LIST_LIMIT: u32 = 50;
/// Upper bound for one list call.
pub const MAX_LIST_LIMIT: u32 = 500;

const TASKS_TABLE: &str = "scheduler";
const TASKS_COLUMNS: [&str; 5] = ["id", "date", "title", "comment", "repeat"];

const TASK_SELECT_SQL: &str = "SELECT
    id,
    date,
    title,
    comment,
    repeat
FROM scheduler";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    NotFound(TaskId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Task data (persisted or about to be persisted) violates storage invariants.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task id={id} not found"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "task repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "task repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "task repository requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for tasks.
pub trait TaskRepository {
    /// Inserts a task and returns its storage-assigned id. `task.id` is ignored.
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    /// Fetches one task; `NotFound` when no row matches.
    fn get_task(&self, id: TaskId) -> RepoResult<Task>;
    /// Replaces every field of the row matching `task.id`.
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    /// Replaces only the `date` column of one row.
    fn update_task_date(&self, id: TaskId, date: &str) -> RepoResult<()>;
    /// Deletes one row. Deleting a missing id succeeds.
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    /// Lists up to `limit` tasks, earliest date first.
    fn list_tasks(&self, limit: u32) -> RepoResult<Vec<Task>>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_task_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        ensure_storable(task)?;

        self.conn.execute(
            "INSERT INTO scheduler (date, title, comment, repeat)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                task.date.as_str(),
                task.title.as_str(),
                task.comment.as_str(),
                task.repeat.as_str(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Task> {
        let mut stmt = self.conn.prepare(&format!("{TASK_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => parse_task_row(row),
            None => Err(RepoError::NotFound(id)),
        }
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        let id = task.validate_for_update()?;
        ensure_storable(task)?;

        let changed = self.conn.execute(
            "UPDATE scheduler
             SET
                date = ?1,
                title = ?2,
                comment = ?3,
                repeat = ?4
             WHERE id = ?5;",
            params![
                task.date.as_str(),
                task.title.as_str(),
                task.comment.as_str(),
                task.repeat.as_str(),
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn update_task_date(&self, id: TaskId, date: &str) -> RepoResult<()> {
        ensure_date(date)?;

        let changed = self.conn.execute(
            "UPDATE scheduler SET date = ?1 WHERE id = ?2;",
            params![date, id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        self.conn.execute("DELETE FROM scheduler WHERE id = ?1;", [id])?;
        Ok(())
    }

    fn list_tasks(&self, limit: u32) -> RepoResult<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} ORDER BY date ASC, id ASC LIMIT ?1;"))?;

        let mut rows = stmt.query([i64::from(limit)])?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }
}

/// Normalizes list limit: `None`/`0` -> default, values above max are clamped.
pub fn normalize_list_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => DEFAULT_LIST_LIMIT,
        Some(value) if value > MAX_LIST_LIMIT => MAX_LIST_LIMIT,
        Some(value) => value,
    }
}

fn ensure_storable(task: &Task) -> RepoResult<()> {
    task.validate()?;
    ensure_date(&task.date)
}

fn ensure_date(date: &str) -> RepoResult<()> {
    if parse_date(date).is_none() {
        return Err(RepoError::InvalidData(format!(
            "date `{date}` is not a YYYYMMDD calendar date"
        )));
    }
    Ok(())
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id: TaskId = row.get("id")?;
    let date: String = row.get("date")?;
    if parse_date(&date).is_none() {
        return Err(RepoError::InvalidData(format!(
            "invalid date `{date}` in scheduler.date for id={id}"
        )));
    }

    Ok(Task {
        id: Some(id),
        date,
        title: row.get("title")?,
        comment: row.get("comment")?,
        repeat: row.get("repeat")?,
    })
}

fn ensure_task_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, TASKS_TABLE)? {
        return Err(RepoError::MissingRequiredTable(TASKS_TABLE));
    }

    for column in TASKS_COLUMNS {
        if !table_has_column(conn, TASKS_TABLE, column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: TASKS_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
