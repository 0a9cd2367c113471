use scheduler_core::db::migrations::latest_version;
use scheduler_core::db::{open_db, open_db_in_memory, DbError};
use scheduler_core::{SqliteTaskRepository, Task, TaskRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "scheduler");
    assert_index_exists(&conn, "scheduler_date_idx");
}

#[test]
fn reopening_file_database_keeps_tasks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scheduler.db");

    let conn_first = open_db(&path).unwrap();
    let id = SqliteTaskRepository::try_new(&conn_first)
        .unwrap()
        .create_task(&Task::new("persisted").with_date("20240310"))
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let loaded = SqliteTaskRepository::try_new(&conn_second)
        .unwrap()
        .get_task(id)
        .unwrap();
    assert_eq!(loaded.title, "persisted");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, name: &str) {
    assert_schema_object(conn, "table", name);
}

fn assert_index_exists(conn: &Connection, name: &str) {
    assert_schema_object(conn, "index", name);
}

fn assert_schema_object(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
