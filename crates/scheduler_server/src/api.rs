//! HTTP API over the task service.
//!
//! # Responsibility
//! - Route `/api/*` requests to task use-cases.
//! - Translate JSON/query input into core types and core errors into
//!   HTTP status codes.
//! - Serve the web client for every other path.
//!
//! # Invariants
//! - Handlers never touch SQLite directly; storage goes through `AppState`.
//! - `/api/nextdate` is pure date arithmetic and never takes the connection.
//! - Errors are `{"error": "..."}` JSON, except `/api/nextdate`, which
//!   answers in plain text.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{debug, warn};
use scheduler_core::{parse_date, Completion, Task, TaskId, TaskServiceError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;

#[derive(Debug, Deserialize)]
struct NextDateQuery {
    now: Option<String>,
    date: Option<String>,
    repeat: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdQuery {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<u32>,
}

#[derive(Debug, Serialize)]
struct TasksResponse {
    tasks: Vec<Task>,
}

/// Builds the application router.
pub fn create_router(state: Arc<AppState>, web_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/api/nextdate", get(next_date))
        .route(
            "/api/task",
            post(add_task)
                .get(get_task)
                .put(update_task)
                .delete(delete_task),
        )
        .route("/api/task/done", post(done_task))
        .route("/api/tasks", get(list_tasks))
        .with_state(state)
        .fallback_service(ServeDir::new(web_dir.as_ref()))
}

async fn next_date(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NextDateQuery>,
) -> Result<String, (StatusCode, String)> {
    let reference = match query.now.as_deref().filter(|value| !value.is_empty()) {
        Some(raw) => parse_date(raw).ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                format!("wrong format: invalid now `{raw}`"),
            )
        })?,
        None => state.today(),
    };
    let date = query.date.unwrap_or_default();
    let repeat = query.repeat.unwrap_or_default();

    scheduler_core::next_date(reference, &date, &repeat).map_err(|err| {
        debug!("event=next_date module=api status=rejected error={err}");
        (StatusCode::BAD_REQUEST, err.to_string())
    })
}

async fn add_task(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Task>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let task = decode_task(payload)?;
    let id = state
        .with_service(move |service| service.add_task(task))
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Task>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let task = decode_task(payload)?;
    state
        .with_service(move |service| service.update_task(task))
        .await?;
    Ok(empty_object())
}

async fn get_task(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Task>, ApiError> {
    let id = parse_id(query.id.as_deref())?;
    let task = state
        .with_service(move |service| service.get_task(id))
        .await?;
    Ok(Json(task))
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(query.id.as_deref())?;
    state
        .with_service(move |service| service.delete_task(id))
        .await?;
    Ok(empty_object())
}

async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<TasksResponse>, ApiError> {
    let tasks = state
        .with_service(move |service| service.list_tasks(query.limit))
        .await?;
    Ok(Json(TasksResponse { tasks }))
}

async fn done_task(
    State(state): State<Arc<AppState>>,
    Query(query): Query<IdQuery>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(query.id.as_deref())?;
    let completion = state
        .with_service(move |service| {
            service.complete_task(id).map_err(|err| match err {
                // A stored rule that no longer computes is a server-side data problem.
                TaskServiceError::Recurrence(inner) => {
                    ApiError::internal(format!("next date failed for task id={id}: {inner}"))
                }
                other => ApiError::from(other),
            })
        })
        .await?;

    if let Completion::Rescheduled { date } = &completion {
        debug!("event=task_done module=api status=ok id={id} next_date={date}");
    }
    Ok(empty_object())
}

fn decode_task(payload: Result<Json<Task>, JsonRejection>) -> Result<Task, ApiError> {
    match payload {
        Ok(Json(task)) => Ok(task),
        Err(rejection) => {
            warn!(
                "event=http_decode module=api status=error error_code=invalid_json error={}",
                rejection.body_text()
            );
            Err(ApiError::bad_request("deserializing JSON error"))
        }
    }
}

fn parse_id(raw: Option<&str>) -> Result<TaskId, ApiError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(ApiError::bad_request("id cannot be empty"));
    }
    raw.parse::<TaskId>()
        .map_err(|_| ApiError::bad_request(format!("incorrect id `{raw}`")))
}

fn empty_object() -> Json<Value> {
    Json(json!({}))
}
