//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contract the task service depends on.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes enforce `Task::validate()` and a parseable date.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod task_repo;
