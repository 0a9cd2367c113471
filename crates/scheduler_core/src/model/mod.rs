//! Scheduler domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//!
//! # Invariants
//! - A stored task is identified by a storage-assigned `TaskId`.
//! - Completing a non-repeating task removes it; there are no tombstones.

pub mod task;
