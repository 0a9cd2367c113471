//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate normalization, recurrence and repository calls into
//!   use-case level APIs.
//! - Keep the HTTP layer decoupled from storage details.

pub mod clock;
pub mod task_service;
