//! Task domain model.
//!
//! # Responsibility
//! - Define the record persisted in the `scheduler` table.
//! - Validate caller-owned fields before persistence.
//! - Own the wire shape used by HTTP callers (`id` travels as a string).
//!
//! # Invariants
//! - `id` is assigned by storage on insert and never changes afterwards.
//! - `date` holds a `YYYYMMDD` calendar date once normalized.
//! - `repeat` is interpreted by the core but never rewritten by it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned task identifier (`scheduler.id`).
pub type TaskId = i64;

/// Validation errors for caller-owned task fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// `title` is the empty string.
    EmptyTitle,
    /// An update was requested for a task that carries no id.
    MissingId,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title is empty"),
            Self::MissingId => write!(f, "id is empty"),
        }
    }
}

impl Error for TaskValidationError {}

/// One scheduled task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// `None` until the task has been stored.
    #[serde(
        default,
        serialize_with = "serialize_id",
        deserialize_with = "deserialize_id"
    )]
    pub id: Option<TaskId>,
    /// Next due date, `YYYYMMDD`. May be empty on input; filled by normalization.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub comment: String,
    /// Repeat rule: `""`, `"y"` or `"d <N>"`.
    #[serde(default)]
    pub repeat: String,
}

impl Task {
    /// Creates an unsaved task with the given title and empty optional fields.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the due date (builder style).
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Sets the repeat rule (builder style).
    pub fn with_repeat(mut self, repeat: impl Into<String>) -> Self {
        self.repeat = repeat.into();
        self
    }

    /// Sets the comment (builder style).
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Returns whether this task recurs.
    pub fn is_repeating(&self) -> bool {
        !self.repeat.is_empty()
    }

    /// Validates fields the core does not derive itself.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(())
    }

    /// Validates a task that is about to replace a stored row.
    pub fn validate_for_update(&self) -> Result<TaskId, TaskValidationError> {
        self.validate()?;
        self.id.ok_or(TaskValidationError::MissingId)
    }
}

fn serialize_id<S: Serializer>(id: &Option<TaskId>, serializer: S) -> Result<S::Ok, S::Error> {
    match id {
        Some(value) => serializer.serialize_str(&value.to_string()),
        None => serializer.serialize_str(""),
    }
}

// Accepts `"42"`, `42`, `""`, `"0"` and `null`; zero and empty mean "no id".
fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<TaskId>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(TaskId),
    }

    let parsed = match Option::<RawId>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(RawId::Number(value)) => value,
        Some(RawId::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<TaskId>()
                .map_err(|_| serde::de::Error::custom(format!("invalid task id `{trimmed}`")))?
        }
    };

    Ok((parsed != 0).then_some(parsed))
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskValidationError};
    use serde_json::json;

    #[test]
    fn validate_rejects_only_empty_title() {
        assert_eq!(
            Task::new("").validate(),
            Err(TaskValidationError::EmptyTitle)
        );
        assert!(Task::new("   ").validate().is_ok());
        assert!(Task::new("water plants").validate().is_ok());
    }

    #[test]
    fn validate_for_update_requires_id() {
        let mut task = Task::new("pay rent");
        assert_eq!(
            task.validate_for_update(),
            Err(TaskValidationError::MissingId)
        );

        task.id = Some(7);
        assert_eq!(task.validate_for_update(), Ok(7));
    }

    #[test]
    fn builder_sets_optional_fields() {
        let task = Task::new("gym")
            .with_date("20240310")
            .with_repeat("d 2")
            .with_comment("legs");
        assert_eq!(task.date, "20240310");
        assert!(task.is_repeating());
        assert_eq!(task.comment, "legs");
        assert!(task.id.is_none());
    }

    #[test]
    fn id_accepts_numbers_and_strings() {
        for raw in [json!(42), json!("42"), json!(" 42 ")] {
            let task: Task = serde_json::from_value(json!({ "id": raw, "title": "t" })).unwrap();
            assert_eq!(task.id, Some(42), "id {raw}");
        }
    }

    #[test]
    fn zero_empty_null_and_missing_id_mean_unsaved() {
        for raw in [json!(0), json!("0"), json!(""), json!(null)] {
            let task: Task = serde_json::from_value(json!({ "id": raw, "title": "t" })).unwrap();
            assert_eq!(task.id, None, "id {raw}");
        }
        let task: Task = serde_json::from_value(json!({ "title": "t" })).unwrap();
        assert_eq!(task.id, None);
    }

    #[test]
    fn non_numeric_id_is_rejected() {
        let result = serde_json::from_value::<Task>(json!({ "id": "abc", "title": "t" }));
        assert!(result.is_err());
    }

    #[test]
    fn id_is_written_as_string() {
        let mut task = Task::new("gym").with_date("20240310");
        assert_eq!(serde_json::to_value(&task).unwrap()["id"], json!(""));

        task.id = Some(7);
        assert_eq!(
            serde_json::to_value(&task).unwrap(),
            json!({
                "id": "7",
                "date": "20240310",
                "title": "gym",
                "comment": "",
                "repeat": "",
            })
        );
    }
}
