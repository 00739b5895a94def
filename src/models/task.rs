use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

/// Status assigned to every newly created task.
pub const STATUS_PENDING: &str = "pending";

/// Priority used when a create request leaves it out.
pub const DEFAULT_PRIORITY: &str = "medium";

/// A task record as stored in the task file and returned by the API.
///
/// `priority` and `status` are free-form strings; the store never
/// restricts them to a fixed set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned identifier, never reused after deletion.
    pub id: u64,
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub priority: String,
    pub status: String,
    /// Fixed at creation.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every successful update.
    pub updated_at: DateTime<Utc>,
}

/// Field values for a task that does not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub priority: String,
}

/// Replacement values for every mutable field of an existing task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub priority: String,
    pub status: String,
}

impl Task {
    /// Creates a pending task with both timestamps set to the current instant.
    pub fn new(id: u64, new_task: NewTask) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: new_task.title,
            description: new_task.description,
            due_date: new_task.due_date,
            priority: new_task.priority,
            status: STATUS_PENDING.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites all mutable fields and refreshes `updated_at`.
    pub fn apply(&mut self, changes: TaskChanges) {
        self.title = changes.title;
        self.description = changes.description;
        self.due_date = changes.due_date;
        self.priority = changes.priority;
        self.status = changes.status;
        // updated_at never goes behind created_at, even if the clock steps back
        self.updated_at = Utc::now().max(self.created_at);
    }

    pub fn is_pending(&self) -> bool {
        self.status == STATUS_PENDING
    }
}

/// Body of `POST /api/v1/tasks`.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CreateTaskRequest {
    /// Required, must contain a non-whitespace character.
    #[validate(custom = "not_blank")]
    pub title: String,
    pub description: String,
    pub due_date: String,
    /// Falls back to `"medium"` when empty.
    pub priority: String,
}

/// Body of `PUT /api/v1/tasks/{id}`. Every field replaces the stored value.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateTaskRequest {
    #[validate(custom = "not_blank")]
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub priority: String,
    pub status: String,
}

impl From<CreateTaskRequest> for NewTask {
    fn from(request: CreateTaskRequest) -> Self {
        let priority = if request.priority.is_empty() {
            DEFAULT_PRIORITY.to_string()
        } else {
            request.priority
        };
        Self {
            title: request.title,
            description: request.description,
            due_date: request.due_date,
            priority,
        }
    }
}

impl From<UpdateTaskRequest> for TaskChanges {
    fn from(request: UpdateTaskRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            due_date: request.due_date,
            priority: request.priority,
            status: request.status,
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some(Cow::Borrowed("Title is required"));
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NewTask {
        NewTask {
            title: "Test Task".to_string(),
            description: "Test Description".to_string(),
            due_date: "2024-12-31".to_string(),
            priority: "high".to_string(),
        }
    }

    #[test]
    fn test_task_creation() {
        let task = Task::new(7, sample());
        assert_eq!(task.id, 7);
        assert_eq!(task.title, "Test Task");
        assert_eq!(task.status, STATUS_PENDING);
        assert_eq!(task.created_at, task.updated_at);
        assert!(task.is_pending());
    }

    #[test]
    fn test_apply_changes() {
        let mut task = Task::new(1, sample());
        let created_at = task.created_at;

        task.apply(TaskChanges {
            title: "Updated".to_string(),
            description: String::new(),
            due_date: String::new(),
            priority: "whenever".to_string(),
            status: "completed".to_string(),
        });

        assert_eq!(task.title, "Updated");
        assert_eq!(task.priority, "whenever");
        assert_eq!(task.status, "completed");
        assert_eq!(task.created_at, created_at);
        assert!(task.updated_at >= task.created_at);
        assert!(!task.is_pending());
    }

    #[test]
    fn test_task_validation() {
        let valid = CreateTaskRequest {
            title: "Valid Task".to_string(),
            ..Default::default()
        };
        assert!(valid.validate().is_ok());

        let empty = CreateTaskRequest::default();
        assert!(empty.validate().is_err());

        let whitespace = UpdateTaskRequest {
            title: "   \t".to_string(),
            status: "completed".to_string(),
            ..Default::default()
        };
        assert!(whitespace.validate().is_err());
    }

    #[test]
    fn test_priority_defaults_on_create_only() {
        let created: NewTask = CreateTaskRequest {
            title: "No priority".to_string(),
            ..Default::default()
        }
        .into();
        assert_eq!(created.priority, DEFAULT_PRIORITY);

        let changes: TaskChanges = UpdateTaskRequest {
            title: "No priority".to_string(),
            ..Default::default()
        }
        .into();
        assert_eq!(changes.priority, "");
    }

    #[test]
    fn test_missing_fields_deserialize_as_empty() {
        let request: CreateTaskRequest =
            serde_json::from_str(r#"{"title": "Only a title"}"#).unwrap();
        assert_eq!(request.title, "Only a title");
        assert_eq!(request.description, "");
        assert_eq!(request.priority, "");
    }

    #[test]
    fn test_json_field_names() {
        let task = Task::new(3, sample());
        let json = serde_json::to_value(&task).unwrap();
        for field in [
            "id",
            "title",
            "description",
            "due_date",
            "priority",
            "status",
            "created_at",
            "updated_at",
        ] {
            assert!(json.get(field).is_some(), "missing field {}", field);
        }
    }
}
