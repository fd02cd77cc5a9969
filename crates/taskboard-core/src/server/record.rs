//! Wire representation of a task
//!
//! Timestamps travel as ISO-8601 strings with millisecond precision.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, Task, TaskId, TaskStatus};

/// Task as stored by the mock backend and sent over the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub created_at: String,
    pub updated_at: String,
}

pub fn to_wire_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_wire_timestamp(raw: &str) -> Result<DateTime<Utc>, DomainError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| DomainError::backend(format!("invalid timestamp '{}': {}", raw, e)))
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            created_at: to_wire_timestamp(task.created_at),
            updated_at: to_wire_timestamp(task.updated_at),
        }
    }
}

impl TryFrom<TaskRecord> for Task {
    type Error = DomainError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        Ok(Task {
            created_at: parse_wire_timestamp(&record.created_at)?,
            updated_at: parse_wire_timestamp(&record.updated_at)?,
            id: TaskId::new(record.id),
            title: record.title,
            description: record.description,
            status: record.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_wire_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(to_wire_timestamp(at), "2024-01-02T03:04:05.000Z");
        assert_eq!(parse_wire_timestamp("2024-01-02T03:04:05.000Z").unwrap(), at);
    }

    #[test]
    fn test_record_to_task() {
        let record: TaskRecord = serde_json::from_value(serde_json::json!({
            "id": "7",
            "title": "Read",
            "status": "completed",
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-01T10:00:00.000Z"
        }))
        .unwrap();
        let task = Task::try_from(record).unwrap();
        assert_eq!(task.id.as_str(), "7");
        assert!(task.is_completed());
        assert!(task.description.is_none());
        assert!(task.updated_at > task.created_at);
    }

    #[test]
    fn test_bad_timestamp_is_backend_error() {
        let record = TaskRecord {
            id: "1".into(),
            title: "x".into(),
            description: None,
            status: TaskStatus::Pending,
            created_at: "yesterday".into(),
            updated_at: "today".into(),
        };
        assert!(matches!(Task::try_from(record), Err(DomainError::Backend(_))));
    }
}
