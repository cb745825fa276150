use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AdminRef, Currency, ParseEnumError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    #[default]
    Social,
    Daily,
    Other,
}

impl TaskType {
    pub const ALL: [TaskType; 3] = [TaskType::Social, TaskType::Daily, TaskType::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Social => "social",
            TaskType::Daily => "daily",
            TaskType::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskType::Social => "Social",
            TaskType::Daily => "Daily",
            TaskType::Other => "Other",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError::new("task type", s, "social, daily, other"))
    }
}

/// Task lifecycle. The last three values come from the board-style vocabulary
/// some screens use; both vocabularies are accepted everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
    Backlog,
    Todo,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 7] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
        TaskStatus::Cancelled,
        TaskStatus::Backlog,
        TaskStatus::Todo,
        TaskStatus::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Backlog => "backlog",
            TaskStatus::Todo => "todo",
            TaskStatus::Done => "done",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::Cancelled => "Cancelled",
            TaskStatus::Backlog => "Backlog",
            TaskStatus::Todo => "To Do",
            TaskStatus::Done => "Done",
        }
    }

    pub fn is_board_status(&self) -> bool {
        matches!(self, TaskStatus::Backlog | TaskStatus::Todo | TaskStatus::Done)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskStatus::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                ParseEnumError::new(
                    "task status",
                    s,
                    "pending, in_progress, completed, cancelled, backlog, todo, done",
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub task_type: TaskType,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub reward_amount: f64,
    #[serde(default)]
    pub reward_type: Currency,
    pub task_link: Option<String>,
    pub created_by: Option<AdminRef>,
    pub created_by_admin: Option<AdminRef>,
    pub completed_at: Option<DateTime<Utc>>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn creator(&self) -> Option<&AdminRef> {
        self.created_by.as_ref().or(self.created_by_admin.as_ref())
    }
}

/// Body of `POST /admin/tasks` and `PUT /admin/tasks/:id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPayload {
    pub title: String,
    pub description: Option<String>,
    pub task_type: TaskType,
    pub status: TaskStatus,
    pub reward_amount: f64,
    pub reward_type: Currency,
    pub task_link: Option<String>,
    pub created_by: AdminRef,
    pub metadata: Option<serde_json::Value>,
}

/// Body of `POST /admin/tasks/:id/attachments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentPayload {
    pub file_name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_statuses_are_accepted_and_flagged() {
        let status: TaskStatus = serde_json::from_str("\"todo\"").unwrap();
        assert_eq!(status.label(), "To Do");
        assert!(status.is_board_status());
        assert!(!TaskStatus::InProgress.is_board_status());
        assert_eq!("in_progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
    }

    #[test]
    fn creator_falls_back_to_created_by_admin() {
        let task: Task = serde_json::from_value(serde_json::json!({
            "id": "5a0c8f1e-8d4b-4f7e-9d2a-1b2c3d4e5f60",
            "title": "Follow on X",
            "task_type": "social",
            "status": "pending",
            "reward_amount": 50,
            "reward_type": "chips",
            "created_by_admin": {
                "id": "0f9e8d7c-6b5a-4f3e-8d2c-1b0a9f8e7d6c",
                "username": "root",
                "email": "root@brokecoin.io"
            },
            "created_at": "2024-05-01T10:00:00Z",
            "updated_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(task.creator().map(|c| c.username.as_str()), Some("root"));
        assert_eq!(task.description, None);
    }
}
