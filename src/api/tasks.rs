use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use super::{Ack, ApiClient, Filters};
use crate::error::AppError;
use crate::models::task::{AttachmentPayload, TaskPayload};
use crate::models::{Page, Task, TaskStatus, TaskType};
use crate::query::{PageSource, QueryKey};

pub const TASKS: &str = "tasks";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilters {
    pub status: Option<TaskStatus>,
    pub task_type: Option<TaskType>,
}

impl From<&TaskFilters> for Filters {
    fn from(f: &TaskFilters) -> Self {
        let mut filters = Filters::new();
        filters.set("status", f.status);
        filters.set("task_type", f.task_type);
        filters
    }
}

#[derive(Serialize)]
struct StatusChange {
    status: TaskStatus,
}

#[derive(Serialize)]
struct Comment<'a> {
    comment: &'a str,
}

impl ApiClient {
    pub async fn list_tasks(
        &self,
        filters: &Filters,
        page: u32,
        limit: u32,
    ) -> Result<Page<Task>, AppError> {
        self.get("/tasks", &filters.to_query(page, limit)).await
    }

    pub async fn get_task(&self, id: Uuid) -> Result<Task, AppError> {
        self.get(&format!("/tasks/{id}"), &[]).await
    }

    pub async fn create_task(&self, task: &TaskPayload) -> Result<Ack, AppError> {
        self.post("/tasks", task).await
    }

    pub async fn update_task(&self, id: Uuid, task: &TaskPayload) -> Result<Ack, AppError> {
        self.put(&format!("/tasks/{id}"), task).await
    }

    pub async fn update_task_status(&self, id: Uuid, status: TaskStatus) -> Result<Ack, AppError> {
        self.patch(&format!("/tasks/{id}/status"), &StatusChange { status })
            .await
    }

    pub async fn delete_task(&self, id: Uuid) -> Result<Ack, AppError> {
        self.delete(&format!("/tasks/{id}")).await
    }

    pub async fn add_task_comment(&self, id: Uuid, comment: &str) -> Result<Ack, AppError> {
        self.post(&format!("/tasks/{id}/comments"), &Comment { comment })
            .await
    }

    pub async fn add_task_attachment(
        &self,
        id: Uuid,
        attachment: &AttachmentPayload,
    ) -> Result<Ack, AppError> {
        self.post(&format!("/tasks/{id}/attachments"), attachment)
            .await
    }
}

pub struct TaskList(pub ApiClient);

#[async_trait]
impl PageSource for TaskList {
    type Item = Task;

    fn resource(&self) -> &'static str {
        TASKS
    }

    async fn fetch_page(&self, key: &QueryKey) -> Result<Page<Task>, AppError> {
        self.0.list_tasks(&key.filters, key.page, key.page_size).await
    }
}
