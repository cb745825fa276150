use uuid::Uuid;

use crate::api::tasks::{TaskFilters, TaskList, TASKS};
use crate::api::{Ack, ApiClient, Filters};
use crate::dialog::{ConfirmDialog, ConfirmOutcome, FormDialog, MutationContext, SubmitOutcome};
use crate::error::AppError;
use crate::format;
use crate::forms::{AttachmentForm, CommentForm, TaskForm, TaskStatusForm};
use crate::models::task::AttachmentPayload;
use crate::models::{AdminRef, Task};
use crate::query::ResourceQuery;
use crate::table::{Column, SortValue};

use super::ListView;

const TOUCHES: &[&str] = &[TASKS];

pub fn columns() -> Vec<Column<Task>> {
    vec![
        Column::new("title", "Title", |t: &Task| t.title.clone())
            .sortable(|t| SortValue::Text(t.title.clone()))
            .always_visible(),
        Column::new("task_type", "Type", |t: &Task| t.task_type.label().to_string())
            .filterable(|t| t.task_type.as_str().to_string()),
        Column::new("status", "Status", |t: &Task| t.status.label().to_string())
            .filterable(|t| t.status.as_str().to_string()),
        Column::new("reward", "Reward", |t: &Task| {
            t.reward_type.format_amount(t.reward_amount)
        })
        .sortable(|t| SortValue::Number(t.reward_amount)),
        Column::new("task_link", "Link", |t: &Task| {
            t.task_link
                .clone()
                .unwrap_or_else(|| format::DASH.to_string())
        }),
        Column::new("created_by", "Created by", |t: &Task| {
            t.creator()
                .map_or_else(|| format::DASH.to_string(), |a| a.username.clone())
        }),
        Column::new("created_at", "Created", |t: &Task| format::ago(&t.created_at))
            .sortable(|t| SortValue::Time(t.created_at.timestamp())),
    ]
}

pub struct TasksPage {
    api: ApiClient,
    ctx: MutationContext,
    pub list: ListView<TaskList>,
    /// Create/update drawer.
    pub drawer: FormDialog<TaskForm>,
    editing: Option<Uuid>,
    pub delete: ConfirmDialog<Task>,
    pub status: FormDialog<TaskStatusForm>,
    pub comment: FormDialog<CommentForm>,
    pub attachment: FormDialog<AttachmentForm>,
}

impl TasksPage {
    pub fn new(api: ApiClient, ctx: MutationContext, page_size: u32) -> Self {
        let query = ResourceQuery::new(TaskList(api.clone()), ctx.queries.clone())
            .with_page_size(page_size);
        TasksPage {
            api,
            ctx,
            list: ListView::new(query, columns()),
            drawer: FormDialog::new(TOUCHES),
            editing: None,
            delete: ConfirmDialog::new(TOUCHES),
            status: FormDialog::new(TOUCHES),
            comment: FormDialog::new(TOUCHES),
            attachment: FormDialog::new(TOUCHES),
        }
    }

    pub async fn load(&mut self) -> Result<(), AppError> {
        self.list.refresh().await
    }

    pub async fn filter(&mut self, filters: &TaskFilters) -> Result<(), AppError> {
        self.list.set_filters(Filters::from(filters)).await
    }

    pub fn open_create(&mut self) {
        self.editing = None;
        self.drawer.open();
    }

    pub fn open_update(&mut self, task: &Task) {
        self.editing = Some(task.id);
        self.drawer.open_with(TaskForm::from(task));
    }

    /// The signed-in admin is stamped as the task's creator.
    pub async fn save(&mut self) -> SubmitOutcome<Ack> {
        let normalized = self.drawer.values().clone().normalized();
        *self.drawer.values_mut() = normalized;

        let api = self.api.clone();
        let editing = self.editing;
        let success = match editing {
            Some(_) => "Task updated successfully.",
            None => "Task created successfully.",
        };
        let outcome = self
            .drawer
            .submit(&self.ctx, success, |form| async move {
                let admin = api.session().admin().ok_or(AppError::NotSignedIn)?;
                let payload = form.into_payload(AdminRef::from(&admin));
                match editing {
                    Some(id) => api.update_task(id, &payload).await,
                    None => api.create_task(&payload).await,
                }
            })
            .await;
        if outcome.is_saved() {
            self.editing = None;
        }
        outcome
    }

    pub fn request_delete(&mut self, task: Task) {
        self.delete.request(task);
    }

    pub async fn confirm_delete(&mut self) -> ConfirmOutcome<Ack> {
        let api = self.api.clone();
        self.delete
            .confirm(&self.ctx, "Task deleted successfully.", |task| async move {
                api.delete_task(task.id).await
            })
            .await
    }

    pub fn open_status(&mut self, task: &Task) {
        self.status.open_with(TaskStatusForm {
            status: task.status,
        });
    }

    pub async fn save_status(&mut self, id: Uuid) -> SubmitOutcome<Ack> {
        let api = self.api.clone();
        self.status
            .submit(&self.ctx, "Task status updated.", |form| async move {
                api.update_task_status(id, form.status).await
            })
            .await
    }

    pub async fn add_comment(&mut self, id: Uuid) -> SubmitOutcome<Ack> {
        let trimmed = self.comment.values().comment.trim().to_string();
        self.comment.values_mut().comment = trimmed;

        let api = self.api.clone();
        self.comment
            .submit(&self.ctx, "Comment added.", |form| async move {
                api.add_task_comment(id, &form.comment).await
            })
            .await
    }

    pub async fn add_attachment(&mut self, id: Uuid) -> SubmitOutcome<Ack> {
        let api = self.api.clone();
        self.attachment
            .submit(&self.ctx, "Attachment added.", |form| async move {
                api.add_task_attachment(id, &AttachmentPayload::from(form))
                    .await
            })
            .await
    }
}
