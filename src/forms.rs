use validator::{Validate, ValidationError};

use crate::models::admin::{AdminRegistration, ProfileUpdate};
use crate::models::task::{AttachmentPayload, TaskPayload};
use crate::models::user::{BalanceAdjustment, UserPayload};
use crate::models::{
    AdminRef, Currency, Task, TaskStatus, TaskType, TransactionStatus, User, UserRole,
};

fn validate_finite(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("finite"))
    }
}

/// Trimmed, with blank meaning absent.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, message = "Please enter your username"))]
    pub username: String,
    #[validate(length(min = 1, message = "Please enter your password"))]
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct UserForm {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(length(min = 1, message = "Wallet address is required"))]
    pub wallet_address: String,
    pub role: UserRole,
    #[validate(
        range(min = 0.0, message = "Chips balance cannot be negative"),
        custom(function = "validate_finite", message = "Chips balance must be a number")
    )]
    pub chips_balance: f64,
    #[validate(
        range(min = 0.0, message = "Brokecoin balance cannot be negative"),
        custom(function = "validate_finite", message = "Brokecoin balance must be a number")
    )]
    pub brokecoin_balance: f64,
}

impl Default for UserForm {
    fn default() -> Self {
        UserForm {
            username: String::new(),
            wallet_address: String::new(),
            role: UserRole::User,
            chips_balance: 0.0,
            brokecoin_balance: 0.0,
        }
    }
}

impl From<&User> for UserForm {
    fn from(user: &User) -> Self {
        UserForm {
            username: user.username.clone(),
            wallet_address: user.wallet_address.clone().unwrap_or_default(),
            role: user.role(),
            chips_balance: user.chips_balance,
            brokecoin_balance: user.brokecoin_balance,
        }
    }
}

impl UserForm {
    /// Trim text fields so the length rules see what will be sent.
    pub fn normalized(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self.wallet_address = self.wallet_address.trim().to_string();
        self
    }
}

impl From<UserForm> for UserPayload {
    fn from(form: UserForm) -> Self {
        let form = form.normalized();
        UserPayload {
            username: form.username,
            wallet_address: form.wallet_address,
            role: form.role,
            chips_balance: form.chips_balance,
            brokecoin_balance: form.brokecoin_balance,
        }
    }
}

fn validate_some_delta(form: &BalanceForm) -> Result<(), ValidationError> {
    if form.brokecoin_delta == 0.0 && form.chips_delta == 0.0 {
        return Err(ValidationError::new("no_change")
            .with_message("Enter a non-zero amount for at least one balance".into()));
    }
    Ok(())
}

/// Signed balance deltas; negative values debit.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
#[validate(schema(function = "validate_some_delta"))]
pub struct BalanceForm {
    #[validate(custom(function = "validate_finite", message = "Brokecoin delta must be a number"))]
    pub brokecoin_delta: f64,
    #[validate(custom(function = "validate_finite", message = "Chips delta must be a number"))]
    pub chips_delta: f64,
}

impl From<BalanceForm> for BalanceAdjustment {
    fn from(form: BalanceForm) -> Self {
        BalanceAdjustment {
            brokecoin_delta: form.brokecoin_delta,
            chips_delta: form.chips_delta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct TaskForm {
    #[validate(length(min = 1, message = "Title is required."))]
    pub title: String,
    pub description: Option<String>,
    pub task_type: TaskType,
    pub status: TaskStatus,
    #[validate(
        range(min = 0.0, message = "Reward amount must be positive"),
        custom(function = "validate_finite", message = "Reward amount must be a number")
    )]
    pub reward_amount: f64,
    pub reward_type: Currency,
    #[validate(url(message = "Must be a valid URL"))]
    pub task_link: Option<String>,
}

impl Default for TaskForm {
    fn default() -> Self {
        TaskForm {
            title: String::new(),
            description: None,
            task_type: TaskType::Social,
            status: TaskStatus::Pending,
            reward_amount: 0.0,
            reward_type: Currency::Chips,
            task_link: None,
        }
    }
}

impl From<&Task> for TaskForm {
    fn from(task: &Task) -> Self {
        TaskForm {
            title: task.title.clone(),
            description: task.description.clone(),
            task_type: task.task_type,
            status: task.status,
            reward_amount: task.reward_amount,
            reward_type: task.reward_type,
            task_link: task.task_link.clone(),
        }
    }
}

impl TaskForm {
    /// Blank optional fields become absent so an empty link is not checked as a URL.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = non_blank(self.description);
        self.task_link = non_blank(self.task_link);
        self
    }

    pub fn into_payload(self, created_by: AdminRef) -> TaskPayload {
        TaskPayload {
            title: self.title,
            description: self.description,
            task_type: self.task_type,
            status: self.status,
            reward_amount: self.reward_amount,
            reward_type: self.reward_type,
            task_link: self.task_link,
            created_by,
            metadata: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct TaskStatusForm {
    pub status: TaskStatus,
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct TransactionStatusForm {
    #[validate(custom(function = "validate_known_status", message = "Unknown transaction status"))]
    pub status: TransactionStatus,
}

impl Default for TransactionStatusForm {
    fn default() -> Self {
        TransactionStatusForm {
            status: TransactionStatus::Pending,
        }
    }
}

fn validate_known_status(status: &TransactionStatus) -> Result<(), ValidationError> {
    match status {
        TransactionStatus::Other(_) => Err(ValidationError::new("unknown_status")),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct CommentForm {
    #[validate(length(min = 1, message = "Comment cannot be empty"))]
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct AttachmentForm {
    #[validate(length(min = 1, message = "File name is required"))]
    pub file_name: String,
    #[validate(url(message = "Must be a valid URL"))]
    pub url: String,
    pub content_type: Option<String>,
}

impl From<AttachmentForm> for AttachmentPayload {
    fn from(form: AttachmentForm) -> Self {
        AttachmentPayload {
            file_name: form.file_name,
            url: form.url,
            content_type: non_blank(form.content_type),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct ProfileForm {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(length(max = 500, message = "Bio must be less than 500 characters"))]
    pub bio: Option<String>,
}

impl From<ProfileForm> for ProfileUpdate {
    fn from(form: ProfileForm) -> Self {
        ProfileUpdate {
            username: form.username,
            email: form.email,
            bio: non_blank(form.bio),
        }
    }
}

/// New operator account, or the first super admin during setup.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct AdminForm {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    pub username: String,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    pub role: Option<UserRole>,
}

impl From<AdminForm> for AdminRegistration {
    fn from(form: AdminForm) -> Self {
        AdminRegistration {
            username: form.username,
            email: form.email,
            password: form.password,
            role: form.role,
        }
    }
}
