pub mod admin;
pub mod currency;
pub mod page;
pub mod stats;
pub mod task;
pub mod transaction;
pub mod user;

use thiserror::Error;

pub use admin::{Admin, AdminRef};
pub use currency::Currency;
pub use page::Page;
pub use stats::SystemStats;
pub use task::{Task, TaskStatus, TaskType};
pub use transaction::{Transaction, TransactionStatus, TransactionType};
pub use user::{User, UserRole, UserStatus};

/// Raised when a command-line or form value is not one of an enum's wire names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{value}` is not a valid {kind} (expected one of: {expected})")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, value: &str, expected: &'static str) -> Self {
        ParseEnumError {
            kind,
            value: value.to_string(),
            expected,
        }
    }
}
