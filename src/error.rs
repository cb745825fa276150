use reqwest::StatusCode;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("session expired, sign in again")]
    Unauthorized,

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{message} ({status})")]
    Backend { status: StatusCode, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("session storage: {0}")]
    Session(#[from] std::io::Error),

    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("You must be logged in to create/update tasks")]
    NotSignedIn,
}

impl AppError {
    pub fn backend(status: StatusCode, msg: impl Into<String>) -> Self {
        AppError::Backend {
            status,
            message: msg.into(),
        }
    }

    /// Text shown to the operator in an error notification.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Transport(e) if e.is_connect() => {
                "Cannot reach the BrokeCoin backend".to_string()
            }
            AppError::Transport(e) if e.is_timeout() => "The backend timed out".to_string(),
            AppError::Backend { message, .. } => message.clone(),
            AppError::Validation(errors) => first_validation_message(errors)
                .unwrap_or_else(|| "Please check the form fields".to_string()),
            other => other.to_string(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AppError::Unauthorized)
    }
}

fn first_validation_message(errors: &ValidationErrors) -> Option<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields.into_iter().find_map(|(field, errs)| {
        errs.first().map(|e| match &e.message {
            Some(msg) => msg.to_string(),
            None => format!("{field} is invalid"),
        })
    })
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} is not valid: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("no home directory to keep the session in, set BROKECOIN_SESSION_FILE")]
    NoConfigDir,
}
