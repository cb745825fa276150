//! Headless admin console for the BrokeCoin backend.
//!
//! The pieces mirror the console's pages: an [`api::ApiClient`] over the
//! `/admin` REST surface, a persisted [`session::SessionStore`], paginated
//! [`query::ResourceQuery`] lists feeding [`table::DataTable`]s, validated
//! [`dialog`] mutations and the [`shell`] route guard.

pub mod api;
pub mod config;
pub mod dialog;
pub mod error;
pub mod features;
pub mod format;
pub mod forms;
pub mod models;
pub mod notify;
pub mod query;
pub mod session;
pub mod shell;
pub mod table;

pub use error::AppError;
