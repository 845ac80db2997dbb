//! Jira worklog extraction for the worklog calendar.
//!
//! Provides:
//! - A JQL builder for "issues with worklogs by a user in a date range"
//! - An async REST client with basic auth and pagination
//! - Normalization of Jira worklogs into [`wl_core::WorklogRecord`]s

mod client;
mod config;
pub mod duration;
mod error;
mod extract;
pub mod models;
pub mod query;

pub use client::Client;
pub use config::{DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT, JiraConfig};
pub use error::JiraError;
pub use extract::{WorklogExtractor, WorklogFilter, normalize_worklogs};
pub use query::{DateBound, WorklogAuthor, WorklogQuery};
