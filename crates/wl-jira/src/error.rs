//! Errors raised while talking to Jira.

use thiserror::Error;

/// Jira extraction errors.
#[derive(Debug, Error)]
pub enum JiraError {
    /// The connection settings are unusable.
    #[error("invalid Jira configuration: {reason}")]
    InvalidConfig { reason: String },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Jira answered with a non-success status.
    #[error("Jira API error (status {status}): {message}")]
    Api { status: u16, message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    /// A worklog duration could not be read.
    #[error("invalid time spent: {value:?}")]
    InvalidDuration { value: String },
    /// A worklog start timestamp could not be read.
    #[error("invalid worklog start time: {value:?}")]
    InvalidTimestamp { value: String },
    /// The worklog query is inconsistent.
    #[error("invalid worklog query: {0}")]
    InvalidQuery(String),
}
