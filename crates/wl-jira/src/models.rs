//! Jira REST payloads (API v2).

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::JiraError;
use crate::duration::parse_time_spent;

/// Jira's timestamp layout, e.g. `2025-01-15T10:30:00.000+0000`.
const JIRA_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// One page of `GET /rest/api/2/search`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub start_at: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssueFields {
    #[serde(default)]
    pub summary: String,
}

/// One page of `GET /rest/api/2/issue/{key}/worklog`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorklogPage {
    #[serde(default)]
    pub start_at: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub worklogs: Vec<Worklog>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worklog {
    #[serde(default)]
    pub author: Option<Author>,
    pub started: String,
    #[serde(default)]
    pub time_spent: Option<String>,
    #[serde(default)]
    pub time_spent_seconds: Option<i64>,
}

/// Worklog author; Server exposes `name`, Cloud exposes `accountId`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
}

impl Author {
    /// Whether any of the author's identifiers equals `user`.
    pub fn matches(&self, user: &str) -> bool {
        [&self.name, &self.account_id, &self.email_address]
            .into_iter()
            .flatten()
            .any(|id| id == user)
    }
}

impl Worklog {
    /// When the work was started, in UTC.
    pub fn started_at(&self) -> Result<DateTime<Utc>, JiraError> {
        DateTime::parse_from_str(&self.started, JIRA_TIMESTAMP_FORMAT)
            .or_else(|_| DateTime::parse_from_rfc3339(&self.started))
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| JiraError::InvalidTimestamp {
                value: self.started.clone(),
            })
    }

    /// Logged duration in seconds.
    ///
    /// Prefers `timeSpentSeconds` and falls back to parsing `timeSpent`.
    pub fn seconds(&self) -> Result<i64, JiraError> {
        if let Some(seconds) = self.time_spent_seconds {
            return Ok(seconds);
        }
        match self.time_spent.as_deref() {
            Some(text) => parse_time_spent(text),
            None => Err(JiraError::InvalidDuration {
                value: String::new(),
            }),
        }
    }
}
