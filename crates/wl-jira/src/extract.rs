//! Turns Jira issues and worklogs into [`WorklogRecord`]s.
//!
//! The extractor owns timezone normalization and window filtering: every
//! record it returns was started inside the requested window, and its
//! `day_of_month` is expressed in the caller's time zone.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use wl_core::{WorklogRecord, local_midnight_to_utc};

use crate::JiraError;
use crate::client::Client;
use crate::config::JiraConfig;
use crate::models::{Issue, Worklog};
use crate::query::WorklogQuery;

/// Which worklogs to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorklogFilter {
    /// Inclusive lower bound.
    pub start: DateTime<Utc>,
    /// Exclusive upper bound.
    pub end: DateTime<Utc>,
    /// Keep only worklogs by this user, if set.
    pub author: Option<String>,
}

impl WorklogFilter {
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            author: None,
        }
    }

    /// Window covering the local calendar days `from..=to` in `tz`.
    pub fn for_dates<Tz: TimeZone>(tz: &Tz, from: NaiveDate, to: NaiveDate) -> Self {
        let after = to.succ_opt().unwrap_or(NaiveDate::MAX);
        Self::new(
            local_midnight_to_utc(tz, from),
            local_midnight_to_utc(tz, after),
        )
    }

    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    fn accepts(&self, worklog: &Worklog, started: DateTime<Utc>) -> bool {
        if started < self.start || started >= self.end {
            return false;
        }
        self.author.as_deref().is_none_or(|user| {
            worklog
                .author
                .as_ref()
                .is_some_and(|author| author.matches(user))
        })
    }
}

/// Converts the worklogs of one issue into records, dropping any outside
/// the filter.
pub fn normalize_worklogs<Tz: TimeZone>(
    issue: &Issue,
    worklogs: &[Worklog],
    filter: &WorklogFilter,
    tz: &Tz,
) -> Result<Vec<WorklogRecord>, JiraError> {
    let mut records = Vec::new();
    for worklog in worklogs {
        let started = worklog.started_at()?;
        if !filter.accepts(worklog, started) {
            continue;
        }
        records.push(WorklogRecord {
            issue_key: issue.key.clone(),
            summary: issue.fields.summary.clone(),
            day_of_month: started.with_timezone(tz).day(),
            seconds_spent: worklog.seconds()?,
        });
    }

    let dropped = worklogs.len() - records.len();
    if dropped > 0 {
        tracing::debug!(issue_key = %issue.key, dropped, "skipped worklogs outside filter");
    }
    Ok(records)
}

/// Fetches worklogs from Jira and normalizes them.
#[derive(Debug, Clone)]
pub struct WorklogExtractor {
    client: Client,
}

impl WorklogExtractor {
    pub fn new(config: JiraConfig) -> Result<Self, JiraError> {
        Ok(Self::from_client(Client::new(config)?))
    }

    pub const fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Runs the query and returns one record per kept worklog.
    ///
    /// Issues are visited in the order Jira returns them; the output order
    /// carries no meaning.
    pub async fn extract<Tz: TimeZone>(
        &self,
        query: &WorklogQuery,
        filter: &WorklogFilter,
        tz: &Tz,
    ) -> Result<Vec<WorklogRecord>, JiraError> {
        let issues = self.client.search_issues(query).await?;
        tracing::info!(issues = issues.len(), "found issues with worklogs");

        let mut records = Vec::new();
        for issue in &issues {
            let worklogs = self.client.worklogs(&issue.key).await?;
            records.extend(normalize_worklogs(issue, &worklogs, filter, tz)?);
        }

        tracing::info!(records = records.len(), "extracted worklogs");
        Ok(records)
    }
}
