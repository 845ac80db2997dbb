//! Shared utilities for CLI commands.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Args;
use wl_core::WorklogRecord;
use wl_jira::{DateBound, WorklogAuthor, WorklogExtractor, WorklogFilter, WorklogQuery};

use crate::Config;

/// Where worklog records come from.
#[derive(Debug, Clone, Default, Args)]
pub struct SourceArgs {
    /// Read worklog records from a JSON file instead of querying Jira.
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Report worklogs of this Jira user instead of the logged-in one.
    #[arg(long)]
    pub user: Option<String>,
}

impl SourceArgs {
    fn author(&self, config: &Config) -> WorklogAuthor {
        self.user
            .as_ref()
            .or(config.for_user.as_ref())
            .map_or(WorklogAuthor::CurrentUser, |user| {
                WorklogAuthor::User(user.clone())
            })
    }
}

/// Today's date in the local time zone.
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Name of the local time zone, for report headers.
pub fn local_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Reads a JSON array of worklog records.
pub fn load_records(path: &Path) -> Result<Vec<WorklogRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let records: Vec<WorklogRecord> = serde_json::from_str(&content)
        .with_context(|| format!("invalid worklog records in {}", path.display()))?;
    tracing::debug!(path = %path.display(), records = records.len(), "loaded worklog records");
    Ok(records)
}

/// Collects records for the local days `from..=to`.
///
/// `start` and `end` are the JQL bounds sent to Jira; they are validated even
/// when records come from `--input`.
pub fn collect_records(
    source: &SourceArgs,
    config: &Config,
    (start, end): (DateBound, DateBound),
    (from, to): (NaiveDate, NaiveDate),
) -> Result<Vec<WorklogRecord>> {
    let query = WorklogQuery::new(source.author(config), start, end)?;

    if let Some(path) = &source.input {
        return load_records(path);
    }

    let jira = config.jira_config()?;
    let author = query.author().resolve(&jira.username).to_string();
    let filter = WorklogFilter::for_dates(&Local, from, to).with_author(author);
    tracing::debug!(?filter, jql = %query.to_jql(), "fetching worklogs");

    let extractor = WorklogExtractor::new(jira).context("failed to create Jira client")?;
    let runtime = tokio::runtime::Runtime::new().context("failed to initialize tokio runtime")?;
    runtime
        .block_on(extractor.extract(&query, &filter, &Local))
        .context("failed to fetch worklogs from Jira")
}
