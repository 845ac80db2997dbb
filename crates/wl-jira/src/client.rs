//! Async Jira REST client.

use std::fmt;

use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::JiraError;
use crate::config::JiraConfig;
use crate::models::{Issue, SearchPage, Worklog, WorklogPage};
use crate::query::WorklogQuery;

const SEARCH_PATH: &str = "rest/api/2/search";

/// Jira API client.
///
/// # Thread Safety
///
/// The client is safe to clone and share across threads. Each clone shares
/// the underlying HTTP connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    config: JiraConfig,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new client for the configured server.
    ///
    /// # Errors
    ///
    /// Returns an error if the server URL is not an absolute http(s) URL, if
    /// the username is blank, or if the HTTP client fails to build.
    pub fn new(config: JiraConfig) -> Result<Self, JiraError> {
        let url = reqwest::Url::parse(&config.server).map_err(|err| JiraError::InvalidConfig {
            reason: format!("server {:?} is not a valid URL: {err}", config.server),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(JiraError::InvalidConfig {
                reason: format!("server {:?} must use http or https", config.server),
            });
        }
        if config.username.trim().is_empty() {
            return Err(JiraError::InvalidConfig {
                reason: "username cannot be empty".to_string(),
            });
        }
        if config.page_size == 0 {
            return Err(JiraError::InvalidConfig {
                reason: "page size must be positive".to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(JiraError::ClientBuild)?;

        Ok(Self { http, config })
    }

    pub const fn config(&self) -> &JiraConfig {
        &self.config
    }

    /// Finds all issues matching the worklog query, following pagination.
    pub async fn search_issues(&self, query: &WorklogQuery) -> Result<Vec<Issue>, JiraError> {
        let jql = query.to_jql();
        tracing::debug!(%jql, "searching issues");

        let mut issues = Vec::new();
        loop {
            let start_at = issues.len();
            let page: SearchPage = self
                .get_json(
                    SEARCH_PATH,
                    &[
                        ("jql", jql.clone()),
                        ("fields", "summary".to_string()),
                        ("startAt", start_at.to_string()),
                        ("maxResults", self.config.page_size.to_string()),
                    ],
                )
                .await?;

            let fetched = page.issues.len();
            tracing::debug!(start_at = page.start_at, fetched, total = page.total, "issue page");
            issues.extend(page.issues);
            if fetched == 0 || issues.len() as u64 >= page.total {
                break;
            }
        }

        Ok(issues)
    }

    /// Fetches every worklog of an issue, following pagination.
    pub async fn worklogs(&self, issue_key: &str) -> Result<Vec<Worklog>, JiraError> {
        let path = format!("rest/api/2/issue/{issue_key}/worklog");

        let mut worklogs = Vec::new();
        loop {
            let start_at = worklogs.len();
            let page: WorklogPage = self
                .get_json(
                    &path,
                    &[
                        ("startAt", start_at.to_string()),
                        ("maxResults", self.config.page_size.to_string()),
                    ],
                )
                .await?;

            let fetched = page.worklogs.len();
            tracing::debug!(
                issue_key,
                start_at = page.start_at,
                fetched,
                total = page.total,
                "worklog page"
            );
            worklogs.extend(page.worklogs);
            if fetched == 0 || worklogs.len() as u64 >= page.total {
                break;
            }
        }

        Ok(worklogs)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, JiraError> {
        let response = self
            .http
            .get(self.config.url_for(path))
            .basic_auth(&self.config.username, Some(&self.config.password))
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(parse_api_error(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|err| JiraError::InvalidResponse(err.to_string()))
    }
}

/// Builds an API error, preferring Jira's own `errorMessages`.
fn parse_api_error(status: u16, body: &str) -> JiraError {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct ErrorPayload {
        #[serde(default)]
        error_messages: Vec<String>,
    }

    let message = serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| payload.error_messages.join("; "))
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| body.trim().to_string());

    JiraError::Api { status, message }
}
