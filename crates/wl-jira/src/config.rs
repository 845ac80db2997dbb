//! Connection settings for a Jira server.

use std::fmt;
use std::time::Duration;

/// Default request timeout for API calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Explicit Jira connection settings.
///
/// Passed to [`crate::Client::new`]; nothing is read from process-wide state.
#[derive(Clone)]
pub struct JiraConfig {
    /// Base URL, e.g. `https://example.atlassian.net`.
    pub server: String,
    pub username: String,
    /// Password or API token used for basic auth.
    pub password: String,
    pub timeout: Duration,
    pub page_size: u32,
}

impl fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraConfig")
            .field("server", &self.server)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl JiraConfig {
    pub fn new(
        server: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            username: username.into(),
            password: password.into(),
            timeout: DEFAULT_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Absolute URL for a REST path relative to the server root.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.server.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
