//! JQL for "issues with worklogs by a user in a date range".

use std::fmt;

use chrono::NaiveDate;

use crate::JiraError;

/// Whose worklogs to look for.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorklogAuthor {
    /// The authenticated user (`currentUser()`).
    #[default]
    CurrentUser,
    /// A named Jira user.
    User(String),
}

impl WorklogAuthor {
    /// The concrete user name, resolving `currentUser()` to `login`.
    pub fn resolve<'a>(&'a self, login: &'a str) -> &'a str {
        match self {
            Self::CurrentUser => login,
            Self::User(name) => name,
        }
    }
}

/// One end of the `worklogDate` range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    /// `startOfMonth()`
    StartOfMonth,
    /// `now()`
    Now,
    /// A fixed calendar date.
    Date(NaiveDate),
}

impl fmt::Display for DateBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartOfMonth => write!(f, "startOfMonth()"),
            Self::Now => write!(f, "now()"),
            Self::Date(date) => write!(f, "\"{}\"", date.format("%Y-%m-%d")),
        }
    }
}

/// Search for issues that carry worklogs by `author` between `from` and `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorklogQuery {
    author: WorklogAuthor,
    from: DateBound,
    to: DateBound,
}

impl Default for WorklogQuery {
    fn default() -> Self {
        Self {
            author: WorklogAuthor::CurrentUser,
            from: DateBound::StartOfMonth,
            to: DateBound::Now,
        }
    }
}

impl WorklogQuery {
    /// Creates a query, rejecting empty user names and inverted date ranges.
    pub fn new(author: WorklogAuthor, from: DateBound, to: DateBound) -> Result<Self, JiraError> {
        if let WorklogAuthor::User(name) = &author {
            if name.trim().is_empty() {
                return Err(JiraError::InvalidQuery(
                    "worklog author cannot be empty".to_string(),
                ));
            }
        }
        if let (DateBound::Date(start), DateBound::Date(end)) = (from, to) {
            if start > end {
                return Err(JiraError::InvalidQuery(format!(
                    "start date {start} is after end date {end}"
                )));
            }
        }
        Ok(Self { author, from, to })
    }

    pub const fn author(&self) -> &WorklogAuthor {
        &self.author
    }

    pub const fn start(&self) -> DateBound {
        self.from
    }

    pub const fn end(&self) -> DateBound {
        self.to
    }

    /// Renders the query as JQL, ordered by issue key.
    pub fn to_jql(&self) -> String {
        let author = match &self.author {
            WorklogAuthor::CurrentUser => "currentUser()".to_string(),
            WorklogAuthor::User(name) => quote(name),
        };
        format!(
            "worklogAuthor = {author} AND worklogDate >= {} AND worklogDate <= {} ORDER BY key ASC",
            self.from, self.to
        )
    }
}

/// Quotes a JQL string literal.
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}
