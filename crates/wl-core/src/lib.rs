//! Core domain logic for the worklog calendar.
//!
//! This crate contains the fundamental types and logic for:
//! - Records: normalized worklogs as produced by the extractor
//! - Natural ordering of issue keys
//! - Reporting period: the month-to-date window derived from "today"
//! - Matrix: the issue x day grid of hours with row and column totals

pub mod matrix;
pub mod natural;
pub mod period;
pub mod record;

pub use matrix::{
    AggregatedCell, IssueDescription, MalformedReason, MatrixError, WorklogMatrix, aggregate,
    describe_issues,
};
pub use natural::natural_cmp;
pub use period::{ReportingPeriod, local_midnight_to_utc};
pub use record::{WorklogRecord, round_hours, seconds_to_hours, total_seconds};
