//! Issue x day calendar matrix.
//!
//! Reshapes a flat list of [`WorklogRecord`]s into a dense grid of hours with
//! one row per issue and one column per elapsed day of the reporting period.
//!
//! # Algorithm Summary
//!
//! 1. Validate every record up front (the build is all-or-nothing)
//! 2. Aggregate seconds per `(issue_key, day_of_month)`
//! 3. Order distinct issues naturally, keeping the first-seen summary
//! 4. Place each aggregated cell, rounded to hundredths of an hour
//! 5. Reduce row and column sums from the rounded grid
//!
//! Sums are computed from already-rounded cells, so they may drift from the
//! exact total by at most `0.005` hours per non-empty cell.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use thiserror::Error;

use crate::natural::natural_cmp;
use crate::period::ReportingPeriod;
use crate::record::{WorklogRecord, seconds_to_hours};

/// Why a record was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MalformedReason {
    /// The record has no issue key.
    #[error("issue key is empty")]
    EmptyIssueKey,

    /// The day lies outside `1..=days`.
    #[error("day {day} is outside the reporting period 1..={days}")]
    DayOutOfRange { day: u32, days: u32 },

    /// The logged duration is negative.
    #[error("negative duration of {seconds}s")]
    NegativeDuration { seconds: i64 },
}

/// Matrix construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    /// An input record violates the extractor contract.
    #[error("malformed worklog record for {issue_key:?}: {reason}")]
    MalformedRecord {
        issue_key: String,
        reason: MalformedReason,
    },

    /// Adding this record's duration overflows the seconds counter.
    #[error("logged time overflows at worklog for {issue_key:?} on day {day}")]
    DurationOverflow { issue_key: String, day: u32 },

    /// A matrix cell would be written twice after aggregation.
    #[error("matrix cell for {issue_key} on day {day} written twice")]
    InternalInconsistency { issue_key: String, day: u32 },
}

/// Total seconds logged against one issue on one day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AggregatedCell {
    pub issue_key: String,
    pub day_of_month: u32,
    pub seconds_spent: i64,
}

/// Row label: an issue key and its summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueDescription {
    pub issue_key: String,
    pub summary: String,
}

/// Sums `seconds_spent` per distinct `(issue_key, day_of_month)`.
///
/// The output order is unspecified. Fails if a cell's sum overflows.
pub fn aggregate(records: &[WorklogRecord]) -> Result<Vec<AggregatedCell>, MatrixError> {
    let mut sums: HashMap<(&str, u32), i64> = HashMap::new();
    for record in records {
        let seconds = sums
            .entry((record.issue_key.as_str(), record.day_of_month))
            .or_insert(0);
        *seconds = seconds
            .checked_add(record.seconds_spent)
            .ok_or_else(|| overflow(record))?;
    }

    Ok(sums
        .into_iter()
        .map(|((issue_key, day_of_month), seconds_spent)| AggregatedCell {
            issue_key: issue_key.to_string(),
            day_of_month,
            seconds_spent,
        })
        .collect())
}

fn overflow(record: &WorklogRecord) -> MatrixError {
    MatrixError::DurationOverflow {
        issue_key: record.issue_key.clone(),
        day: record.day_of_month,
    }
}

/// Distinct issues in natural key order.
///
/// Each issue keeps the summary of the first record seen for its key.
pub fn describe_issues(records: &[WorklogRecord]) -> Vec<IssueDescription> {
    let mut seen = HashSet::new();
    let mut issues = Vec::new();
    for record in records {
        if seen.insert(record.issue_key.as_str()) {
            issues.push(IssueDescription {
                issue_key: record.issue_key.clone(),
                summary: record.summary.clone(),
            });
        }
    }
    issues.sort_by(|a, b| natural_cmp(&a.issue_key, &b.issue_key));
    issues
}

fn validate(record: &WorklogRecord, days: u32) -> Result<(), MatrixError> {
    let reason = if record.issue_key.is_empty() {
        MalformedReason::EmptyIssueKey
    } else if record.day_of_month < 1 || record.day_of_month > days {
        MalformedReason::DayOutOfRange {
            day: record.day_of_month,
            days,
        }
    } else if record.seconds_spent < 0 {
        MalformedReason::NegativeDuration {
            seconds: record.seconds_spent,
        }
    } else {
        return Ok(());
    };

    Err(MatrixError::MalformedRecord {
        issue_key: record.issue_key.clone(),
        reason,
    })
}

/// Writes each aggregated cell into a zeroed `issues x days` grid.
fn populate(
    issues: &[IssueDescription],
    cells: Vec<AggregatedCell>,
    days: u32,
) -> Result<Vec<Vec<f64>>, MatrixError> {
    let width = days as usize;
    let row_of: HashMap<&str, usize> = issues
        .iter()
        .enumerate()
        .map(|(row, issue)| (issue.issue_key.as_str(), row))
        .collect();

    let mut grid = vec![vec![0.0; width]; issues.len()];
    let mut written = vec![vec![false; width]; issues.len()];

    for cell in cells {
        let inconsistency = || MatrixError::InternalInconsistency {
            issue_key: cell.issue_key.clone(),
            day: cell.day_of_month,
        };
        let row = *row_of
            .get(cell.issue_key.as_str())
            .ok_or_else(inconsistency)?;
        let col = (cell.day_of_month as usize)
            .checked_sub(1)
            .filter(|&col| col < width)
            .ok_or_else(inconsistency)?;

        if written[row][col] {
            return Err(inconsistency());
        }
        written[row][col] = true;
        grid[row][col] = seconds_to_hours(cell.seconds_spent);
    }

    Ok(grid)
}

/// Issue x day grid of hours with row and column totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorklogMatrix {
    days: u32,
    issues: Vec<IssueDescription>,
    cells: Vec<Vec<f64>>,
    row_sums: Vec<f64>,
    col_sums: Vec<f64>,
    total_seconds: i64,
}

impl WorklogMatrix {
    /// Builds the matrix for the month-to-date `period`.
    pub fn build(records: &[WorklogRecord], period: &ReportingPeriod) -> Result<Self, MatrixError> {
        Self::build_with_days(records, period.days_elapsed())
    }

    /// Builds a matrix `days` columns wide.
    ///
    /// Fails without producing a partial matrix if any record has an empty
    /// key, a day outside `1..=days`, or a negative duration, or if the
    /// logged time overflows.
    pub fn build_with_days(records: &[WorklogRecord], days: u32) -> Result<Self, MatrixError> {
        for record in records {
            validate(record, days)?;
        }

        // Durations are non-negative, so a total that fits bounds every cell.
        let total_seconds = records.iter().try_fold(0_i64, |total, record| {
            total
                .checked_add(record.seconds_spent)
                .ok_or_else(|| overflow(record))
        })?;

        let issues = describe_issues(records);
        let aggregated = aggregate(records)?;
        let cells = populate(&issues, aggregated, days)?;

        let row_sums: Vec<f64> = cells.iter().map(|row| row.iter().sum()).collect();
        let col_sums: Vec<f64> = (0..days as usize)
            .map(|col| cells.iter().map(|row| row[col]).sum())
            .collect();

        Ok(Self {
            days,
            issues,
            cells,
            row_sums,
            col_sums,
            total_seconds,
        })
    }

    /// Number of issue rows.
    pub fn rows(&self) -> usize {
        self.issues.len()
    }

    /// Number of day columns.
    pub const fn days(&self) -> u32 {
        self.days
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Hours per cell, `cells()[row][day - 1]`.
    pub fn cells(&self) -> &[Vec<f64>] {
        &self.cells
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.cells.get(index).map(Vec::as_slice)
    }

    /// Issue key and summary per row, aligned with [`Self::cells`].
    pub fn descriptions(&self) -> &[IssueDescription] {
        &self.issues
    }

    pub fn row_sums(&self) -> &[f64] {
        &self.row_sums
    }

    pub fn col_sums(&self) -> &[f64] {
        &self.col_sums
    }

    /// Sum of all row sums, in rounded hours.
    pub fn grand_total(&self) -> f64 {
        self.row_sums.iter().sum()
    }

    /// Exact logged time in seconds, before any rounding.
    pub const fn total_seconds(&self) -> i64 {
        self.total_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::total_seconds;

    fn record(key: &str, summary: &str, day: u32, seconds: i64) -> WorklogRecord {
        WorklogRecord::new(key, summary, day, seconds)
    }

    fn scenario() -> Vec<WorklogRecord> {
        vec![
            record("A-1", "Fix bug", 1, 3600),
            record("A-1", "Fix bug", 1, 1800),
            record("B-2", "Add feature", 2, 7200),
        ]
    }

    fn keys(matrix: &WorklogMatrix) -> Vec<&str> {
        matrix
            .descriptions()
            .iter()
            .map(|d| d.issue_key.as_str())
            .collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    // ========== Aggregation ==========

    #[test]
    fn test_aggregate_merges_same_issue_and_day() {
        let mut cells = aggregate(&scenario()).unwrap();
        cells.sort_by(|a, b| a.issue_key.cmp(&b.issue_key));
        assert_eq!(
            cells,
            vec![
                AggregatedCell {
                    issue_key: "A-1".to_string(),
                    day_of_month: 1,
                    seconds_spent: 5400,
                },
                AggregatedCell {
                    issue_key: "B-2".to_string(),
                    day_of_month: 2,
                    seconds_spent: 7200,
                },
            ]
        );
    }

    #[test]
    fn test_aggregate_keeps_days_apart() {
        let records = vec![record("A-1", "x", 1, 60), record("A-1", "x", 2, 120)];
        assert_eq!(aggregate(&records).unwrap().len(), 2);
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(aggregate(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_aggregate_conserves_seconds() {
        let records = vec![
            record("A-1", "a", 1, 1),
            record("A-1", "a", 1, 2),
            record("A-10", "b", 3, 4),
            record("A-2", "c", 3, 8),
            record("A-2", "c", 3, 16),
            record("A-2", "c", 4, 0),
        ];
        let aggregated: i64 = aggregate(&records)
            .unwrap()
            .iter()
            .map(|c| c.seconds_spent)
            .sum();
        assert_eq!(Some(aggregated), total_seconds(&records));
        assert_eq!(aggregated, 31);
    }

    #[test]
    fn test_aggregate_rejects_cell_overflow() {
        let records = vec![record("A-1", "x", 1, i64::MAX), record("A-1", "x", 1, 1)];
        assert_eq!(
            aggregate(&records),
            Err(MatrixError::DurationOverflow {
                issue_key: "A-1".to_string(),
                day: 1,
            })
        );
    }

    // ========== Ordering and descriptions ==========

    #[test]
    fn test_describe_issues_natural_order() {
        let records = vec![
            record("A-2", "two", 1, 60),
            record("A-10", "ten", 1, 60),
            record("A-1", "one", 1, 60),
        ];
        let keys: Vec<_> = describe_issues(&records)
            .into_iter()
            .map(|d| d.issue_key)
            .collect();
        assert_eq!(keys, vec!["A-1", "A-2", "A-10"]);
    }

    #[test]
    fn test_first_seen_summary_wins() {
        let records = vec![
            record("A-1", "Original title", 1, 60),
            record("A-1", "Renamed title", 2, 60),
        ];
        let issues = describe_issues(&records);
        assert_eq!(
            issues,
            vec![IssueDescription {
                issue_key: "A-1".to_string(),
                summary: "Original title".to_string(),
            }]
        );
    }

    // ========== Matrix construction ==========

    #[test]
    fn test_build_scenario() {
        let matrix = WorklogMatrix::build_with_days(&scenario(), 3).unwrap();

        assert_eq!(keys(&matrix), vec!["A-1", "B-2"]);
        assert_eq!(matrix.cells(), &[vec![1.5, 0.0, 0.0], vec![0.0, 2.0, 0.0]]);
        assert_eq!(matrix.row_sums(), &[1.5, 2.0]);
        assert_eq!(matrix.col_sums(), &[1.5, 2.0, 0.0]);
        assert_close(matrix.grand_total(), 3.5);
        assert_eq!(matrix.total_seconds(), 12_600);
        assert_eq!(matrix.descriptions()[1].summary, "Add feature");
    }

    #[test]
    fn test_build_from_period_uses_days_elapsed() {
        let today = chrono::NaiveDate::from_ymd_opt(2025, 4, 3).unwrap();
        let matrix = WorklogMatrix::build(&scenario(), &ReportingPeriod::new(today)).unwrap();
        assert_eq!(matrix.days(), 3);
        assert_eq!(matrix.col_sums().len(), 3);
    }

    #[test]
    fn test_build_empty_input() {
        let matrix = WorklogMatrix::build_with_days(&[], 5).unwrap();
        assert!(matrix.is_empty());
        assert_eq!(matrix.rows(), 0);
        assert!(matrix.cells().is_empty());
        assert!(matrix.descriptions().is_empty());
        assert!(matrix.row_sums().is_empty());
        assert_eq!(matrix.col_sums(), &[0.0; 5]);
        assert_close(matrix.grand_total(), 0.0);
    }

    #[test]
    fn test_build_zero_width() {
        let matrix = WorklogMatrix::build_with_days(&[], 0).unwrap();
        assert_eq!(matrix.days(), 0);
        assert!(matrix.col_sums().is_empty());
    }

    #[test]
    fn test_zero_length_worklog_is_accepted() {
        let records = vec![record("A-1", "Standup", 2, 0)];
        let matrix = WorklogMatrix::build_with_days(&records, 2).unwrap();
        assert_eq!(matrix.rows(), 1);
        assert_eq!(matrix.row(0), Some(&[0.0, 0.0][..]));
    }

    #[test]
    fn test_rows_follow_natural_order() {
        let records = vec![
            record("ISSUE-10", "ten", 1, 3600),
            record("ISSUE-9", "nine", 2, 3600),
        ];
        let matrix = WorklogMatrix::build_with_days(&records, 2).unwrap();
        assert_eq!(keys(&matrix), vec!["ISSUE-9", "ISSUE-10"]);
        assert_eq!(matrix.row(0), Some(&[0.0, 1.0][..]));
        assert_eq!(matrix.row(1), Some(&[1.0, 0.0][..]));
        assert_eq!(matrix.row(2), None);
    }

    #[test]
    fn test_description_table_aligned_with_rows() {
        let records = vec![
            record("C-3", "c", 1, 600),
            record("A-1", "a", 2, 1200),
            record("B-20", "b", 3, 1800),
            record("B-3", "b3", 3, 2400),
        ];
        let matrix = WorklogMatrix::build_with_days(&records, 3).unwrap();
        assert_eq!(matrix.descriptions().len(), matrix.rows());
        assert_eq!(matrix.cells().len(), matrix.rows());
        assert_eq!(matrix.row_sums().len(), matrix.rows());

        for (row, issue) in matrix.descriptions().iter().enumerate() {
            let expected: i64 = records
                .iter()
                .filter(|r| r.issue_key == issue.issue_key)
                .map(|r| r.seconds_spent)
                .sum();
            assert_close(matrix.row_sums()[row], seconds_to_hours(expected));
        }
    }

    // ========== Errors ==========

    #[test]
    fn test_day_zero_is_malformed() {
        let records = vec![record("A-1", "x", 1, 60), record("A-1", "x", 0, 60)];
        let err = WorklogMatrix::build_with_days(&records, 3).unwrap_err();
        assert_eq!(
            err,
            MatrixError::MalformedRecord {
                issue_key: "A-1".to_string(),
                reason: MalformedReason::DayOutOfRange { day: 0, days: 3 },
            }
        );
    }

    #[test]
    fn test_day_after_today_is_malformed() {
        let records = vec![record("B-2", "x", 4, 60)];
        let err = WorklogMatrix::build_with_days(&records, 3).unwrap_err();
        assert!(matches!(
            err,
            MatrixError::MalformedRecord {
                reason: MalformedReason::DayOutOfRange { day: 4, days: 3 },
                ..
            }
        ));
    }

    #[test]
    fn test_negative_duration_is_malformed() {
        let records = vec![record("A-1", "x", 1, -5)];
        let err = WorklogMatrix::build_with_days(&records, 3).unwrap_err();
        assert!(matches!(
            err,
            MatrixError::MalformedRecord {
                reason: MalformedReason::NegativeDuration { seconds: -5 },
                ..
            }
        ));
    }

    #[test]
    fn test_empty_key_is_malformed() {
        let records = vec![record("", "x", 1, 60)];
        let err = WorklogMatrix::build_with_days(&records, 3).unwrap_err();
        assert!(matches!(
            err,
            MatrixError::MalformedRecord {
                reason: MalformedReason::EmptyIssueKey,
                ..
            }
        ));
    }

    #[test]
    fn test_error_message_names_issue_and_day() {
        let records = vec![record("A-1", "x", 9, 60)];
        let err = WorklogMatrix::build_with_days(&records, 3).unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed worklog record for \"A-1\": day 9 is outside the reporting period 1..=3"
        );
    }

    #[test]
    fn test_populate_rejects_duplicate_cells() {
        let issues = vec![IssueDescription {
            issue_key: "A-1".to_string(),
            summary: "x".to_string(),
        }];
        let cell = AggregatedCell {
            issue_key: "A-1".to_string(),
            day_of_month: 2,
            seconds_spent: 60,
        };
        let err = populate(&issues, vec![cell.clone(), cell], 3).unwrap_err();
        assert_eq!(
            err,
            MatrixError::InternalInconsistency {
                issue_key: "A-1".to_string(),
                day: 2,
            }
        );
    }

    #[test]
    fn test_populate_rejects_unknown_issue() {
        let cell = AggregatedCell {
            issue_key: "Z-9".to_string(),
            day_of_month: 1,
            seconds_spent: 60,
        };
        assert!(matches!(
            populate(&[], vec![cell], 3),
            Err(MatrixError::InternalInconsistency { .. })
        ));
    }

    // ========== Totals ==========

    #[test]
    fn test_totals_drift_within_rounding_tolerance() {
        // 20 minutes rounds to 0.33h, so three cells lose 0.01h in total.
        let records = vec![
            record("A-1", "x", 1, 1200),
            record("A-1", "x", 2, 1200),
            record("A-1", "x", 3, 1200),
        ];
        let matrix = WorklogMatrix::build_with_days(&records, 3).unwrap();
        assert_close(matrix.grand_total(), 0.99);
        assert_eq!(matrix.total_seconds(), 3600);

        #[allow(clippy::cast_precision_loss)]
        let tolerance = (matrix.rows() * matrix.days() as usize) as f64 * 0.005;
        let exact = 1.0;
        assert!((matrix.grand_total() - exact).abs() <= tolerance);
    }

    #[test]
    fn test_row_and_column_sums_agree() {
        let records: Vec<_> = (1..=12)
            .map(|i| {
                record(
                    &format!("P-{}", i % 5),
                    "s",
                    (i % 7) + 1,
                    i64::from(i) * 1000 + 7,
                )
            })
            .collect();
        let matrix = WorklogMatrix::build_with_days(&records, 7).unwrap();

        let row_total: f64 = matrix.row_sums().iter().sum();
        let col_total: f64 = matrix.col_sums().iter().sum();
        let cell_total: f64 = matrix.cells().iter().flatten().sum();

        #[allow(clippy::cast_precision_loss)]
        let tolerance = (matrix.rows() * matrix.days() as usize) as f64 * 0.005;
        assert!((row_total - col_total).abs() <= tolerance);
        assert!((row_total - cell_total).abs() <= tolerance);

        #[allow(clippy::cast_precision_loss)]
        let exact_hours = matrix.total_seconds() as f64 / 3600.0;
        assert!((row_total - exact_hours).abs() <= tolerance);
    }

    #[test]
    fn test_build_is_order_independent() {
        let records = vec![
            record("A-10", "ten", 2, 1234),
            record("A-1", "one", 1, 3600),
            record("B-2", "bee", 3, 999),
            record("A-1", "one", 1, 1800),
            record("A-2", "two", 2, 4000),
            record("B-2", "bee", 1, 61),
        ];
        let expected = WorklogMatrix::build_with_days(&records, 3).unwrap();

        let mut reversed = records.clone();
        reversed.reverse();
        assert_eq!(WorklogMatrix::build_with_days(&reversed, 3).unwrap(), expected);

        for shift in 1..records.len() {
            let mut rotated = records.clone();
            rotated.rotate_left(shift);
            let matrix = WorklogMatrix::build_with_days(&rotated, 3).unwrap();
            assert_eq!(matrix, expected);
            assert_eq!(
                serde_json::to_string(&matrix).unwrap(),
                serde_json::to_string(&expected).unwrap()
            );
        }
    }

    #[test]
    fn test_build_rejects_overflow_in_one_cell() {
        let records = vec![record("A-1", "x", 1, i64::MAX), record("A-1", "x", 1, 1)];
        let err = WorklogMatrix::build_with_days(&records, 2).unwrap_err();
        assert!(matches!(err, MatrixError::DurationOverflow { .. }));
    }

    #[test]
    fn test_build_rejects_overflow_across_days() {
        let records = vec![record("A-1", "x", 1, i64::MAX), record("A-1", "x", 2, 1)];
        assert_eq!(
            WorklogMatrix::build_with_days(&records, 2),
            Err(MatrixError::DurationOverflow {
                issue_key: "A-1".to_string(),
                day: 2,
            })
        );
    }

    #[test]
    fn test_build_twice_is_identical() {
        let first = WorklogMatrix::build_with_days(&scenario(), 3).unwrap();
        let second = WorklogMatrix::build_with_days(&scenario(), 3).unwrap();
        assert_eq!(first, second);
    }
}
