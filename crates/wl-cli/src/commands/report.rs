//! Report command for the month-to-date worklog calendar.
//!
//! This module implements `wl report`, which lays the worklogs of the current
//! month out as an issue x day grid and prints it as a table, CSV, or JSON.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use serde::Serialize;
use wl_core::{ReportingPeriod, WorklogMatrix, WorklogRecord};
use wl_jira::DateBound;

use super::util::{SourceArgs, collect_records, local_timezone, local_today};
use crate::Config;

/// Output format for `wl report`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Aligned plain-text grid.
    #[default]
    Table,
    Csv,
    Json,
}

#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    /// Last day of the report (default: today).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Table)]
    pub format: ReportFormat,

    #[command(flatten)]
    pub source: SourceArgs,
}

/// Computed report data.
#[derive(Debug)]
pub struct ReportData {
    pub period: ReportingPeriod,
    pub timezone: String,
    pub matrix: WorklogMatrix,
}

impl ReportData {
    /// Builds the calendar for `period` from already collected records.
    pub fn from_records(
        records: &[WorklogRecord],
        period: ReportingPeriod,
        timezone: String,
    ) -> Result<Self> {
        let matrix =
            WorklogMatrix::build(records, &period).context("failed to build worklog calendar")?;
        tracing::debug!(
            rows = matrix.rows(),
            days = matrix.days(),
            "built worklog calendar"
        );
        Ok(Self {
            period,
            timezone,
            matrix,
        })
    }
}

/// Collects the worklogs for the month ending at `date` and builds the calendar.
pub fn generate_report_data(
    date: Option<NaiveDate>,
    source: &SourceArgs,
    config: &Config,
) -> Result<ReportData> {
    let period = ReportingPeriod::new(date.unwrap_or_else(local_today));
    let records = collect_records(
        source,
        config,
        (
            DateBound::Date(period.start()),
            DateBound::Date(period.today()),
        ),
        (period.start(), period.today()),
    )?;
    ReportData::from_records(&records, period, local_timezone())
}

// ========== Table Output ==========

fn format_cell(hours: f64) -> String {
    // Cells are rounded to hundredths, so anything below that is empty.
    if hours.abs() < 0.005 {
        "-".to_string()
    } else {
        format!("{hours:.2}")
    }
}

/// Formats the calendar as an aligned text grid.
///
/// Empty cells are shown as `-`; totals are always numeric.
pub fn format_table(data: &ReportData) -> String {
    let mut output = String::new();
    let matrix = &data.matrix;

    writeln!(
        output,
        "Worklogs for {} ({})",
        data.period.title(),
        data.timezone
    )
    .unwrap();

    if matrix.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "No worklogs recorded for {}.", data.period.title()).unwrap();
        return output;
    }

    let mut grid: Vec<Vec<String>> = Vec::with_capacity(matrix.rows() + 2);

    let mut header = vec!["Key".to_string(), "Summary".to_string()];
    header.extend((1..=matrix.days()).map(|day| day.to_string()));
    header.push("Total".to_string());
    grid.push(header);

    for ((issue, cells), total) in matrix
        .descriptions()
        .iter()
        .zip(matrix.cells())
        .zip(matrix.row_sums())
    {
        let mut line = vec![issue.issue_key.clone(), issue.summary.clone()];
        line.extend(cells.iter().map(|&hours| format_cell(hours)));
        line.push(format!("{total:.2}"));
        grid.push(line);
    }

    let mut footer = vec!["Total".to_string(), String::new()];
    footer.extend(matrix.col_sums().iter().map(|sum| format!("{sum:.2}")));
    footer.push(format!("{:.2}", matrix.grand_total()));
    grid.push(footer);

    let columns = grid[0].len();
    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            grid.iter()
                .map(|line| line[col].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    writeln!(output).unwrap();
    for line in &grid {
        let fields: Vec<String> = line
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(col, (field, &width))| {
                // Key and summary read left to right, numbers line up on the right.
                if col < 2 {
                    format!("{field:<width$}")
                } else {
                    format!("{field:>width$}")
                }
            })
            .collect();
        writeln!(output, "{}", fields.join("  ")).unwrap();
    }

    output
}

// ========== CSV Output ==========

/// Quotes a CSV field when it contains a separator, quote, or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Formats the calendar as CSV with a header row and a totals footer.
pub fn format_csv(matrix: &WorklogMatrix) -> String {
    let mut output = String::new();

    let mut header = vec!["Key".to_string(), "Summary".to_string()];
    header.extend((1..=matrix.days()).map(|day| day.to_string()));
    header.push("Total".to_string());
    writeln!(output, "{}", header.join(",")).unwrap();

    for ((issue, cells), total) in matrix
        .descriptions()
        .iter()
        .zip(matrix.cells())
        .zip(matrix.row_sums())
    {
        let mut line = vec![csv_field(&issue.issue_key), csv_field(&issue.summary)];
        line.extend(cells.iter().map(|hours| format!("{hours:.2}")));
        line.push(format!("{total:.2}"));
        writeln!(output, "{}", line.join(",")).unwrap();
    }

    let mut footer = vec!["Total".to_string(), String::new()];
    footer.extend(matrix.col_sums().iter().map(|sum| format!("{sum:.2}")));
    footer.push(format!("{:.2}", matrix.grand_total()));
    writeln!(output, "{}", footer.join(",")).unwrap();

    output
}

// ========== JSON Output ==========

/// JSON report structure.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub month: String,
    pub period_start: String,
    pub today: String,
    pub timezone: &'a str,
    pub days: u32,
    pub issues: Vec<JsonIssue<'a>>,
    pub col_sums: &'a [f64],
    pub grand_total: f64,
    pub total_seconds: i64,
}

#[derive(Debug, Serialize)]
pub struct JsonIssue<'a> {
    pub key: &'a str,
    pub summary: &'a str,
    pub hours: &'a [f64],
    pub total: f64,
}

/// Formats report data as JSON.
pub fn format_json(data: &ReportData) -> Result<String> {
    let matrix = &data.matrix;
    let issues = matrix
        .descriptions()
        .iter()
        .zip(matrix.cells())
        .zip(matrix.row_sums())
        .map(|((issue, hours), &total)| JsonIssue {
            key: &issue.issue_key,
            summary: &issue.summary,
            hours,
            total,
        })
        .collect();

    let report = JsonReport {
        month: data.period.title(),
        period_start: data.period.start().format("%Y-%m-%d").to_string(),
        today: data.period.today().format("%Y-%m-%d").to_string(),
        timezone: &data.timezone,
        days: matrix.days(),
        issues,
        col_sums: matrix.col_sums(),
        grand_total: matrix.grand_total(),
        total_seconds: matrix.total_seconds(),
    };

    Ok(serde_json::to_string_pretty(&report)?)
}

// ========== Public Interface ==========

/// Runs the report command.
pub fn run<W: Write>(out: &mut W, args: &ReportArgs, config: &Config) -> Result<()> {
    let data = generate_report_data(args.date, &args.source, config)?;

    match args.format {
        ReportFormat::Table => write!(out, "{}", format_table(&data))?,
        ReportFormat::Csv => write!(out, "{}", format_csv(&data.matrix))?,
        ReportFormat::Json => writeln!(out, "{}", format_json(&data)?)?,
    }

    Ok(())
}
