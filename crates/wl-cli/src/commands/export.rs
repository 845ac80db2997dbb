//! Implementation of the `wl export` command.
//!
//! Writes the month-to-date calendar to a spreadsheet (`.xlsx`) or a CSV
//! file, chosen by the output file's extension.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::Args;
use rust_xlsxwriter::{Format, FormatAlign, Workbook};

use super::report::{ReportData, format_csv, generate_report_data};
use super::util::SourceArgs;
use crate::Config;

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Destination file, `.xlsx` or `.csv`.
    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,

    /// Last day of the report (default: today).
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub date: Option<NaiveDate>,

    #[command(flatten)]
    pub source: SourceArgs,
}

/// Spreadsheet layout for one export.
struct SheetFormats {
    header: Format,
    text: Format,
    hours: Format,
    total_label: Format,
    total_hours: Format,
}

impl SheetFormats {
    fn new() -> Self {
        Self {
            header: Format::new().set_bold().set_align(FormatAlign::Center),
            text: Format::new(),
            hours: Format::new().set_num_format("0.00"),
            total_label: Format::new().set_bold(),
            total_hours: Format::new().set_bold().set_num_format("0.00"),
        }
    }
}

/// Writes the calendar to an `.xlsx` workbook with a single `Worklogs` sheet.
///
/// Row 0 holds day labels, columns 0 and 1 the issue key and summary. A bold
/// totals column follows the last day and a bold totals row follows the last
/// issue.
pub fn write_xlsx(data: &ReportData, path: &Path) -> Result<()> {
    let matrix = &data.matrix;
    let formats = SheetFormats::new();
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Worklogs")?;

    let total_col = u16::try_from(matrix.days() + 2).context("too many days for a worksheet")?;
    let total_row =
        u32::try_from(matrix.rows() + 1).context("too many issues for a worksheet")?;

    sheet.write_with_format(0, 0, "Key", &formats.header)?;
    sheet.write_with_format(0, 1, "Summary", &formats.header)?;
    for (col, date) in (2..).zip(data.period.day_labels()) {
        let label = date.format("%a %d").to_string();
        sheet.write_with_format(0, col, label, &formats.header)?;
    }
    sheet.write_with_format(0, total_col, "Total", &formats.header)?;

    for (row, ((issue, cells), &total)) in (1..).zip(
        matrix
            .descriptions()
            .iter()
            .zip(matrix.cells())
            .zip(matrix.row_sums()),
    ) {
        sheet.write_with_format(row, 0, issue.issue_key.as_str(), &formats.text)?;
        sheet.write_with_format(row, 1, issue.summary.as_str(), &formats.text)?;
        for (col, &hours) in (2..).zip(cells) {
            sheet.write_with_format(row, col, hours, &formats.hours)?;
        }
        sheet.write_with_format(row, total_col, total, &formats.total_hours)?;
    }

    sheet.write_with_format(total_row, 0, "Total", &formats.total_label)?;
    for (col, &sum) in (2..).zip(matrix.col_sums()) {
        sheet.write_with_format(total_row, col, sum, &formats.total_hours)?;
    }
    sheet.write_with_format(
        total_row,
        total_col,
        matrix.grand_total(),
        &formats.total_hours,
    )?;

    sheet.set_column_width(0, 12)?;
    sheet.set_column_width(1, 40)?;
    for col in 2..total_col {
        sheet.set_column_width(col, 8)?;
    }
    sheet.set_column_width(total_col, 10)?;
    sheet.set_freeze_panes(1, 2)?;

    workbook
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Writes the calendar as CSV.
pub fn write_csv(data: &ReportData, path: &Path) -> Result<()> {
    fs::write(path, format_csv(&data.matrix))
        .with_context(|| format!("failed to write {}", path.display()))
}

/// Writes `data` to `path` in the format implied by its extension.
pub fn export(data: &ReportData, path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("xlsx") => write_xlsx(data, path),
        Some("csv") => write_csv(data, path),
        _ => bail!(
            "unsupported export format for {} (use .xlsx or .csv)",
            path.display()
        ),
    }
}

/// Runs the export command.
pub fn run<W: Write>(out: &mut W, args: &ExportArgs, config: &Config) -> Result<()> {
    let data = generate_report_data(args.date, &args.source, config)?;
    export(&data, &args.output)?;
    tracing::info!(path = %args.output.display(), "exported worklog calendar");

    writeln!(
        out,
        "Wrote {} issues to {}",
        data.matrix.rows(),
        args.output.display()
    )?;
    Ok(())
}
