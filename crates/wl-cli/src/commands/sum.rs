//! Implementation of the `wl sum` command: total hours logged in a range.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Datelike, Days, NaiveDate};
use clap::Args;
use wl_core::{seconds_to_hours, total_seconds};
use wl_jira::DateBound;

use super::util::{SourceArgs, collect_records, local_today};
use crate::Config;

#[derive(Debug, Clone, Args)]
pub struct SumArgs {
    /// First day to include (default: start of this month).
    ///
    /// Selects what is fetched from Jira. Records read with `--input` carry
    /// only a day of month, so the two cannot be combined.
    #[arg(long, value_name = "YYYY-MM-DD", conflicts_with = "input")]
    pub from: Option<NaiveDate>,

    /// Last day to include (default: today). Cannot be combined with `--input`.
    #[arg(long, value_name = "YYYY-MM-DD", conflicts_with = "input")]
    pub to: Option<NaiveDate>,

    #[command(flatten)]
    pub source: SourceArgs,
}

impl SumArgs {
    /// JQL bounds. Without flags these are Jira's own `startOfMonth()` and
    /// `now()`.
    fn bounds(&self, today: NaiveDate) -> (DateBound, DateBound) {
        if self.from.is_none() && self.to.is_none() {
            return (DateBound::StartOfMonth, DateBound::Now);
        }
        let (from, to) = self.dates(today);
        (DateBound::Date(from), DateBound::Date(to))
    }

    /// Local days covered, inclusive.
    fn dates(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let to = self.to.unwrap_or(today);
        let from = self
            .from
            .unwrap_or_else(|| to - Days::new(u64::from(to.day0())));
        (from, to)
    }
}

/// Formats the summary line.
pub fn format_total(seconds: i64) -> String {
    format!("Total hours spent: {:.2}", seconds_to_hours(seconds))
}

/// Runs the sum command.
pub fn run<W: Write>(out: &mut W, args: &SumArgs, config: &Config) -> Result<()> {
    let today = local_today();
    let records = collect_records(
        &args.source,
        config,
        args.bounds(today),
        args.dates(today),
    )?;
    let total = total_seconds(&records).context("total logged time overflows")?;
    writeln!(out, "{}", format_total(total))?;
    Ok(())
}
