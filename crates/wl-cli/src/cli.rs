//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::export::ExportArgs;
use crate::commands::report::ReportArgs;
use crate::commands::sum::SumArgs;

/// Jira worklog calendar.
///
/// Collects your Jira worklogs for the month so far and lays them out as an
/// issue x day grid of hours, with row and column totals.
#[derive(Debug, Parser)]
#[command(name = "wl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the month-to-date worklog calendar.
    Report(ReportArgs),

    /// Write the worklog calendar to an .xlsx or .csv file.
    Export(ExportArgs),

    /// Print the total hours logged in a date range.
    Sum(SumArgs),
}
