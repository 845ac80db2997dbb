//! CLI subcommand implementations.

pub mod export;
pub mod report;
pub mod sum;
pub mod util;
