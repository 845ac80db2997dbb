//! Jira worklog calendar CLI library.
//!
//! This crate provides the `wl` command-line interface on top of `wl-core`
//! and `wl-jira`.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands};
pub use config::{Config, dirs_config_path};
