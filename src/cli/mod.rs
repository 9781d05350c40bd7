//! CLI module for CharityBase
//!
//! Provides command-line interface for:
//! - serve: Load documents and serve the query API over HTTP
//! - query: One-shot query execution, envelope printed to stdout

mod args;
mod commands;
mod errors;

pub use args::{split_param, Cli, Command};
pub use commands::{load_config, load_store, query, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
