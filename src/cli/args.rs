//! CLI argument definitions using clap
//!
//! Commands:
//! - charitybase serve --data <path> [--config <path>]
//! - charitybase query --data <path> [--config <path>] [--param k=v]... [--search <term>] [--count]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CharityBase - query service for charity register records
#[derive(Parser, Debug)]
#[command(name = "charitybase")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Minimum log severity (TRACE, INFO, WARN, ERROR, FATAL).
    /// Defaults to INFO for `serve` and WARN for `query`, whose stdout is the result.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the query API over HTTP
    Serve {
        /// Path to configuration file; built-in defaults when absent
        #[arg(long)]
        config: Option<PathBuf>,

        /// JSON array of charity documents
        #[arg(long)]
        data: PathBuf,
    },

    /// Run a single query and print the response envelope
    Query {
        /// Path to configuration file; built-in defaults when absent
        #[arg(long)]
        config: Option<PathBuf>,

        /// JSON array of charity documents
        #[arg(long)]
        data: PathBuf,

        /// Query-string parameter as `key=value`, repeatable and order-preserving
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// Free-text search term
        #[arg(long)]
        search: Option<String>,

        /// Also report the total number of matches
        #[arg(long)]
        count: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

/// Split `key=value` at the first `=`; a bare key gets an empty value
pub fn split_param(param: &str) -> (String, String) {
    match param.split_once('=') {
        Some((key, value)) => (key.to_string(), value.to_string()),
        None => (param.to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_param() {
        assert_eq!(split_param("limit=5"), ("limit".into(), "5".into()));
        assert_eq!(split_param("registered"), ("registered".into(), String::new()));
        // Comparison operators survive the split and are re-joined by the parser
        assert_eq!(
            split_param("mainCharity.income>=1000"),
            ("mainCharity.income>".into(), "1000".into())
        );
    }

    #[test]
    fn test_parse_query_command() {
        let cli = Cli::try_parse_from([
            "charitybase",
            "query",
            "--data",
            "charities.json",
            "--param",
            "limit=5",
            "--param",
            "sort=-charityNumber",
            "--search",
            "food bank",
            "--count",
        ])
        .unwrap();

        match cli.command {
            Command::Query {
                config,
                data,
                params,
                search,
                count,
            } => {
                assert!(config.is_none());
                assert_eq!(data, PathBuf::from("charities.json"));
                assert_eq!(params, vec!["limit=5", "sort=-charityNumber"]);
                assert_eq!(search.as_deref(), Some("food bank"));
                assert!(count);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(cli.log_level.is_none());
    }

    #[test]
    fn test_serve_requires_data() {
        assert!(Cli::try_parse_from(["charitybase", "serve"]).is_err());
    }
}
