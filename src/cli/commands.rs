//! CLI command implementations
//!
//! Both commands load configuration (or fall back to built-in defaults),
//! load the document file into an `InMemoryStore`, then hand off to the
//! query pipeline.

use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::config::ServiceConfig;
use crate::http::{ApiServer, CharitiesResponse};
use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::params;
use crate::query::QueryNormalizer;
use crate::store::InMemoryStore;

use super::args::{split_param, Cli, Command};
use super::errors::{CliError, CliResult};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cli: Cli) -> CliResult<()> {
    let fallback = match cli.command {
        Command::Serve { .. } => Severity::Info,
        Command::Query { .. } => Severity::Warn,
    };
    Logger::set_min_severity(log_level(cli.log_level.as_deref(), fallback)?);

    match cli.command {
        Command::Serve { config, data } => serve(config.as_deref(), &data),
        Command::Query {
            config,
            data,
            params,
            search,
            count,
        } => {
            let raw: Vec<(String, String)> = params.iter().map(|p| split_param(p)).collect();
            let (search, count) = resolve_flags(&raw, search.as_deref(), count);
            query(config.as_deref(), &data, &raw, search, count)
        }
    }
}

/// `--search` / `--count` win; otherwise `search=` and `countResults` in the
/// params apply, as they do over HTTP
fn resolve_flags<'a>(
    raw: &'a [(String, String)],
    search: Option<&'a str>,
    count: bool,
) -> (Option<&'a str>, bool) {
    (
        search.or_else(|| params::search_term(raw)),
        count || params::wants_count(raw),
    )
}

fn log_level(requested: Option<&str>, fallback: Severity) -> CliResult<Severity> {
    match requested {
        None => Ok(fallback),
        Some(name) => Severity::parse(name)
            .ok_or_else(|| CliError::config_error(format!("Unknown log level: '{}'", name))),
    }
}

/// Load configuration from `path`, or the built-in defaults when absent
pub fn load_config(path: Option<&Path>) -> CliResult<ServiceConfig> {
    let (config, source) = match path {
        Some(path) => (ServiceConfig::load(path)?, path.display().to_string()),
        None => (ServiceConfig::default(), "defaults".to_string()),
    };

    let version = config.query.version.clone();
    log_event_with_fields(
        Event::ConfigLoaded,
        &[("source", source.as_str()), ("version", version.as_str())],
    );

    Ok(config)
}

/// Load the document file named on the command line
pub fn load_store(path: &Path, config: &ServiceConfig) -> CliResult<InMemoryStore> {
    let store = InMemoryStore::load(path, config.store.text_fields.clone())?;

    let documents = store.len()?.to_string();
    let source = path.display().to_string();
    log_event_with_fields(
        Event::StoreLoaded,
        &[("documents", documents.as_str()), ("source", source.as_str())],
    );

    Ok(store)
}

/// Start the HTTP server and block until it stops
pub fn serve(config_path: Option<&Path>, data_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let store = load_store(data_path, &config)?;

    let server = ApiServer::new(
        config.server.clone(),
        QueryNormalizer::new(config.query.clone())?,
        store,
    );

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::serve_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::serve_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Run one query and print the response envelope on stdout
pub fn query(
    config_path: Option<&Path>,
    data_path: &Path,
    raw: &[(String, String)],
    search: Option<&str>,
    count: bool,
) -> CliResult<()> {
    let config = load_config(config_path)?;
    let store = load_store(data_path, &config)?;
    let normalizer = QueryNormalizer::new(config.query.clone())?;

    let outcome = normalizer.normalize_and_execute(&store, raw, search, count)?;
    let response = CharitiesResponse::new(config.query.version.clone(), outcome);

    write_json(&response)
}

fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    fn data_file(documents: serde_json::Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", documents).unwrap();
        file
    }

    #[test]
    fn test_load_config_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn test_load_config_rejects_invalid_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"query": {{"default_limit": 0}}}}"#).unwrap();

        let err = load_config(Some(file.path())).unwrap_err();
        assert_eq!(err.code_str(), "CHARITY_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_load_store() {
        let file = data_file(json!([{"charityNumber": 1}, {"charityNumber": 2}]));
        let store = load_store(file.path(), &ServiceConfig::default()).unwrap();
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn test_load_store_missing_file() {
        let err = load_store(Path::new("/nonexistent/charities.json"), &ServiceConfig::default())
            .unwrap_err();
        assert_eq!(err.code_str(), "CHARITY_CLI_STORE_ERROR");
    }

    #[test]
    fn test_query_runs_end_to_end() {
        let file = data_file(json!([
            {"charityNumber": 2, "subNumber": 0, "registered": true, "name": "B"},
            {"charityNumber": 1, "subNumber": 0, "registered": true, "name": "A"}
        ]));
        let raw = vec![("limit".to_string(), "1".to_string())];
        query(None, file.path(), &raw, None, true).unwrap();
    }

    #[test]
    fn test_param_search_and_count_match_http() {
        let raw = vec![split_param("search=food bank"), split_param("countResults")];
        assert_eq!(resolve_flags(&raw, None, false), (Some("food bank"), true));

        // explicit flags take precedence
        assert_eq!(resolve_flags(&raw, Some("hospice"), false), (Some("hospice"), true));

        let plain = vec![split_param("limit=5")];
        assert_eq!(resolve_flags(&plain, None, false), (None, false));
    }

    #[test]
    fn test_log_level() {
        assert_eq!(log_level(None, Severity::Warn).unwrap(), Severity::Warn);
        assert_eq!(log_level(Some("trace"), Severity::Info).unwrap(), Severity::Trace);
        assert!(log_level(Some("loud"), Severity::Info).is_err());
    }
}
