//! CLI command implementations
//!
//! Both commands load the search configuration and a document file, read one
//! request from stdin and write one JSON object to stdout:
//! - `query`: the table response (failures become error responses)
//! - `explain`: the prepared store query with its counts

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::config::SearchConfig;
use crate::observability::{log_event, Event, Logger, Severity};
use crate::query::MemoryCollection;
use crate::request::TabularRequest;
use crate::response::TableResponse;
use crate::table::DataTable;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_json};

/// Load the search configuration, or defaults when no path is given
pub fn load_config(path: Option<&Path>) -> CliResult<SearchConfig> {
    let Some(path) = path else {
        return Ok(SearchConfig::default());
    };

    let config = SearchConfig::load(path).map_err(|e| {
        CliError::config_error(format!("Failed to load {}: {}", path.display(), e))
    })?;

    log_event(
        Event::ConfigLoaded,
        &[
            ("case_insensitive", bool_str(config.case_insensitive)),
            ("path", &path.display().to_string()),
            ("smart_search", bool_str(config.smart_search)),
            ("wildcard", bool_str(config.wildcard)),
        ],
    );
    Ok(config)
}

/// Load a JSON array of documents as a collection named after the file
pub fn load_collection(path: &Path) -> CliResult<MemoryCollection> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::data_error(format!("Failed to read {}: {}", path.display(), e)))?;

    let documents: Vec<Value> = serde_json::from_str(&content).map_err(|e| {
        CliError::data_error(format!(
            "{} must hold a JSON array of documents: {}",
            path.display(),
            e
        ))
    })?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("collection");
    Ok(MemoryCollection::with_documents(name, documents))
}

/// Run one request against a collection.
///
/// A request that cannot be decoded yields an error response, like any
/// other table failure.
pub fn query_response(
    config: SearchConfig,
    collection: &MemoryCollection,
    request: &Value,
) -> TableResponse {
    let request = match TabularRequest::from_value(request) {
        Ok(request) => request,
        Err(err) => {
            let draw = request.get("draw").and_then(Value::as_u64).unwrap_or(0);
            return TableResponse::error(draw, &err);
        }
    };

    DataTable::of(collection, request)
        .with_config(config)
        .run(true)
}

/// Prepare one request against a collection and render its plan
pub fn explain_plan(
    config: SearchConfig,
    collection: &MemoryCollection,
    request: &Value,
) -> CliResult<Value> {
    let request = TabularRequest::from_value(request)?;
    let plan = DataTable::of(collection, request)
        .with_config(config)
        .explain()?;
    Ok(plan)
}

/// Run the CLI
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    if cli.verbose {
        Logger::set_min_severity(Severity::Trace);
    }
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Query { config, data } => query(config.as_deref(), &data),
        Command::Explain { config, data } => explain(config.as_deref(), &data),
    }
}

/// Execute a single table request and exit
pub fn query(config_path: Option<&Path>, data_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let collection = load_collection(data_path)?;
    let request = read_request()?;

    let response = query_response(config, &collection, &request);
    write_json(&response.to_value())
}

/// Explain a single table request and exit
pub fn explain(config_path: Option<&Path>, data_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;
    let collection = load_collection(data_path)?;
    let request = read_request()?;

    let plan = explain_plan(config, &collection, &request)?;
    write_json(&plan)
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
