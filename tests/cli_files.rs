//! CLI File Tests
//!
//! Tests for the one-shot commands' file handling:
//! - Search configuration files (partial, malformed)
//! - Document files (collection naming, malformed)
//! - End-to-end request decoding and response shape

use std::fs;
use std::path::PathBuf;

use aerotables::cli::{explain_plan, load_collection, load_config, query_response};
use aerotables::config::SearchConfig;
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn customers(dir: &TempDir) -> PathBuf {
    write_file(
        dir,
        "customers.json",
        &json!([
            {"_id": 1, "name": "Jane Doe", "country": "NO", "address": {"city": "Oslo"}},
            {"_id": 2, "name": "John", "country": "IT", "address": {"city": "Rome"}},
            {"_id": 3, "name": "Jana", "country": "CZ", "address": {"city": "Brno"}}
        ])
        .to_string(),
    )
}

// =============================================================================
// Configuration Files
// =============================================================================

/// Missing fields take their defaults.
#[test]
fn test_partial_config_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "config.json", r#"{"smart_search": false}"#);

    let config = load_config(Some(path.as_path())).unwrap();
    assert!(!config.smart_search);
    assert!(config.case_insensitive);
    assert!(!config.wildcard);
}

/// Malformed configuration is a config error.
#[test]
fn test_malformed_config_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "config.json", "{smart_search: }");

    let err = load_config(Some(path.as_path())).unwrap_err();
    assert_eq!(err.code_str(), "TABLE_CLI_CONFIG_ERROR");
}

// =============================================================================
// Document Files
// =============================================================================

/// The collection is named after the file.
#[test]
fn test_collection_named_after_file() {
    let dir = TempDir::new().unwrap();
    let collection = load_collection(&customers(&dir)).unwrap();

    assert_eq!(collection.name(), "customers");
    assert_eq!(collection.len(), 3);
}

/// A document file must hold an array.
#[test]
fn test_document_file_must_be_array() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "rows.json", r#"{"_id": 1}"#);

    let err = load_collection(&path).unwrap_err();
    assert_eq!(err.code_str(), "TABLE_CLI_DATA_ERROR");
}

/// Missing document file.
#[test]
fn test_missing_document_file() {
    let dir = TempDir::new().unwrap();
    let err = load_collection(&dir.path().join("absent.json")).unwrap_err();
    assert_eq!(err.code_str(), "TABLE_CLI_DATA_ERROR");
}

// =============================================================================
// End to End
// =============================================================================

/// Form-style request (all strings) against a file collection.
#[test]
fn test_query_from_files() {
    let dir = TempDir::new().unwrap();
    let collection = load_collection(&customers(&dir)).unwrap();
    let config_path = write_file(&dir, "config.json", r#"{"wildcard": true}"#);
    let config = load_config(Some(config_path.as_path())).unwrap();

    let request = json!({
        "draw": "4",
        "columns": [
            {"data": "name", "name": "", "searchable": "true", "orderable": "true",
             "search": {"value": "", "regex": "false"}},
            {"data": "address.city", "name": "", "searchable": "true", "orderable": "true",
             "search": {"value": "", "regex": "false"}}
        ],
        "order": [{"column": "1", "dir": "DESC"}],
        "start": "0",
        "length": "-1",
        "search": {"value": "ja*", "regex": "false"}
    });

    let value = query_response(config, &collection, &request).to_value();

    assert_eq!(value["draw"], 4);
    assert_eq!(value["recordsTotal"], 3);
    assert_eq!(value["recordsFiltered"], 2);
    assert_eq!(value["data"][0]["name"], "Jane Doe");
    assert_eq!(value["data"][1]["name"], "Jana");
    assert!(value.get("error").is_none());
}

/// Debug configuration adds the rendered queries and the request echo.
#[test]
fn test_query_debug_output() {
    let dir = TempDir::new().unwrap();
    let collection = load_collection(&customers(&dir)).unwrap();

    let request = json!({"draw": 1, "columns": [{"data": "country"}], "length": 2});
    let value =
        query_response(SearchConfig::default().with_debug(true), &collection, &request).to_value();

    assert_eq!(value["data"].as_array().unwrap().len(), 2);
    assert_eq!(value["input"]["length"], 2);
    assert_eq!(value["queries"][0]["collection"], "customers");
}

/// Explain renders the plan and counts without rows.
#[test]
fn test_explain_from_files() {
    let dir = TempDir::new().unwrap();
    let collection = load_collection(&customers(&dir)).unwrap();

    let request = json!({
        "columns": [{"data": "country", "search": {"value": "it"}}],
        "start": 0,
        "length": 5
    });
    let plan = explain_plan(SearchConfig::default(), &collection, &request).unwrap();

    assert_eq!(plan["recordsTotal"], 3);
    assert_eq!(plan["recordsFiltered"], 1);
    assert_eq!(
        plan["query"]["filter"],
        json!({"country": {"$regex": ".*it.*", "$options": "i"}})
    );
    assert_eq!(plan["query"]["skip"], 0);
    assert_eq!(plan["query"]["limit"], 5);
    assert!(plan.get("data").is_none());
}
