//! Table Invariant Tests
//!
//! Tests for orchestrator invariants:
//! - Preparation runs once
//! - Filtered count is taken before paging
//! - Pager defaults
//! - Blacklist handling in search and ordering
//! - Custom order rules replace plain sorts
//! - Unsupported ordering calls leave the plan untouched
//! - Store failures become a single error response

use std::sync::Arc;
use std::thread;

use aerotables::errors::{TableError, TableResult};
use aerotables::query::{DocumentStore, MemoryCollection, QueryBuilder, SortDirection, SortSpec};
use aerotables::request::{ColumnSpec, OrderRequest, SearchValue, TabularRequest};
use aerotables::rules::ColumnRules;
use aerotables::table::DataTable;
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

/// 150 orders, 100 of them "open"
fn orders() -> MemoryCollection {
    MemoryCollection::with_documents(
        "orders",
        (0..150)
            .map(|i| {
                json!({
                    "_id": i,
                    "status": if i < 100 { "open" } else { "closed" },
                    "total": (i * 7) % 50,
                })
            })
            .collect(),
    )
}

fn columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("_id"),
        ColumnSpec::new("status"),
        ColumnSpec::new("total"),
    ]
}

fn ids(rows: &[Value]) -> Vec<i64> {
    rows.iter().filter_map(|r| r["_id"].as_i64()).collect()
}

/// Store whose every call fails
struct UnreachableStore;

impl DocumentStore for UnreachableStore {
    fn count(&self, _query: &QueryBuilder) -> TableResult<u64> {
        Err(TableError::store("connection refused"))
    }

    fn fetch(&self, _query: &QueryBuilder) -> TableResult<Vec<Value>> {
        Err(TableError::store("connection refused"))
    }
}

/// Store that counts fine but fails on fetch
struct FailingFetch(MemoryCollection);

impl DocumentStore for FailingFetch {
    fn count(&self, query: &QueryBuilder) -> TableResult<u64> {
        self.0.count(query)
    }

    fn fetch(&self, _query: &QueryBuilder) -> TableResult<Vec<Value>> {
        Err(TableError::store("cursor killed"))
    }
}

// =============================================================================
// Preparation
// =============================================================================

/// Preparing twice applies skip/limit once and returns the same rows.
#[test]
fn test_prepare_twice_same_plan() {
    let store = orders();
    let request = TabularRequest::new(columns())
        .with_search(SearchValue::new("open"))
        .with_order(OrderRequest::desc(0))
        .with_page(10, 5);

    let mut once = DataTable::of(&store, request.clone());
    let once_rows = once.execute().unwrap();

    let mut twice = DataTable::of(&store, request);
    twice.prepare_query().unwrap();
    twice.prepare_query().unwrap();
    let twice_rows = twice.execute().unwrap();

    assert_eq!(once.query(), twice.query());
    assert_eq!(once_rows, twice_rows);
    assert_eq!(twice.query().skip_value(), Some(10));
    assert_eq!(ids(&twice_rows.rows), vec![89, 88, 87, 86, 85]);
}

// =============================================================================
// Counts and Paging
// =============================================================================

/// 100 matching rows, page of 10: filtered count is 100, 10 rows fetched.
#[test]
fn test_filtered_count_before_paging() {
    let store = orders();
    let mut request = TabularRequest::new(columns()).with_page(0, 10);
    request.columns[1].search = SearchValue::new("open");

    let result = DataTable::of(&store, request).execute().unwrap();

    assert_eq!(result.total_records, 150);
    assert_eq!(result.filtered_records, 100);
    assert_eq!(result.rows.len(), 10);
}

/// Zero and negative lengths page by 10; explicit lengths are honored.
#[test]
fn test_pager_default_length() {
    let store = orders();

    for (length, expected) in [(0, 10), (-1, 10), (25, 25)] {
        let request = TabularRequest::new(columns()).with_page(0, length);
        let mut table = DataTable::of(&store, request);
        let result = table.execute().unwrap();

        assert_eq!(table.query().limit_value(), Some(expected));
        assert_eq!(result.rows.len() as u64, expected);
    }
}

/// Negative start is treated as the first row.
#[test]
fn test_negative_start() {
    let store = orders();
    let request = TabularRequest::new(columns()).with_page(-5, 3);

    let mut table = DataTable::of(&store, request);
    let result = table.execute().unwrap();
    assert_eq!(table.query().skip_value(), Some(0));
    assert_eq!(ids(&result.rows), vec![0, 1, 2]);
}

/// Cursor-style limiting: the callback owns the offset.
#[test]
fn test_cursor_limit() {
    let store = orders();
    let request = TabularRequest::new(columns()).with_page(40, 3);

    let result = DataTable::of(&store, request)
        .limit(|q| {
            q.where_cmp("_id", aerotables::query::Comparison::Gte, json!(120));
            Ok(())
        })
        .execute()
        .unwrap();

    assert_eq!(ids(&result.rows), vec![120, 121, 122]);
    assert_eq!(result.filtered_records, 150);
}

// =============================================================================
// Blacklist and Rules
// =============================================================================

/// Blacklisted column is neither searched nor ordered by default.
#[test]
fn test_blacklisted_column_excluded_from_search_and_order() {
    let store = orders();
    let request = TabularRequest::new(columns())
        .with_search(SearchValue::new("closed"))
        .with_order(OrderRequest::desc(1))
        .with_order(OrderRequest::asc(0));

    let mut table = DataTable::of(&store, request).blacklist(["status"]);
    let result = table.execute().unwrap();

    assert!(result.rows.is_empty());
    assert_eq!(table.query().sorts(), &[SortSpec::asc("_id")]);
}

/// The same blacklisted column with a filter rule is still searched.
#[test]
fn test_blacklisted_column_with_filter_rule_searched() {
    let store = orders();
    let request = TabularRequest::new(columns()).with_search(SearchValue::new("closed"));

    let result = DataTable::of(&store, request)
        .blacklist(["status"])
        .filter_column("status", |q, keyword| {
            q.where_eq("status", json!(keyword));
            Ok(())
        })
        .execute()
        .unwrap();

    assert_eq!(result.filtered_records, 50);
}

/// An order rule on "score" sorts by "score_rank" and never by "score".
#[test]
fn test_custom_order_rule_scenario() {
    let store = MemoryCollection::with_documents(
        "players",
        vec![
            json!({"name": "a", "score": 10, "score_rank": 3}),
            json!({"name": "b", "score": 30, "score_rank": 1}),
            json!({"name": "c", "score": 20, "score_rank": 2}),
        ],
    );
    let request = TabularRequest::new(vec![ColumnSpec::new("name"), ColumnSpec::new("score")])
        .with_order(OrderRequest::asc(1));

    let mut table = DataTable::of(&store, request).order_column_with("score", |q, _dir| {
        q.order_by("score_rank", SortDirection::Desc);
        Ok(())
    });
    let result = table.execute().unwrap();

    assert_eq!(table.query().sorts(), &[SortSpec::desc("score_rank")]);
    let names: Vec<&str> = result.rows.iter().filter_map(|r| r["name"].as_str()).collect();
    assert_eq!(names, vec!["a", "c", "b"]);
}

/// One rule registry shared by tables on several threads.
#[test]
fn test_shared_rules_across_threads() {
    let mut rules = ColumnRules::with_default_blacklist();
    rules.filter_column("total", |q, keyword| {
        let total: i64 = keyword
            .parse()
            .map_err(|_| TableError::callback("total", "not a number"))?;
        q.where_eq("total", json!(total));
        Ok(())
    });
    let rules = Arc::new(rules);
    let store = Arc::new(orders());

    let handles: Vec<_> = (0..4)
        .map(|n| {
            let rules = Arc::clone(&rules);
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let mut request = TabularRequest::new(columns());
                request.columns[2].search = SearchValue::new((n * 7).to_string());
                DataTable::of(&store, request)
                    .with_rules(rules)
                    .skip_paging()
                    .execute()
                    .map(|r| r.filtered_records)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 3);
    }
}

// =============================================================================
// Unsupported Ordering
// =============================================================================

/// Expression and NULLS LAST ordering are accepted and change nothing.
#[test]
fn test_unsupported_ordering_noop() {
    let store = orders();
    let request = TabularRequest::new(columns()).with_order(OrderRequest::desc(2));

    let mut plain = DataTable::of(&store, request.clone());
    let plain_rows = plain.execute().unwrap();

    let mut table = DataTable::of(&store, request)
        .order_by_nulls_last()
        .order_column("total", "total IS NULL, total")
        .order_columns(["status", "total"], "? DESC");
    let rows = table.execute().unwrap();

    assert_eq!(table.query(), plain.query());
    assert_eq!(rows, plain_rows);
}

// =============================================================================
// Failure Boundary
// =============================================================================

/// A failing store yields one error response, never a partial one.
#[test]
fn test_store_failure_error_response() {
    let request = TabularRequest::new(columns()).with_draw(12);
    let response = DataTable::new(UnreachableStore, QueryBuilder::new("orders"), request).run(true);

    assert!(!response.is_success());
    assert_eq!(response.draw, 12);
    assert_eq!(response.records_total, 0);
    assert_eq!(response.records_filtered, 0);
    assert!(response.data.is_empty());
    assert!(response
        .error
        .unwrap()
        .contains("TABLE_STORE_EXECUTION_FAILED"));
}

/// Counts already taken are not reported when the fetch fails.
#[test]
fn test_fetch_failure_discards_counts() {
    let request = TabularRequest::new(columns()).with_draw(2);
    let store = FailingFetch(orders());

    let response = DataTable::new(&store, QueryBuilder::new("orders"), request).run(true);

    assert!(!response.is_success());
    assert_eq!(response.records_total, 0);
    assert!(response.error.unwrap().contains("cursor killed"));
}

/// Callback failures surface through the same boundary.
#[test]
fn test_callback_failure_error_response() {
    let store = orders();
    let mut request = TabularRequest::new(columns());
    request.columns[2].search = SearchValue::new("lots");

    let response = DataTable::of(&store, request)
        .filter_column("total", |_, keyword| {
            Err(TableError::callback("total", format!("'{}' is not a number", keyword)))
        })
        .run(true);

    assert!(!response.is_success());
    assert!(response.error.unwrap().contains("TABLE_CALLBACK_FAILED"));
}
