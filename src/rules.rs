//! Column rule registry
//!
//! Per-column overrides consulted by search and ordering:
//! - a filter callback replaces the default regex search for the column
//! - an order callback replaces the default plain sort for the column
//! - a blacklisted column is skipped by default search and ordering
//!
//! A registered callback always wins over the blacklist.
//!
//! Rules are read-only once a table starts preparing. The registry is cheap
//! to clone, so one definition can be shared by many concurrent requests.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::TableResult;
use crate::query::{QueryBuilder, SortDirection};

/// Column names blacklisted by [`ColumnRules::with_default_blacklist`]
pub const DEFAULT_BLACKLIST: &[&str] = &["password", "remember_token"];

/// Custom search for a column: receives a fresh sub-query and the keyword
pub type FilterCallback = Arc<dyn Fn(&mut QueryBuilder, &str) -> TableResult<()> + Send + Sync>;

/// Custom ordering for a column: receives the live query and the direction
pub type OrderCallback =
    Arc<dyn Fn(&mut QueryBuilder, SortDirection) -> TableResult<()> + Send + Sync>;

/// Overrides registered for one column
#[derive(Clone, Default)]
pub struct ColumnRule {
    pub filter: Option<FilterCallback>,
    pub order: Option<OrderCallback>,
    pub blacklisted: bool,
}

impl fmt::Debug for ColumnRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnRule")
            .field("filter", &self.filter.is_some())
            .field("order", &self.order.is_some())
            .field("blacklisted", &self.blacklisted)
            .finish()
    }
}

/// Registry of column rules keyed by resolved column name
#[derive(Debug, Clone, Default)]
pub struct ColumnRules {
    rules: HashMap<String, ColumnRule>,
}

impl ColumnRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `password` and `remember_token` blacklisted
    pub fn with_default_blacklist() -> Self {
        let mut rules = Self::new();
        rules.blacklist(DEFAULT_BLACKLIST.iter().copied());
        rules
    }

    /// Registers a custom filter for `column`
    pub fn filter_column<F>(&mut self, column: impl Into<String>, callback: F) -> &mut Self
    where
        F: Fn(&mut QueryBuilder, &str) -> TableResult<()> + Send + Sync + 'static,
    {
        self.rules.entry(column.into()).or_default().filter = Some(Arc::new(callback));
        self
    }

    /// Registers a custom ordering for `column`
    pub fn order_column<F>(&mut self, column: impl Into<String>, callback: F) -> &mut Self
    where
        F: Fn(&mut QueryBuilder, SortDirection) -> TableResult<()> + Send + Sync + 'static,
    {
        self.rules.entry(column.into()).or_default().order = Some(Arc::new(callback));
        self
    }

    /// Blacklists the given columns
    pub fn blacklist<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for column in columns {
            self.rules.entry(column.into()).or_default().blacklisted = true;
        }
        self
    }

    pub fn get(&self, column: &str) -> Option<&ColumnRule> {
        self.rules.get(column)
    }

    pub fn has_filter(&self, column: &str) -> bool {
        self.get(column).map(|r| r.filter.is_some()).unwrap_or(false)
    }

    pub fn has_order(&self, column: &str) -> bool {
        self.get(column).map(|r| r.order.is_some()).unwrap_or(false)
    }

    pub fn is_blacklisted(&self, column: &str) -> bool {
        self.get(column).map(|r| r.blacklisted).unwrap_or(false)
    }

    /// Blacklisted with no filter override: skipped by search
    pub fn skips_search(&self, column: &str) -> bool {
        self.is_blacklisted(column) && !self.has_filter(column)
    }

    /// Blacklisted with no order override: skipped by ordering
    pub fn skips_order(&self, column: &str) -> bool {
        self.is_blacklisted(column) && !self.has_order(column)
    }

    /// Runs the filter callback of `column`, if any. Returns whether it ran.
    pub fn apply_filter(
        &self,
        column: &str,
        query: &mut QueryBuilder,
        keyword: &str,
    ) -> TableResult<bool> {
        match self.get(column).and_then(|r| r.filter.as_ref()) {
            Some(callback) => {
                callback(query, keyword)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Runs the order callback of `column`, if any. Returns whether it ran.
    pub fn apply_order(
        &self,
        column: &str,
        query: &mut QueryBuilder,
        direction: SortDirection,
    ) -> TableResult<bool> {
        match self.get(column).and_then(|r| r.order.as_ref()) {
            Some(callback) => {
                callback(query, direction)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TableError;
    use serde_json::json;

    #[test]
    fn test_blacklist_without_override_skips() {
        let mut rules = ColumnRules::new();
        rules.blacklist(["password"]);

        assert!(rules.is_blacklisted("password"));
        assert!(rules.skips_search("password"));
        assert!(rules.skips_order("password"));
        assert!(!rules.skips_search("name"));
    }

    #[test]
    fn test_callbacks_exempt_from_blacklist() {
        let mut rules = ColumnRules::new();
        rules
            .blacklist(["secret"])
            .filter_column("secret", |q, kw| {
                q.where_eq("secret_hash", json!(kw));
                Ok(())
            });

        assert!(!rules.skips_search("secret"));
        assert!(rules.skips_order("secret"));

        rules.order_column("secret", |q, dir| {
            q.order_by("secret_rank", dir);
            Ok(())
        });
        assert!(!rules.skips_order("secret"));
    }

    #[test]
    fn test_apply_filter_runs_callback() {
        let mut rules = ColumnRules::new();
        rules.filter_column("age", |q, kw| {
            let age: i64 = kw
                .parse()
                .map_err(|_| TableError::callback("age", "not a number"))?;
            q.where_eq("age", json!(age));
            Ok(())
        });

        let mut query = QueryBuilder::new("users");
        assert!(rules.apply_filter("age", &mut query, "30").unwrap());
        assert!(query.has_filters());

        assert!(!rules.apply_filter("name", &mut query, "x").unwrap());

        let err = rules.apply_filter("age", &mut query, "old").unwrap_err();
        assert_eq!(err.code(), "TABLE_CALLBACK_FAILED");
    }

    #[test]
    fn test_default_blacklist() {
        let rules = ColumnRules::with_default_blacklist();
        assert!(rules.is_blacklisted("password"));
        assert!(rules.is_blacklisted("remember_token"));
        assert!(!rules.is_blacklisted("email"));
    }

    #[test]
    fn test_shared_across_threads() {
        let mut rules = ColumnRules::new();
        rules.order_column("score", |q, dir| {
            q.order_by("score_rank", dir);
            Ok(())
        });
        let shared = Arc::new(rules);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let rules = Arc::clone(&shared);
                std::thread::spawn(move || {
                    let mut query = QueryBuilder::new("scores");
                    rules
                        .apply_order("score", &mut query, SortDirection::Asc)
                        .unwrap();
                    query.sorts().len()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
    }
}
