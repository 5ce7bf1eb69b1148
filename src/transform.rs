//! Result transformation
//!
//! Maps fetched documents into output rows, once per draw, after the fetch.
//!
//! [`DocumentMapper`] supports:
//! - object rows (documents keyed by field) or positional array rows
//! - removing columns from the output
//! - editing columns with a closure evaluated against the fetched row
//! - a 1-based `DT_RowIndex` counted from the request's `start`

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::errors::TableResult;
use crate::query::lookup;
use crate::request::TabularRequest;

/// Key of the row index column
pub const ROW_INDEX_COLUMN: &str = "DT_RowIndex";

/// Maps the full fetched row set into output rows
pub trait RowMapper {
    /// `start` is the absolute offset of the first row
    fn map_rows(&self, rows: Vec<Value>, start: u64) -> TableResult<Vec<Value>>;
}

/// Produces a column value from the fetched row
pub type EditCallback = Arc<dyn Fn(&Value) -> TableResult<Value> + Send + Sync>;

/// Default row mapper
#[derive(Clone, Default)]
pub struct DocumentMapper {
    /// Field of each output position, in column order (array rows)
    columns: Vec<Option<String>>,
    array_rows: bool,
    removed: Vec<String>,
    edits: Vec<(String, EditCallback)>,
    row_index: bool,
}

impl fmt::Debug for DocumentMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let edited: Vec<&str> = self.edits.iter().map(|(c, _)| c.as_str()).collect();
        f.debug_struct("DocumentMapper")
            .field("columns", &self.columns)
            .field("array_rows", &self.array_rows)
            .field("removed", &self.removed)
            .field("edited", &edited)
            .field("row_index", &self.row_index)
            .finish()
    }
}

impl DocumentMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapper over the columns of `request`
    pub fn for_request(request: &TabularRequest) -> Self {
        Self {
            columns: request
                .columns
                .iter()
                .map(|c| c.resolved_name().map(str::to_string))
                .collect(),
            ..Self::default()
        }
    }

    /// Emit rows as arrays of column values instead of objects
    pub fn array_rows(mut self, enabled: bool) -> Self {
        self.array_rows = enabled;
        self
    }

    pub fn remove_column(mut self, column: impl Into<String>) -> Self {
        self.removed.push(column.into());
        self
    }

    /// Replace (or add) `column` with the callback's result.
    ///
    /// Edits run in registration order, each against the row as fetched.
    pub fn edit_column<F>(mut self, column: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&Value) -> TableResult<Value> + Send + Sync + 'static,
    {
        self.edits.push((column.into(), Arc::new(callback)));
        self
    }

    /// Add `DT_RowIndex` to object rows
    pub fn add_index_column(mut self) -> Self {
        self.row_index = true;
        self
    }

    fn map_row(&self, row: Value, index: u64) -> TableResult<Value> {
        let mut row = match row {
            Value::Object(mut map) => {
                let original = Value::Object(map.clone());
                for (column, callback) in &self.edits {
                    map.insert(column.clone(), callback(&original)?);
                }
                for column in &self.removed {
                    map.remove(column);
                }
                Value::Object(map)
            }
            other => other,
        };

        if self.array_rows {
            let values = self
                .columns
                .iter()
                .filter(|c| match c {
                    Some(name) => !self.removed.contains(name),
                    None => true,
                })
                .map(|c| {
                    c.as_deref()
                        .and_then(|name| lookup(&row, name))
                        .cloned()
                        .unwrap_or(Value::Null)
                })
                .collect();
            return Ok(Value::Array(values));
        }

        if self.row_index {
            if let Value::Object(map) = &mut row {
                map.insert(ROW_INDEX_COLUMN.to_string(), Value::from(index));
            }
        }
        Ok(row)
    }
}

impl RowMapper for DocumentMapper {
    fn map_rows(&self, rows: Vec<Value>, start: u64) -> TableResult<Vec<Value>> {
        rows.into_iter()
            .enumerate()
            .map(|(i, row)| self.map_row(row, start + i as u64 + 1))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TableError;
    use crate::request::ColumnSpec;
    use serde_json::json;

    fn rows() -> Vec<Value> {
        vec![
            json!({"name": "Jane", "password": "x", "address": {"city": "Oslo"}}),
            json!({"name": "John", "password": "y", "address": {"city": "Rome"}}),
        ]
    }

    #[test]
    fn test_object_rows_pass_through() {
        let mapped = DocumentMapper::new().map_rows(rows(), 0).unwrap();
        assert_eq!(mapped, rows());
    }

    #[test]
    fn test_remove_and_edit() {
        let mapper = DocumentMapper::new()
            .remove_column("password")
            .edit_column("name", |row| {
                Ok(json!(row["name"].as_str().unwrap_or("").to_uppercase()))
            });

        let mapped = mapper.map_rows(rows(), 0).unwrap();
        assert_eq!(mapped[0]["name"], "JANE");
        assert!(mapped[0].get("password").is_none());
        assert_eq!(mapped[1]["address"]["city"], "Rome");
    }

    #[test]
    fn test_edit_sees_fetched_row() {
        let mapper = DocumentMapper::new()
            .remove_column("password")
            .edit_column("has_password", |row| Ok(json!(row.get("password").is_some())));

        let mapped = mapper.map_rows(rows(), 0).unwrap();
        assert_eq!(mapped[0]["has_password"], true);
        assert!(mapped[0].get("password").is_none());
    }

    #[test]
    fn test_row_index_counts_from_start() {
        let mapped = DocumentMapper::new()
            .add_index_column()
            .map_rows(rows(), 20)
            .unwrap();
        assert_eq!(mapped[0][ROW_INDEX_COLUMN], 21);
        assert_eq!(mapped[1][ROW_INDEX_COLUMN], 22);
    }

    #[test]
    fn test_array_rows_follow_column_order() {
        let request = TabularRequest::new(vec![
            ColumnSpec::new("address.city"),
            ColumnSpec::new("name"),
            ColumnSpec::new("0"),
        ]);
        let mapped = DocumentMapper::for_request(&request)
            .array_rows(true)
            .map_rows(rows(), 0)
            .unwrap();

        assert_eq!(mapped[0], json!(["Oslo", "Jane", null]));
        assert_eq!(mapped[1], json!(["Rome", "John", null]));
    }

    #[test]
    fn test_array_rows_skip_removed_columns() {
        let request = TabularRequest::new(vec![ColumnSpec::new("name"), ColumnSpec::new("password")]);
        let mapped = DocumentMapper::for_request(&request)
            .array_rows(true)
            .remove_column("password")
            .map_rows(rows(), 0)
            .unwrap();
        assert_eq!(mapped[0], json!(["Jane"]));
    }

    #[test]
    fn test_edit_error_propagates() {
        let mapper = DocumentMapper::new()
            .edit_column("name", |_| Err(TableError::callback("name", "formatter failed")));
        let err = mapper.map_rows(rows(), 0).unwrap_err();
        assert_eq!(err.code(), "TABLE_CALLBACK_FAILED");
    }
}
