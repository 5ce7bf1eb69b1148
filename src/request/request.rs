//! Tabular request types
//!
//! Decodes the DataTables request shape into an immutable request value.
//! Booleans and integers are accepted either as JSON scalars or as strings,
//! since form-encoded clients send everything as text.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{TableError, TableResult};
use crate::query::SortDirection;

/// A search keyword with its regex-mode flag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchValue {
    pub value: String,
    pub regex: bool,
}

impl SearchValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            regex: false,
        }
    }

    pub fn regex(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            regex: true,
        }
    }

    /// Returns the trimmed keyword, or None if it is empty
    pub fn keyword(&self) -> Option<&str> {
        let trimmed = self.value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }

    /// Keyword as used for searching: verbatim in regex mode, trimmed
    /// otherwise. None if it is blank.
    pub fn pattern(&self) -> Option<&str> {
        let trimmed = self.keyword()?;
        if self.regex {
            Some(self.value.as_str())
        } else {
            Some(trimmed)
        }
    }
}

/// A column descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    /// Data source of the column (field path), if any
    pub data: Option<String>,
    /// Explicit column name, overrides `data` when non-empty
    pub name: Option<String>,
    pub searchable: bool,
    pub orderable: bool,
    /// Per-column search keyword
    pub search: SearchValue,
}

impl ColumnSpec {
    /// Creates a searchable, orderable column reading from `data`
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            name: None,
            searchable: true,
            orderable: true,
            search: SearchValue::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    pub fn orderable(mut self, orderable: bool) -> Self {
        self.orderable = orderable;
        self
    }

    pub fn with_search(mut self, search: SearchValue) -> Self {
        self.search = search;
        self
    }

    /// Resolves the store field name of this column.
    ///
    /// `name` wins when non-empty; otherwise `data`, unless it is a bare
    /// positional index (array-mode clients send `"0"`, `"1"`, ...).
    pub fn resolved_name(&self) -> Option<&str> {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return Some(name);
        }
        self.data
            .as_deref()
            .filter(|d| !d.is_empty() && !d.chars().all(|c| c.is_ascii_digit()))
    }
}

/// A requested ordering on a column index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub column: usize,
    pub direction: SortDirection,
}

impl OrderRequest {
    pub fn new(column: usize, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    pub fn asc(column: usize) -> Self {
        Self::new(column, SortDirection::Asc)
    }

    pub fn desc(column: usize) -> Self {
        Self::new(column, SortDirection::Desc)
    }
}

/// A complete table request. Never mutated once handed to a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabularRequest {
    /// Client draw counter, echoed back in the response
    pub draw: u64,
    pub columns: Vec<ColumnSpec>,
    pub order: Vec<OrderRequest>,
    pub start: i64,
    pub length: i64,
    /// Global search keyword
    pub search: SearchValue,
}

impl TabularRequest {
    /// Creates a request over the given columns with default paging
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self {
            draw: 0,
            columns,
            order: Vec::new(),
            start: 0,
            length: 10,
            search: SearchValue::default(),
        }
    }

    /// Decodes a request from JSON text
    pub fn from_json(content: &str) -> TableResult<Self> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(&value)
    }

    /// Decodes a request from a parsed JSON value
    pub fn from_value(value: &Value) -> TableResult<Self> {
        let raw: RawRequest = serde_json::from_value(value.clone())?;
        raw.into_request()
    }

    pub fn with_draw(mut self, draw: u64) -> Self {
        self.draw = draw;
        self
    }

    pub fn with_search(mut self, search: SearchValue) -> Self {
        self.search = search;
        self
    }

    pub fn with_order(mut self, order: OrderRequest) -> Self {
        self.order.push(order);
        self
    }

    pub fn with_page(mut self, start: i64, length: i64) -> Self {
        self.start = start;
        self.length = length;
        self
    }

    /// Resolved field name of the column at `index`
    pub fn column_name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).and_then(ColumnSpec::resolved_name)
    }

    /// Trimmed global keyword, if a global search was requested
    pub fn global_keyword(&self) -> Option<&str> {
        self.search.keyword()
    }

    /// Indexes of all columns flagged searchable
    pub fn searchable_column_indexes(&self) -> impl Iterator<Item = usize> + '_ {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.searchable)
            .map(|(i, _)| i)
    }

    /// Per-column keyword of the column at `index`, if non-blank.
    ///
    /// Regex keywords are returned untrimmed.
    pub fn column_keyword(&self, index: usize) -> Option<&str> {
        self.columns.get(index).and_then(|c| c.search.pattern())
    }

    /// True if the column is searchable and carries a per-column keyword
    pub fn is_column_searchable(&self, index: usize) -> bool {
        self.columns
            .get(index)
            .map(|c| c.searchable && c.search.keyword().is_some())
            .unwrap_or(false)
    }

    /// True if the column's keyword is a raw regex
    pub fn is_regex(&self, index: usize) -> bool {
        self.columns
            .get(index)
            .map(|c| c.search.regex)
            .unwrap_or(false)
    }

    /// Order entries whose column exists and is orderable, in request order
    pub fn orderable_orders(&self) -> impl Iterator<Item = &OrderRequest> + '_ {
        self.order.iter().filter(|o| {
            self.columns
                .get(o.column)
                .map(|c| c.orderable)
                .unwrap_or(false)
        })
    }

    /// Offset of the first row, never negative
    pub fn start(&self) -> u64 {
        self.start.max(0) as u64
    }
}

// =============================================================================
// Wire decoding
// =============================================================================

#[derive(Debug, Deserialize)]
struct RawSearch {
    #[serde(default)]
    value: Value,
    #[serde(default)]
    regex: Value,
}

#[derive(Debug, Deserialize)]
struct RawColumn {
    #[serde(default)]
    data: Value,
    #[serde(default)]
    name: Value,
    #[serde(default)]
    searchable: Value,
    #[serde(default)]
    orderable: Value,
    #[serde(default)]
    search: Option<RawSearch>,
}

#[derive(Debug, Deserialize)]
struct RawOrder {
    column: Value,
    #[serde(default)]
    dir: Value,
}

#[derive(Debug, Deserialize)]
struct RawRequest {
    #[serde(default)]
    draw: Value,
    #[serde(default)]
    columns: Vec<RawColumn>,
    #[serde(default)]
    order: Vec<RawOrder>,
    #[serde(default)]
    start: Value,
    #[serde(default)]
    length: Value,
    #[serde(default)]
    search: Option<RawSearch>,
}

impl RawRequest {
    fn into_request(self) -> TableResult<TabularRequest> {
        let columns = self
            .columns
            .into_iter()
            .map(RawColumn::into_column)
            .collect::<TableResult<Vec<_>>>()?;

        let order = self
            .order
            .into_iter()
            .map(|o| {
                let column = lenient_int(&o.column, "order.column")?;
                if column < 0 {
                    return Err(TableError::InvalidRequest(format!(
                        "order.column must not be negative: {}",
                        column
                    )));
                }
                let direction = SortDirection::parse_lossy(o.dir.as_str().unwrap_or("asc"));
                Ok(OrderRequest::new(column as usize, direction))
            })
            .collect::<TableResult<Vec<_>>>()?;

        Ok(TabularRequest {
            draw: lenient_int_or(&self.draw, "draw", 0)?.max(0) as u64,
            columns,
            order,
            start: lenient_int_or(&self.start, "start", 0)?,
            length: lenient_int_or(&self.length, "length", 10)?,
            search: self.search.map(RawSearch::into_search).unwrap_or_default(),
        })
    }
}

impl RawColumn {
    fn into_column(self) -> TableResult<ColumnSpec> {
        Ok(ColumnSpec {
            data: lenient_string(&self.data),
            name: lenient_string(&self.name),
            searchable: lenient_bool(&self.searchable, true),
            orderable: lenient_bool(&self.orderable, true),
            search: self.search.map(RawSearch::into_search).unwrap_or_default(),
        })
    }
}

impl RawSearch {
    fn into_search(self) -> SearchValue {
        SearchValue {
            value: lenient_string(&self.value).unwrap_or_default(),
            regex: lenient_bool(&self.regex, false),
        }
    }
}

fn lenient_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_bool(value: &Value, default: bool) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => match s.as_str() {
            "true" | "1" => true,
            "false" | "0" => false,
            _ => default,
        },
        Value::Number(n) => n.as_i64().map(|i| i != 0).unwrap_or(default),
        _ => default,
    }
}

fn lenient_int(value: &Value, field: &str) -> TableResult<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| TableError::InvalidRequest(format!("{} is not an integer", field))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| TableError::InvalidRequest(format!("{} is not an integer: {}", field, s))),
        _ => Err(TableError::InvalidRequest(format!("{} is required", field))),
    }
}

fn lenient_int_or(value: &Value, field: &str, default: i64) -> TableResult<i64> {
    match value {
        Value::Null => Ok(default),
        Value::String(s) if s.trim().is_empty() => Ok(default),
        _ => lenient_int(value, field),
    }
}
