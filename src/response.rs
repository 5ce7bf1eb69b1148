//! Table response envelope
//!
//! Serialized as the DataTables wire object:
//! `{draw, recordsTotal, recordsFiltered, data, error?, queries?, input?, ...payload}`.
//! A failed run produces zero counts, no rows and an `error` message.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::TableError;

/// Response for one table draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableResponse {
    pub draw: u64,
    pub records_total: u64,
    pub records_filtered: u64,
    pub data: Vec<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Rendered store queries (debug mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queries: Option<Vec<Value>>,

    /// Echo of the decoded request (debug mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,

    /// Extra top-level fields
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl TableResponse {
    /// Create a success response
    pub fn success(draw: u64, records_total: u64, records_filtered: u64, data: Vec<Value>) -> Self {
        Self {
            draw,
            records_total,
            records_filtered,
            data,
            error: None,
            queries: None,
            input: None,
            payload: Map::new(),
        }
    }

    /// Create an error response from a table error
    pub fn error(draw: u64, err: &TableError) -> Self {
        Self {
            error: Some(format!("{}: {}", err.code(), err)),
            ..Self::success(draw, 0, 0, Vec::new())
        }
    }

    pub fn with_payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload.extend(payload);
        self
    }

    pub fn with_debug(mut self, queries: Vec<Value>, input: Value) -> Self {
        self.queries = Some(queries);
        self.input = Some(input);
        self
    }

    /// Check if this is a success response
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).expect("TableResponse serialization cannot fail")
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("TableResponse serialization cannot fail")
    }
}
