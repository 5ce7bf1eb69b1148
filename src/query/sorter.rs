//! Document sorting for in-memory execution
//!
//! Multi-key, stable, deterministic.

use std::cmp::Ordering;

use serde_json::Value;

use super::builder::{SortDirection, SortSpec};
use super::filter::lookup;

/// Sorts documents by a list of sort specifications
pub struct DocumentSorter;

impl DocumentSorter {
    /// Sorts documents in place. Earlier specs take precedence; full ties keep
    /// their original order.
    pub fn sort(documents: &mut [Value], specs: &[SortSpec]) {
        if specs.is_empty() {
            return;
        }
        documents.sort_by(|a, b| {
            for spec in specs {
                let ordering = Self::compare_values(lookup(a, &spec.field), lookup(b, &spec.field));
                let ordering = match spec.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }

    /// Compares two JSON values for sorting.
    ///
    /// Ordering rules:
    /// - missing < null < bool < number < string < array < object
    /// - For same types, natural ordering
    pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a_val), Some(b_val)) => {
                let type_order = |v: &Value| -> u8 {
                    match v {
                        Value::Null => 0,
                        Value::Bool(_) => 1,
                        Value::Number(_) => 2,
                        Value::String(_) => 3,
                        Value::Array(_) => 4,
                        Value::Object(_) => 5,
                    }
                };

                let a_type = type_order(a_val);
                let b_type = type_order(b_val);
                if a_type != b_type {
                    return a_type.cmp(&b_type);
                }

                match (a_val, b_val) {
                    (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
                    (Value::Number(x), Value::Number(y)) => {
                        if let (Some(xi), Some(yi)) = (x.as_i64(), y.as_i64()) {
                            return xi.cmp(&yi);
                        }
                        let xf = x.as_f64().unwrap_or(0.0);
                        let yf = y.as_f64().unwrap_or(0.0);
                        xf.partial_cmp(&yf).unwrap_or(Ordering::Equal)
                    }
                    (Value::String(x), Value::String(y)) => x.cmp(y),
                    (Value::Array(x), Value::Array(y)) => {
                        for (xv, yv) in x.iter().zip(y.iter()) {
                            let ord = Self::compare_values(Some(xv), Some(yv));
                            if ord != Ordering::Equal {
                                return ord;
                            }
                        }
                        x.len().cmp(&y.len())
                    }
                    _ => Ordering::Equal,
                }
            }
        }
    }
}
