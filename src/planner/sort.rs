//! Sort planning
//!
//! Converts requested (column index, direction) pairs into sort state on
//! the query, in request order:
//! - unresolvable columns are dropped and logged
//! - blacklisted columns without an order rule are dropped
//! - columns with an order rule delegate to the rule's callback
//! - everything else becomes a plain field sort

use crate::errors::{TableError, TableResult};
use crate::observability::{log_event, Event};
use crate::query::{QueryBuilder, SortSpec};
use crate::request::OrderRequest;
use crate::rules::ColumnRules;

/// Plans ordering for one table
pub struct SortPlanner<'a> {
    rules: &'a ColumnRules,
}

impl<'a> SortPlanner<'a> {
    pub fn new(rules: &'a ColumnRules) -> Self {
        Self { rules }
    }

    /// Applies the requested orderings to `query` and returns its resulting
    /// sort specification.
    ///
    /// `resolve` maps a column index to its store field name.
    pub fn plan<'r, I, F>(
        &self,
        orders: I,
        resolve: F,
        query: &mut QueryBuilder,
    ) -> TableResult<Vec<SortSpec>>
    where
        I: IntoIterator<Item = &'r OrderRequest>,
        F: Fn(usize) -> Option<String>,
    {
        for order in orders {
            let column = match resolve(order.column) {
                Some(column) => column,
                None => {
                    let err = TableError::Configuration {
                        index: order.column,
                    };
                    let index = order.column.to_string();
                    log_event(
                        Event::ColumnUnresolved,
                        &[("code", err.code()), ("index", &index), ("stage", "order")],
                    );
                    continue;
                }
            };

            if self.rules.skips_order(&column) {
                continue;
            }

            if !self.rules.apply_order(&column, query, order.direction)? {
                query.order_by(column, order.direction);
            }
        }

        Ok(query.sorts().to_vec())
    }
}
