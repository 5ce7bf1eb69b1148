//! Paging
//!
//! Always the last planning step, after filtering and ordering.
//!
//! - A length of zero or less means the default page of 10, never "all"
//! - Default: `skip(start)` then `limit(length)`
//! - With a limit callback: `limit(length)` only, then the callback owns
//!   the rest (cursor-style paging, for instance). No skip is applied.

use std::sync::Arc;

use crate::errors::TableResult;
use crate::query::QueryBuilder;
use crate::request::TabularRequest;

/// Page size used when the request asks for none
pub const DEFAULT_PAGE_LENGTH: u64 = 10;

/// Custom limiting strategy, invoked with the limited query
pub type LimitCallback = Arc<dyn Fn(&mut QueryBuilder) -> TableResult<()> + Send + Sync>;

/// Applies paging directives to a query
pub struct Pager;

impl Pager {
    /// Effective page size for a requested length
    pub fn effective_limit(length: i64) -> u64 {
        if length > 0 {
            length as u64
        } else {
            DEFAULT_PAGE_LENGTH
        }
    }

    /// Applies paging for `request` to `query`
    pub fn apply(
        request: &TabularRequest,
        query: &mut QueryBuilder,
        limiter: Option<&LimitCallback>,
    ) -> TableResult<()> {
        let limit = Self::effective_limit(request.length);

        match limiter {
            Some(callback) => {
                query.limit(limit);
                callback(query)
            }
            None => {
                query.skip(request.start()).limit(limit);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TableError;
    use crate::query::Comparison;
    use serde_json::json;

    fn request(start: i64, length: i64) -> TabularRequest {
        TabularRequest::new(vec![]).with_page(start, length)
    }

    #[test]
    fn test_default_limit() {
        assert_eq!(Pager::effective_limit(0), 10);
        assert_eq!(Pager::effective_limit(-1), 10);
        assert_eq!(Pager::effective_limit(25), 25);
    }

    #[test]
    fn test_skip_and_limit() {
        let mut query = QueryBuilder::new("users");
        Pager::apply(&request(40, 20), &mut query, None).unwrap();
        assert_eq!(query.skip_value(), Some(40));
        assert_eq!(query.limit_value(), Some(20));
    }

    #[test]
    fn test_zero_length_uses_default() {
        let mut query = QueryBuilder::new("users");
        Pager::apply(&request(0, 0), &mut query, None).unwrap();
        assert_eq!(query.limit_value(), Some(10));
    }

    #[test]
    fn test_limiter_owns_paging() {
        let limiter: LimitCallback = Arc::new(|q: &mut QueryBuilder| {
            q.where_cmp("_id", Comparison::Gt, json!(100));
            Ok(())
        });

        let mut query = QueryBuilder::new("users");
        Pager::apply(&request(30, 5), &mut query, Some(&limiter)).unwrap();

        assert_eq!(query.skip_value(), None);
        assert_eq!(query.limit_value(), Some(5));
        assert!(query.has_filters());
    }

    #[test]
    fn test_limiter_error_propagates() {
        let limiter: LimitCallback =
            Arc::new(|_: &mut QueryBuilder| Err(TableError::callback("limit", "cursor expired")));

        let mut query = QueryBuilder::new("users");
        let err = Pager::apply(&request(0, 5), &mut query, Some(&limiter)).unwrap_err();
        assert_eq!(err.code(), "TABLE_CALLBACK_FAILED");
    }
}
