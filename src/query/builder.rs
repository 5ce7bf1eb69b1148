//! Query builder
//!
//! Accumulates filter, sort and paging state for one collection. The builder
//! is a plain value: stages take it by `&mut`, and `clone()` is the explicit
//! snapshot used for counting.

use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use crate::errors::TableResult;
use crate::search::SearchPattern;

use super::filter::{Boolean, Comparison, Filter, FilterGroup};
use super::store::DocumentStore;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// `"asc"` in any case is ascending; anything else is descending
    pub fn parse_lossy(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("asc") {
            SortDirection::Asc
        } else {
            SortDirection::Desc
        }
    }

    /// Store-native direction (1 / -1)
    pub fn as_store_value(&self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

impl Serialize for SortDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Sort specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    /// Field to sort by
    pub field: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

/// Builder for a single collection query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    collection: String,
    filter: FilterGroup,
    sorts: Vec<SortSpec>,
    skip: Option<u64>,
    limit: Option<u64>,
}

impl QueryBuilder {
    /// Creates an empty query on `collection`
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filter: FilterGroup::new(),
            sorts: Vec::new(),
            skip: None,
            limit: None,
        }
    }

    /// Creates an empty query on the same collection
    pub fn new_query(&self) -> Self {
        Self::new(self.collection.clone())
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    // =========================================================================
    // Filters
    // =========================================================================

    /// Appends a filter joined with the given connective
    pub fn push_filter(&mut self, boolean: Boolean, filter: Filter) -> &mut Self {
        self.filter.push(boolean, filter);
        self
    }

    pub fn where_regex(&mut self, field: impl Into<String>, pattern: SearchPattern) -> &mut Self {
        self.push_filter(
            Boolean::And,
            Filter::Regex {
                field: field.into(),
                pattern,
            },
        )
    }

    pub fn or_where_regex(
        &mut self,
        field: impl Into<String>,
        pattern: SearchPattern,
    ) -> &mut Self {
        self.push_filter(
            Boolean::Or,
            Filter::Regex {
                field: field.into(),
                pattern,
            },
        )
    }

    pub fn where_cmp(
        &mut self,
        field: impl Into<String>,
        op: Comparison,
        value: Value,
    ) -> &mut Self {
        self.push_filter(
            Boolean::And,
            Filter::Compare {
                field: field.into(),
                op,
                value,
            },
        )
    }

    pub fn or_where_cmp(
        &mut self,
        field: impl Into<String>,
        op: Comparison,
        value: Value,
    ) -> &mut Self {
        self.push_filter(
            Boolean::Or,
            Filter::Compare {
                field: field.into(),
                op,
                value,
            },
        )
    }

    pub fn where_eq(&mut self, field: impl Into<String>, value: Value) -> &mut Self {
        self.where_cmp(field, Comparison::Eq, value)
    }

    pub fn where_in(&mut self, field: impl Into<String>, values: Vec<Value>) -> &mut Self {
        self.push_filter(
            Boolean::And,
            Filter::In {
                field: field.into(),
                values,
            },
        )
    }

    pub fn where_exists(&mut self, field: impl Into<String>, exists: bool) -> &mut Self {
        self.push_filter(
            Boolean::And,
            Filter::Exists {
                field: field.into(),
                exists,
            },
        )
    }

    /// Merges another query's filters as one nested group.
    ///
    /// A query without filters adds nothing.
    pub fn add_nested_where(&mut self, nested: &QueryBuilder, boolean: Boolean) -> &mut Self {
        if !nested.filter.is_empty() {
            self.filter.push(boolean, Filter::Group(nested.filter.clone()));
        }
        self
    }

    /// Builds a nested group with a closure and merges it with AND
    pub fn where_group<F>(&mut self, build: F) -> TableResult<&mut Self>
    where
        F: FnOnce(&mut QueryBuilder) -> TableResult<()>,
    {
        self.nested_group(Boolean::And, build)
    }

    /// Builds a nested group with a closure and merges it with OR
    pub fn or_where_group<F>(&mut self, build: F) -> TableResult<&mut Self>
    where
        F: FnOnce(&mut QueryBuilder) -> TableResult<()>,
    {
        self.nested_group(Boolean::Or, build)
    }

    fn nested_group<F>(&mut self, boolean: Boolean, build: F) -> TableResult<&mut Self>
    where
        F: FnOnce(&mut QueryBuilder) -> TableResult<()>,
    {
        let mut nested = self.new_query();
        build(&mut nested)?;
        Ok(self.add_nested_where(&nested, boolean))
    }

    pub fn filter(&self) -> &FilterGroup {
        &self.filter
    }

    pub fn has_filters(&self) -> bool {
        !self.filter.is_empty()
    }

    // =========================================================================
    // Sort and paging
    // =========================================================================

    pub fn order_by(&mut self, field: impl Into<String>, direction: SortDirection) -> &mut Self {
        self.sorts.push(SortSpec::new(field, direction));
        self
    }

    pub fn sorts(&self) -> &[SortSpec] {
        &self.sorts
    }

    pub fn skip(&mut self, n: u64) -> &mut Self {
        self.skip = Some(n);
        self
    }

    pub fn limit(&mut self, n: u64) -> &mut Self {
        self.limit = Some(n);
        self
    }

    pub fn skip_value(&self) -> Option<u64> {
        self.skip
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Fetches matching rows from the store
    pub fn get<S: DocumentStore + ?Sized>(&self, store: &S) -> TableResult<Vec<Value>> {
        store.fetch(self)
    }

    /// Counts matching rows on a snapshot of this query
    pub fn count<S: DocumentStore + ?Sized>(&self, store: &S) -> TableResult<u64> {
        let snapshot = self.clone();
        store.count(&snapshot)
    }

    /// Store-native rendering of the whole query
    pub fn to_document(&self) -> Value {
        // One object per key: sort precedence is positional
        let sort: Vec<Value> = self
            .sorts
            .iter()
            .map(|spec| json!({ spec.field.as_str(): spec.direction.as_store_value() }))
            .collect();
        json!({
            "collection": self.collection,
            "filter": self.filter.to_document(),
            "sort": sort,
            "skip": self.skip,
            "limit": self.limit,
        })
    }
}
