//! Table orchestrator
//!
//! Composes search, ordering and paging into one query plan per request,
//! runs it against a [`DocumentStore`] and builds the response.
//!
//! Preparation happens once. On the first `prepare_query` call:
//!
//! 1. total count on the unfiltered query
//! 2. global search, caller filter callback, per-column search
//! 3. filtered count on an unpaged snapshot
//! 4. ordering (order callback, sort planner or default order)
//! 5. paging
//!
//! Later calls are no-ops. All stages work on a copy of the query that
//! replaces the table's query only when every stage succeeded.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::SearchConfig;
use crate::errors::TableResult;
use crate::observability::{log_event, Event, ObservationScope};
use crate::planner::{Capability, LimitCallback, Pager, SortPlanner};
use crate::query::{DocumentStore, MemoryCollection, QueryBuilder, SortDirection, SortSpec};
use crate::request::TabularRequest;
use crate::response::TableResponse;
use crate::rules::ColumnRules;
use crate::search::PredicateBuilder;
use crate::transform::{DocumentMapper, RowMapper};

/// Caller hook receiving the live query
pub type QueryCallback = Arc<dyn Fn(&mut QueryBuilder) -> TableResult<()> + Send + Sync>;

/// Raw rows of one draw with their counts
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub rows: Vec<Value>,
    pub total_records: u64,
    pub filtered_records: u64,
}

/// Query orchestrator for one request
pub struct DataTable<S> {
    store: S,
    request: TabularRequest,
    config: SearchConfig,
    rules: Arc<ColumnRules>,
    query: QueryBuilder,
    prepared: bool,

    filter_callback: Option<QueryCallback>,
    auto_filter: bool,
    order_callback: Option<QueryCallback>,
    limit_callback: Option<LimitCallback>,
    default_order: Vec<SortSpec>,
    skip_paging: bool,

    skip_total_records: bool,
    total_records: Option<u64>,
    filtered_records: Option<u64>,

    mapper: DocumentMapper,
    payload: Map<String, Value>,
    query_log: Vec<Value>,
}

impl<'a> DataTable<&'a MemoryCollection> {
    /// Table over a whole in-memory collection
    pub fn of(collection: &'a MemoryCollection, request: TabularRequest) -> Self {
        Self::new(collection, collection.query(), request)
    }
}

impl<S: DocumentStore> DataTable<S> {
    /// Table over `query`, which may already carry caller filters.
    ///
    /// Starts with the default blacklist and default search configuration.
    pub fn new(store: S, query: QueryBuilder, request: TabularRequest) -> Self {
        let mapper = DocumentMapper::for_request(&request);
        Self {
            store,
            request,
            config: SearchConfig::default(),
            rules: Arc::new(ColumnRules::with_default_blacklist()),
            query,
            prepared: false,
            filter_callback: None,
            auto_filter: true,
            order_callback: None,
            limit_callback: None,
            default_order: Vec::new(),
            skip_paging: false,
            skip_total_records: false,
            total_records: None,
            filtered_records: None,
            mapper,
            payload: Map::new(),
            query_log: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a shared rule registry instead of the default one
    pub fn with_rules(mut self, rules: Arc<ColumnRules>) -> Self {
        self.rules = rules;
        self
    }

    // =========================================================================
    // Column rules
    // =========================================================================

    /// Custom search for `column`, run on a fresh sub-query
    pub fn filter_column<F>(mut self, column: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&mut QueryBuilder, &str) -> TableResult<()> + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.rules).filter_column(column, callback);
        self
    }

    /// Custom ordering for `column`
    pub fn order_column_with<F>(mut self, column: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&mut QueryBuilder, SortDirection) -> TableResult<()> + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.rules).order_column(column, callback);
        self
    }

    pub fn blacklist<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Arc::make_mut(&mut self.rules).blacklist(columns);
        self
    }

    // =========================================================================
    // Caller hooks
    // =========================================================================

    /// Filter callback applied to the query before per-column search.
    ///
    /// With `global_search` false, the request's global keyword is ignored.
    pub fn filter<F>(mut self, callback: F, global_search: bool) -> Self
    where
        F: Fn(&mut QueryBuilder) -> TableResult<()> + Send + Sync + 'static,
    {
        self.filter_callback = Some(Arc::new(callback));
        self.auto_filter = global_search;
        self
    }

    /// Ordering callback replacing all request-driven ordering
    pub fn order<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut QueryBuilder) -> TableResult<()> + Send + Sync + 'static,
    {
        self.order_callback = Some(Arc::new(callback));
        self
    }

    /// Sort used when the request asks for no ordering
    pub fn default_order(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.default_order.push(SortSpec::new(field, direction));
        self
    }

    /// Custom limiting strategy; the default skip is not applied
    pub fn limit<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut QueryBuilder) -> TableResult<()> + Send + Sync + 'static,
    {
        self.limit_callback = Some(Arc::new(callback));
        self
    }

    pub fn skip_paging(mut self) -> Self {
        self.skip_paging = true;
        self
    }

    pub fn set_total_records(mut self, total: u64) -> Self {
        self.total_records = Some(total);
        self
    }

    /// Report the filtered count as total and skip the unfiltered count
    pub fn skip_total_records(mut self) -> Self {
        self.skip_total_records = true;
        self
    }

    pub fn set_filtered_records(mut self, filtered: u64) -> Self {
        self.filtered_records = Some(filtered);
        self
    }

    /// Extra top-level response field
    pub fn with_payload(mut self, key: impl Into<String>, value: Value) -> Self {
        self.payload.insert(key.into(), value);
        self
    }

    // =========================================================================
    // Row mapping
    // =========================================================================

    pub fn with_mapper(mut self, mapper: DocumentMapper) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn remove_column(mut self, column: impl Into<String>) -> Self {
        self.mapper = std::mem::take(&mut self.mapper).remove_column(column);
        self
    }

    pub fn edit_column<F>(mut self, column: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&Value) -> TableResult<Value> + Send + Sync + 'static,
    {
        self.mapper = std::mem::take(&mut self.mapper).edit_column(column, callback);
        self
    }

    pub fn add_index_column(mut self) -> Self {
        self.mapper = std::mem::take(&mut self.mapper).add_index_column();
        self
    }

    // =========================================================================
    // Unsupported ordering (accepted, no effect)
    // =========================================================================

    /// Ordering a column by an expression. Not available on document stores.
    pub fn order_column(self, _column: &str, _expression: &str) -> Self {
        Capability::ExpressionOrdering.ignore();
        self
    }

    /// Ordering several columns by an expression. Not available on document
    /// stores.
    pub fn order_columns<I, C>(self, _columns: I, _expression: &str) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        Capability::ExpressionOrdering.ignore();
        self
    }

    /// NULLS LAST placement. Not available on document stores.
    pub fn order_by_nulls_last(self) -> Self {
        Capability::NullsLastOrdering.ignore();
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn request(&self) -> &TabularRequest {
        &self.request
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn rules(&self) -> &ColumnRules {
        &self.rules
    }

    /// Current query (the prepared plan once `prepare_query` succeeded)
    pub fn query(&self) -> &QueryBuilder {
        &self.query
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn total_records(&self) -> Option<u64> {
        self.total_records
    }

    pub fn filtered_records(&self) -> Option<u64> {
        self.filtered_records
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    /// Counts, filters, orders and pages the query. Runs once.
    pub fn prepare_query(&mut self) -> TableResult<&mut Self> {
        if self.prepared {
            return Ok(self);
        }

        let mut query = self.query.clone();
        let mut query_log = Vec::new();

        let mut total = match self.total_records {
            Some(total) => Some(total),
            None if self.skip_total_records => None,
            None => {
                query_log.push(query.to_document());
                Some(query.count(&self.store)?)
            }
        };

        let filter_len = query.filter().len();
        self.filter_records(&mut query)?;
        let filter_applied = query.filter().len() != filter_len;

        let filtered = match (self.filtered_records, total) {
            (Some(filtered), _) => filtered,
            (None, Some(total)) if !filter_applied => total,
            _ => {
                query_log.push(query.to_document());
                query.count(&self.store)?
            }
        };
        if self.skip_total_records {
            total = Some(filtered);
        }

        self.ordering(&mut query)?;

        if !self.skip_paging {
            Pager::apply(&self.request, &mut query, self.limit_callback.as_ref())?;
        }

        if self.config.debug {
            let rendered = query.to_document();
            log_event(Event::QueryPrepared, &[("query", &rendered.to_string())]);
            query_log.push(rendered);
        }

        self.query = query;
        self.query_log = query_log;
        self.total_records = total;
        self.filtered_records = Some(filtered);
        self.prepared = true;
        Ok(self)
    }

    /// Fetches the rows of the prepared query
    pub fn results(&mut self) -> TableResult<Vec<Value>> {
        self.prepare_query()?;
        self.query.get(&self.store)
    }

    /// Prepares, fetches and returns rows with their counts
    pub fn execute(&mut self) -> TableResult<ResultSet> {
        let rows = self.results()?;
        Ok(ResultSet {
            rows,
            total_records: self.total_records.unwrap_or(0),
            filtered_records: self.filtered_records.unwrap_or(0),
        })
    }

    /// Prepared plan with its counts, without fetching rows
    pub fn explain(&mut self) -> TableResult<Value> {
        self.prepare_query()?;
        Ok(serde_json::json!({
            "query": self.query.to_document(),
            "recordsTotal": self.total_records.unwrap_or(0),
            "recordsFiltered": self.filtered_records.unwrap_or(0),
        }))
    }

    /// Runs the whole draw. Never fails: any error becomes an error response.
    ///
    /// With row mapping, rows stay keyed by field; without it they become
    /// positional arrays in column order. Removed and edited columns apply
    /// either way.
    pub fn run(&mut self, with_row_mapping: bool) -> TableResponse {
        let draw = self.request.draw;
        let draw_field = draw.to_string();
        let scope = ObservationScope::with_fields("TABLE_RUN", &[("draw", &draw_field)]);

        match self.try_run(with_row_mapping) {
            Ok(response) => {
                let rows = response.data.len().to_string();
                let filtered = response.records_filtered.to_string();
                scope.complete_with_fields(&[("filtered", &filtered), ("rows", &rows)]);
                response
            }
            Err(err) => {
                scope.fail(err.code(), &err.to_string());
                TableResponse::error(draw, &err)
            }
        }
    }

    fn try_run(&mut self, with_row_mapping: bool) -> TableResult<TableResponse> {
        let result = self.execute()?;

        let start = self.request.start();
        let data = if with_row_mapping {
            self.mapper.map_rows(result.rows, start)?
        } else {
            self.mapper.clone().array_rows(true).map_rows(result.rows, start)?
        };

        let mut response = TableResponse::success(
            self.request.draw,
            result.total_records,
            result.filtered_records,
            data,
        )
        .with_payload(self.payload.clone());

        if self.config.debug {
            let input = serde_json::to_value(&self.request)?;
            response = response.with_debug(self.query_log.clone(), input);
        }
        Ok(response)
    }

    fn filter_records(&self, query: &mut QueryBuilder) -> TableResult<()> {
        let predicates = PredicateBuilder::new(&self.config, &self.rules);

        if self.auto_filter {
            if let Some(keyword) = self.request.global_keyword() {
                let columns: Vec<&str> = self
                    .request
                    .searchable_column_indexes()
                    .filter_map(|index| self.resolve_column(index, "global_search"))
                    .collect();
                predicates.global_search(query, &columns, keyword)?;
            }
        }

        if let Some(callback) = &self.filter_callback {
            callback(query)?;
        }

        for index in 0..self.request.columns.len() {
            if !self.request.is_column_searchable(index) {
                continue;
            }
            let (Some(column), Some(keyword)) = (
                self.resolve_column(index, "column_search"),
                self.request.column_keyword(index),
            ) else {
                continue;
            };
            predicates.column_search(query, column, keyword, self.request.is_regex(index))?;
        }

        Ok(())
    }

    fn ordering(&self, query: &mut QueryBuilder) -> TableResult<()> {
        if let Some(callback) = &self.order_callback {
            return callback(query);
        }

        let mut orders = self.request.orderable_orders().peekable();
        if orders.peek().is_none() {
            for spec in &self.default_order {
                query.order_by(spec.field.clone(), spec.direction);
            }
            return Ok(());
        }

        SortPlanner::new(&self.rules).plan(
            orders,
            |index| self.request.column_name(index).map(str::to_string),
            query,
        )?;
        Ok(())
    }

    fn resolve_column(&self, index: usize, stage: &str) -> Option<&str> {
        let column = self.request.column_name(index);
        if column.is_none() {
            let index = index.to_string();
            log_event(
                Event::ColumnUnresolved,
                &[("code", "TABLE_CONFIGURATION"), ("index", &index), ("stage", stage)],
            );
        }
        column
    }
}
