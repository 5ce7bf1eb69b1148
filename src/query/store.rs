//! Document store seam
//!
//! The table pipeline only needs two round-trips from a store: a count of
//! documents matching a query's filter, and a fetch of the documents the
//! query selects. [`MemoryCollection`] is the in-process implementation used
//! by the CLI and the tests.

use serde_json::Value;

use crate::errors::TableResult;

use super::builder::QueryBuilder;
use super::sorter::DocumentSorter;

/// Trait for executing queries against a document store
pub trait DocumentStore {
    /// Number of documents matching the query's filter.
    ///
    /// Sort, skip and limit do not affect the count.
    fn count(&self, query: &QueryBuilder) -> TableResult<u64>;

    /// Documents selected by the query: filtered, sorted, skipped and limited
    fn fetch(&self, query: &QueryBuilder) -> TableResult<Vec<Value>>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn count(&self, query: &QueryBuilder) -> TableResult<u64> {
        (**self).count(query)
    }

    fn fetch(&self, query: &QueryBuilder) -> TableResult<Vec<Value>> {
        (**self).fetch(query)
    }
}

/// An in-memory collection of JSON documents, in insertion order
#[derive(Debug, Clone, Default)]
pub struct MemoryCollection {
    name: String,
    documents: Vec<Value>,
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documents: Vec::new(),
        }
    }

    pub fn with_documents(name: impl Into<String>, documents: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            documents,
        }
    }

    pub fn insert(&mut self, document: Value) {
        self.documents.push(document);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// A query on this collection
    pub fn query(&self) -> QueryBuilder {
        QueryBuilder::new(self.name.clone())
    }
}

impl DocumentStore for MemoryCollection {
    fn count(&self, query: &QueryBuilder) -> TableResult<u64> {
        let filter = query.filter().compile()?;
        Ok(self.documents.iter().filter(|d| filter.matches(d)).count() as u64)
    }

    fn fetch(&self, query: &QueryBuilder) -> TableResult<Vec<Value>> {
        let filter = query.filter().compile()?;

        let mut matched: Vec<Value> = self
            .documents
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();

        DocumentSorter::sort(&mut matched, query.sorts());

        let skip = query.skip_value().unwrap_or(0) as usize;
        let rows = matched.into_iter().skip(skip);
        Ok(match query.limit_value() {
            Some(limit) => rows.take(limit as usize).collect(),
            None => rows.collect(),
        })
    }
}
