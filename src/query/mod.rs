//! Query subsystem
//!
//! Store-facing query representation.
//!
//! # Components
//!
//! - `filter`: AND/OR filter tree with regex, comparison and nested leaves
//! - `builder`: chained query builder carrying filter, sort, skip and limit
//! - `sorter`: deterministic multi-key document ordering
//! - `store`: the `DocumentStore` seam and an in-memory collection

mod builder;
mod filter;
mod sorter;
mod store;

pub use builder::{QueryBuilder, SortDirection, SortSpec};
pub use filter::{lookup, Boolean, Clause, CompiledGroup, Comparison, Filter, FilterGroup};
pub use sorter::DocumentSorter;
pub use store::{DocumentStore, MemoryCollection};
