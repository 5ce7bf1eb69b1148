//! aerotables - server-side table queries for document stores
//!
//! Compiles a DataTables request (columns, global and per-column search,
//! ordering, paging) plus per-column rules into a store query, runs it
//! against a [`query::DocumentStore`] and returns the draw response.

pub mod cli;
pub mod config;
pub mod errors;
pub mod observability;
pub mod planner;
pub mod query;
pub mod request;
pub mod response;
pub mod rules;
pub mod search;
pub mod table;
pub mod transform;
