//! Request subsystem
//!
//! The immutable description of what a client wants: which columns exist,
//! what to search for, how to order and which page to return.

mod request;

pub use request::{ColumnSpec, OrderRequest, SearchValue, TabularRequest};
