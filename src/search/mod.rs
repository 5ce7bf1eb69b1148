//! Search subsystem
//!
//! Keyword normalization and search predicate construction.

mod keyword;
mod predicate;

pub use keyword::{normalize, KeywordNormalizer, SearchPattern};
pub use predicate::PredicateBuilder;
