//! Planner subsystem
//!
//! Turns the ordering and paging parts of a request into query state.
//!
//! # Planning order
//!
//! 1. Filtering (search subsystem)
//! 2. Ordering (`SortPlanner`)
//! 3. Paging (`Pager`), always last so counts see unpaged queries

mod capability;
mod pager;
mod sort;

pub use capability::{Capability, CAPABILITIES};
pub use pager::{LimitCallback, Pager, DEFAULT_PAGE_LENGTH};
pub use sort::SortPlanner;
