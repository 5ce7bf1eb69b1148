//! Table subsystem
//!
//! `DataTable` drives one request from query preparation to response.
//!
//! ```ignore
//! let response = DataTable::of(&collection, request)
//!     .with_config(config)
//!     .filter_column("age", |q, keyword| { ... })
//!     .remove_column("password")
//!     .run(true);
//! ```

mod table;

pub use table::{DataTable, QueryCallback, ResultSet};
