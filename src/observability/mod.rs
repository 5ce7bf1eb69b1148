//! Observability subsystem
//!
//! Structured JSON logging and scope-based lifecycle events.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on query planning or execution
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use aerotables::observability::{Logger, ObservationScope};
//!
//! Logger::warn("TABLE_COLUMN_UNRESOLVED", &[("index", "3")]);
//!
//! let scope = ObservationScope::with_fields("TABLE_RUN", &[("draw", "1")]);
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::{ObservationScope, Timer};

/// Log a table event with fields at its default severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
