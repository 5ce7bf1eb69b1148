//! Observable table events
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events of the table pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A sort or search referenced a column with no resolvable name
    ColumnUnresolved,
    /// A capability the store lacks was requested and ignored
    UnsupportedFeatureIgnored,
    /// The query plan is complete (debug mode only)
    QueryPrepared,
    /// Search configuration loaded
    ConfigLoaded,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ColumnUnresolved => "TABLE_COLUMN_UNRESOLVED",
            Event::UnsupportedFeatureIgnored => "TABLE_UNSUPPORTED_FEATURE_IGNORED",
            Event::QueryPrepared => "TABLE_QUERY_PREPARED",
            Event::ConfigLoaded => "TABLE_CONFIG_LOADED",
        }
    }

    /// Default severity of the event
    pub fn severity(&self) -> Severity {
        match self {
            Event::ColumnUnresolved => Severity::Warn,
            Event::UnsupportedFeatureIgnored | Event::QueryPrepared => Severity::Trace,
            Event::ConfigLoaded => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
