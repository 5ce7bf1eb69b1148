//! Ordering capability table
//!
//! Document stores order by stored fields only. Ordering by a computed
//! expression and NULLS LAST placement have no store equivalent; tables
//! accept those calls and leave the plan untouched.

use crate::errors::TableError;
use crate::observability::{log_event, Event};

/// Ordering features a table may be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Plain ascending/descending sort on a stored field
    FieldOrdering,
    /// Caller callback producing the sort for a column
    CallbackOrdering,
    /// Ordering by a computed expression
    ExpressionOrdering,
    /// Nulls placed after all other values
    NullsLastOrdering,
}

/// Capability table: (feature, supported)
pub const CAPABILITIES: &[(Capability, bool)] = &[
    (Capability::FieldOrdering, true),
    (Capability::CallbackOrdering, true),
    (Capability::ExpressionOrdering, false),
    (Capability::NullsLastOrdering, false),
];

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::FieldOrdering => "field_ordering",
            Capability::CallbackOrdering => "callback_ordering",
            Capability::ExpressionOrdering => "expression_ordering",
            Capability::NullsLastOrdering => "nulls_last_ordering",
        }
    }

    pub fn is_supported(&self) -> bool {
        CAPABILITIES
            .iter()
            .find(|(c, _)| c == self)
            .map(|(_, supported)| *supported)
            .unwrap_or(false)
    }

    /// The error describing this capability as unsupported
    pub fn unsupported(&self) -> TableError {
        TableError::Unsupported(self.as_str())
    }

    /// Records that an unsupported capability was requested and ignored
    pub(crate) fn ignore(&self) {
        log_event(Event::UnsupportedFeatureIgnored, &[("feature", self.as_str())]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_table() {
        assert!(Capability::FieldOrdering.is_supported());
        assert!(Capability::CallbackOrdering.is_supported());
        assert!(!Capability::ExpressionOrdering.is_supported());
        assert!(!Capability::NullsLastOrdering.is_supported());
    }

    #[test]
    fn test_unsupported_error() {
        let err = Capability::NullsLastOrdering.unsupported();
        assert_eq!(err.code(), "TABLE_UNSUPPORTED_FEATURE");
        assert!(err.to_string().contains("nulls_last_ordering"));
    }
}
