//! Search configuration
//!
//! Boolean toggles read once when a table is constructed:
//! - case-insensitive matching
//! - shell-style wildcard expansion
//! - smart (substring) search instead of exact-anchor matching
//! - debug output (rendered queries and request echo in the response)

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for keyword matching and debug output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Match keywords regardless of case (default: true)
    #[serde(default = "default_true")]
    pub case_insensitive: bool,

    /// Expand `*` and `?` in keywords (default: false)
    #[serde(default)]
    pub wildcard: bool,

    /// Substring match instead of full-value match (default: true)
    #[serde(default = "default_true")]
    pub smart_search: bool,

    /// Attach rendered queries and the request to responses (default: false)
    #[serde(default)]
    pub debug: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            case_insensitive: true,
            wildcard: false,
            smart_search: true,
            debug: false,
        }
    }
}

impl SearchConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Load a configuration file. Malformed JSON is reported as
    /// `InvalidData`.
    pub fn load(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Exact, case-sensitive matching with no wildcard expansion.
    pub fn exact() -> Self {
        Self {
            case_insensitive: false,
            wildcard: false,
            smart_search: false,
            debug: false,
        }
    }

    pub fn with_case_insensitive(mut self, enabled: bool) -> Self {
        self.case_insensitive = enabled;
        self
    }

    pub fn with_wildcard(mut self, enabled: bool) -> Self {
        self.wildcard = enabled;
        self
    }

    pub fn with_smart_search(mut self, enabled: bool) -> Self {
        self.smart_search = enabled;
        self
    }

    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert!(config.case_insensitive);
        assert!(!config.wildcard);
        assert!(config.smart_search);
        assert!(!config.debug);
    }

    #[test]
    fn test_from_json_partial() {
        let config = SearchConfig::from_json(r#"{"wildcard": true}"#).unwrap();
        assert!(config.wildcard);
        assert!(config.case_insensitive);
        assert!(config.smart_search);
    }

    #[test]
    fn test_from_json_empty_object() {
        let config = SearchConfig::from_json("{}").unwrap();
        assert_eq!(config, SearchConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        let err = SearchConfig::load(Path::new("/nonexistent/aerotables.json")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_builder_toggles() {
        let config = SearchConfig::exact().with_smart_search(true).with_debug(true);
        assert!(!config.case_insensitive);
        assert!(config.smart_search);
        assert!(config.debug);
    }
}
