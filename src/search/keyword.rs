//! Keyword normalization
//!
//! Turns a raw user keyword into an opaque [`SearchPattern`]. Literal text is
//! always regex-escaped; the only way to hand a store an unescaped pattern is
//! [`SearchPattern::raw`], used by per-column regex mode.

use regex::{Regex, RegexBuilder};
use serde_json::{json, Value};

use crate::config::SearchConfig;
use crate::errors::{TableError, TableResult};

/// A regex pattern ready for a store's regex-match primitive.
///
/// Cannot be built from arbitrary strings outside this module except through
/// the explicit raw passthrough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPattern {
    source: String,
    case_insensitive: bool,
    raw: bool,
}

impl SearchPattern {
    /// Wraps a user-provided regex verbatim. Nothing is escaped.
    pub fn raw(pattern: impl Into<String>, case_insensitive: bool) -> Self {
        Self {
            source: pattern.into(),
            case_insensitive,
            raw: true,
        }
    }

    /// Pattern body
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// True if this pattern came from regex passthrough mode
    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// Store option flags (`"i"` when case-insensitive)
    pub fn options(&self) -> &'static str {
        if self.case_insensitive {
            "i"
        } else {
            ""
        }
    }

    /// Compiles the pattern with its flags applied
    pub fn compile(&self) -> TableResult<Regex> {
        RegexBuilder::new(&self.source)
            .case_insensitive(self.case_insensitive)
            .build()
            .map_err(|e| TableError::InvalidPattern {
                pattern: self.source.clone(),
                reason: e.to_string(),
            })
    }

    /// Store-native rendering: `{"$regex": ..., "$options": ...}`
    pub fn to_document(&self) -> Value {
        json!({ "$regex": self.source, "$options": self.options() })
    }
}

/// Normalizes keywords according to a [`SearchConfig`]
#[derive(Debug, Clone, Copy)]
pub struct KeywordNormalizer {
    case_insensitive: bool,
    wildcard: bool,
    smart_search: bool,
}

impl KeywordNormalizer {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            case_insensitive: config.case_insensitive,
            wildcard: config.wildcard,
            smart_search: config.smart_search,
        }
    }

    /// Normalizes a keyword into a pattern
    pub fn normalize(&self, keyword: &str) -> SearchPattern {
        normalize(
            keyword,
            self.case_insensitive,
            self.wildcard,
            self.smart_search,
        )
    }

    /// Regex passthrough: the keyword is used as-is, only the case flag applies
    pub fn passthrough(&self, keyword: &str) -> SearchPattern {
        SearchPattern::raw(keyword, self.case_insensitive)
    }
}

/// Normalizes a keyword into a matchable pattern.
///
/// - wildcard: `*` becomes `.*`, `?` becomes `.`, everything else is literal
/// - case-insensitive: literals are lower-cased and the `i` flag is attached
/// - smart search: `.*<keyword>.*`, otherwise `^<keyword>$`
pub fn normalize(
    keyword: &str,
    case_insensitive: bool,
    wildcard: bool,
    smart_search: bool,
) -> SearchPattern {
    let body = if wildcard {
        expand_wildcards(keyword, case_insensitive)
    } else {
        escape_literal(keyword, case_insensitive)
    };

    let source = if smart_search {
        format!(".*{}.*", body)
    } else {
        format!("^{}$", body)
    };

    SearchPattern {
        source,
        case_insensitive,
        raw: false,
    }
}

fn escape_literal(literal: &str, fold: bool) -> String {
    if fold {
        regex::escape(&literal.to_lowercase())
    } else {
        regex::escape(literal)
    }
}

fn expand_wildcards(keyword: &str, fold: bool) -> String {
    let mut out = String::with_capacity(keyword.len() + 8);
    let mut literal = String::new();

    for c in keyword.chars() {
        match c {
            '*' | '?' => {
                out.push_str(&escape_literal(&literal, fold));
                literal.clear();
                out.push_str(if c == '*' { ".*" } else { "." });
            }
            c => literal.push(c),
        }
    }
    out.push_str(&escape_literal(&literal, fold));
    out
}
