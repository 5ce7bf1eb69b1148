//! Predicate building
//!
//! Turns keywords plus column metadata into filter fragments:
//! - column search: one predicate per column, AND-ed into the query
//! - global search: one predicate per eligible column, OR-ed inside a
//!   single group that is AND-ed into the query
//!
//! A column with a filter rule is searched by its callback, run against a
//! fresh sub-query whose filters are merged back as a nested group. Without
//! a rule, blacklisted columns are skipped and other columns get a regex
//! predicate on the normalized keyword.

use crate::config::SearchConfig;
use crate::errors::TableResult;
use crate::query::{Boolean, Filter, FilterGroup, QueryBuilder};
use crate::rules::ColumnRules;

use super::keyword::KeywordNormalizer;

/// Builds search predicates for one table
pub struct PredicateBuilder<'a> {
    normalizer: KeywordNormalizer,
    rules: &'a ColumnRules,
}

impl<'a> PredicateBuilder<'a> {
    pub fn new(config: &SearchConfig, rules: &'a ColumnRules) -> Self {
        Self {
            normalizer: KeywordNormalizer::new(config),
            rules,
        }
    }

    /// Predicate for a per-column search, or None if the column is skipped
    /// or its filter rule added nothing.
    ///
    /// With `regex` set and no filter rule, the keyword is used verbatim as a
    /// pattern (only the case flag is applied).
    pub fn build_column_search(
        &self,
        base: &QueryBuilder,
        column: &str,
        keyword: &str,
        regex: bool,
    ) -> TableResult<Option<Filter>> {
        if self.rules.has_filter(column) {
            return self.build_rule_search(base, column, keyword);
        }
        if self.rules.skips_search(column) {
            return Ok(None);
        }

        let pattern = if regex {
            self.normalizer.passthrough(keyword)
        } else {
            self.normalizer.normalize(keyword)
        };
        Ok(Some(Filter::Regex {
            field: column.to_string(),
            pattern,
        }))
    }

    /// Predicate for a global search: any eligible column may match.
    ///
    /// Returns None when no column contributes a predicate.
    pub fn build_global_search(
        &self,
        base: &QueryBuilder,
        columns: &[&str],
        keyword: &str,
    ) -> TableResult<Option<Filter>> {
        let mut group = FilterGroup::new();

        for column in columns {
            let predicate = if self.rules.has_filter(column) {
                self.build_rule_search(base, column, keyword)?
            } else if self.rules.skips_search(column) {
                None
            } else {
                Some(Filter::Regex {
                    field: column.to_string(),
                    pattern: self.normalizer.normalize(keyword),
                })
            };

            if let Some(predicate) = predicate {
                group.push(Boolean::Or, predicate);
            }
        }

        if group.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Filter::Group(group)))
        }
    }

    /// Applies a per-column search to `query` with AND
    pub fn column_search(
        &self,
        query: &mut QueryBuilder,
        column: &str,
        keyword: &str,
        regex: bool,
    ) -> TableResult<bool> {
        match self.build_column_search(query, column, keyword, regex)? {
            Some(predicate) => {
                query.push_filter(Boolean::And, predicate);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Applies a global search to `query` as one AND-ed OR-group
    pub fn global_search(
        &self,
        query: &mut QueryBuilder,
        columns: &[&str],
        keyword: &str,
    ) -> TableResult<bool> {
        match self.build_global_search(query, columns, keyword)? {
            Some(group) => {
                query.push_filter(Boolean::And, group);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn build_rule_search(
        &self,
        base: &QueryBuilder,
        column: &str,
        keyword: &str,
    ) -> TableResult<Option<Filter>> {
        let mut sub_query = base.new_query();
        self.rules.apply_filter(column, &mut sub_query, keyword)?;
        if sub_query.has_filters() {
            Ok(Some(Filter::Group(sub_query.filter().clone())))
        } else {
            Ok(None)
        }
    }
}
