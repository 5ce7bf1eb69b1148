//! Filter tree and document evaluation
//!
//! A [`FilterGroup`] is an ordered list of clauses, each joined to the
//! previous one by AND or OR. AND binds tighter than OR: the group is split
//! at every OR connective and matches if any AND-run matches in full.
//!
//! Evaluation follows document-store rules:
//! - No type coercion (`"123"` never equals `123`)
//! - Missing fields never match, except `ne`, `exists: false` and `eq null`
//! - Regex leaves match strings, or arrays holding a matching string

use std::cmp::Ordering;

use regex::Regex;
use serde_json::{json, Map, Value};

use crate::errors::TableResult;
use crate::search::SearchPattern;

/// Boolean connective between a clause and the one before it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boolean {
    And,
    Or,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    /// Store operator name
    pub fn op_name(&self) -> &'static str {
        match self {
            Comparison::Eq => "$eq",
            Comparison::Ne => "$ne",
            Comparison::Gt => "$gt",
            Comparison::Gte => "$gte",
            Comparison::Lt => "$lt",
            Comparison::Lte => "$lte",
        }
    }
}

/// A single filter node
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field matches a regex pattern
    Regex { field: String, pattern: SearchPattern },
    /// Field compares against a value
    Compare {
        field: String,
        op: Comparison,
        value: Value,
    },
    /// Field equals one of the values
    In { field: String, values: Vec<Value> },
    /// Field presence
    Exists { field: String, exists: bool },
    /// Nested group
    Group(FilterGroup),
}

impl Filter {
    fn to_document(&self) -> Value {
        match self {
            Filter::Regex { field, pattern } => json!({ field.as_str(): pattern.to_document() }),
            Filter::Compare { field, op, value } => {
                json!({ field.as_str(): { op.op_name(): value } })
            }
            Filter::In { field, values } => json!({ field.as_str(): { "$in": values } }),
            Filter::Exists { field, exists } => json!({ field.as_str(): { "$exists": exists } }),
            Filter::Group(group) => group.to_document(),
        }
    }
}

/// A filter joined to its predecessor
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub boolean: Boolean,
    pub filter: Filter,
}

/// An ordered AND/OR composition of filters. Empty groups match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterGroup {
    clauses: Vec<Clause>,
}

impl FilterGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a filter with the given connective
    pub fn push(&mut self, boolean: Boolean, filter: Filter) {
        self.clauses.push(Clause { boolean, filter });
    }

    pub fn and(mut self, filter: Filter) -> Self {
        self.push(Boolean::And, filter);
        self
    }

    pub fn or(mut self, filter: Filter) -> Self {
        self.push(Boolean::Or, filter);
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Compiles all regex leaves. Fails on the first malformed pattern.
    pub fn compile(&self) -> TableResult<CompiledGroup> {
        let mut runs: Vec<Vec<CompiledFilter>> = Vec::new();
        for (i, clause) in self.clauses.iter().enumerate() {
            if i == 0 || clause.boolean == Boolean::Or {
                runs.push(Vec::new());
            }
            let compiled = CompiledFilter::compile(&clause.filter)?;
            if let Some(run) = runs.last_mut() {
                run.push(compiled);
            }
        }
        Ok(CompiledGroup { runs })
    }

    /// Convenience check for a single document
    pub fn matches(&self, document: &Value) -> TableResult<bool> {
        Ok(self.compile()?.matches(document))
    }

    /// Store-native rendering (`$and` / `$or` documents)
    pub fn to_document(&self) -> Value {
        let mut runs: Vec<Vec<Value>> = Vec::new();
        for (i, clause) in self.clauses.iter().enumerate() {
            if i == 0 || clause.boolean == Boolean::Or {
                runs.push(Vec::new());
            }
            if let Some(run) = runs.last_mut() {
                run.push(clause.filter.to_document());
            }
        }

        let mut runs: Vec<Value> = runs
            .into_iter()
            .map(|mut run| {
                if run.len() == 1 {
                    run.remove(0)
                } else {
                    json!({ "$and": run })
                }
            })
            .collect();

        match runs.len() {
            0 => Value::Object(Map::new()),
            1 => runs.remove(0),
            _ => json!({ "$or": runs }),
        }
    }
}

/// A filter group with regexes compiled, ready for scanning
#[derive(Debug)]
pub struct CompiledGroup {
    runs: Vec<Vec<CompiledFilter>>,
}

impl CompiledGroup {
    /// Checks if a document matches the group
    pub fn matches(&self, document: &Value) -> bool {
        if self.runs.is_empty() {
            return true;
        }
        self.runs
            .iter()
            .any(|run| run.iter().all(|f| f.matches(document)))
    }
}

#[derive(Debug)]
enum CompiledFilter {
    Regex { field: String, regex: Regex },
    Compare {
        field: String,
        op: Comparison,
        value: Value,
    },
    In { field: String, values: Vec<Value> },
    Exists { field: String, exists: bool },
    Group(CompiledGroup),
}

impl CompiledFilter {
    fn compile(filter: &Filter) -> TableResult<Self> {
        Ok(match filter {
            Filter::Regex { field, pattern } => CompiledFilter::Regex {
                field: field.clone(),
                regex: pattern.compile()?,
            },
            Filter::Compare { field, op, value } => CompiledFilter::Compare {
                field: field.clone(),
                op: *op,
                value: value.clone(),
            },
            Filter::In { field, values } => CompiledFilter::In {
                field: field.clone(),
                values: values.clone(),
            },
            Filter::Exists { field, exists } => CompiledFilter::Exists {
                field: field.clone(),
                exists: *exists,
            },
            Filter::Group(group) => CompiledFilter::Group(group.compile()?),
        })
    }

    fn matches(&self, document: &Value) -> bool {
        match self {
            CompiledFilter::Regex { field, regex } => match lookup(document, field) {
                Some(Value::String(s)) => regex.is_match(s),
                Some(Value::Array(items)) => items
                    .iter()
                    .any(|v| v.as_str().map(|s| regex.is_match(s)).unwrap_or(false)),
                _ => false,
            },
            CompiledFilter::Compare { field, op, value } => {
                compare_match(lookup(document, field), *op, value)
            }
            CompiledFilter::In { field, values } => match lookup(document, field) {
                Some(actual) => values.contains(actual),
                None => false,
            },
            CompiledFilter::Exists { field, exists } => {
                lookup(document, field).is_some() == *exists
            }
            CompiledFilter::Group(group) => group.matches(document),
        }
    }
}

/// Resolves a field path in a document.
///
/// A literal key wins over a dotted path; otherwise each segment descends
/// into objects, or arrays by numeric index.
pub fn lookup<'a>(document: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(v) = document.get(path) {
        return Some(v);
    }
    if !path.contains('.') {
        return None;
    }

    let mut current = document;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

fn compare_match(actual: Option<&Value>, op: Comparison, expected: &Value) -> bool {
    let actual = match actual {
        Some(v) => v,
        // Missing field: only "not equal" and "equal null" succeed
        None => return op == Comparison::Ne || (op == Comparison::Eq && expected.is_null()),
    };

    match op {
        Comparison::Eq => actual == expected,
        Comparison::Ne => actual != expected,
        Comparison::Gt => ordered(actual, expected) == Some(Ordering::Greater),
        Comparison::Gte => matches!(
            ordered(actual, expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Comparison::Lt => ordered(actual, expected) == Some(Ordering::Less),
        Comparison::Lte => matches!(
            ordered(actual, expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
    }
}

/// Range ordering for numbers and strings only. Mixed types never compare.
fn ordered(actual: &Value, bound: &Value) -> Option<Ordering> {
    match (actual, bound) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(ai), Some(bi)) = (a.as_i64(), b.as_i64()) {
                return Some(ai.cmp(&bi));
            }
            a.as_f64()?.partial_cmp(&b.as_f64()?)
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
