//! Filter evaluation against JSON documents
//!
//! Path segments fan out across arrays, so `product_.label` reaches the
//! label of every joined document. A field matches when any reached value
//! (or any element of a reached array) satisfies the operation. No type
//! coercion: comparisons only succeed between values of the same kind.

use std::cmp::Ordering;

use regex::{Regex, RegexBuilder};
use serde_json::Value;

use super::errors::{StoreError, StoreResult};
use super::sorter::compare_values;
use crate::criteria::{FieldOp, Filter};

/// A filter with its patterns compiled once
#[derive(Debug, Clone)]
pub enum CompiledFilter {
    Field { field: String, test: FieldTest },
    And(Vec<CompiledFilter>),
    Or(Vec<CompiledFilter>),
}

/// Per-field test of a compiled filter
#[derive(Debug, Clone)]
pub enum FieldTest {
    Op(FieldOp),
    Regex(Regex),
}

impl CompiledFilter {
    /// Compiles a filter; fails on the first invalid pattern
    pub fn new(filter: &Filter) -> StoreResult<Self> {
        match filter {
            Filter::Field { field, op } => {
                let test = match op {
                    FieldOp::Regex {
                        pattern,
                        case_insensitive,
                    } => {
                        let regex = RegexBuilder::new(pattern)
                            .case_insensitive(*case_insensitive)
                            .build()
                            .map_err(|e| StoreError::invalid_pattern(pattern, e))?;
                        FieldTest::Regex(regex)
                    }
                    other => FieldTest::Op(other.clone()),
                };
                Ok(CompiledFilter::Field {
                    field: field.clone(),
                    test,
                })
            }
            Filter::And(clauses) => Ok(CompiledFilter::And(Self::compile_all(clauses)?)),
            Filter::Or(clauses) => Ok(CompiledFilter::Or(Self::compile_all(clauses)?)),
        }
    }

    /// Compiles an optional filter; `None` matches everything
    pub fn optional(filter: Option<&Filter>) -> StoreResult<Option<Self>> {
        filter.map(Self::new).transpose()
    }

    fn compile_all(clauses: &[Filter]) -> StoreResult<Vec<CompiledFilter>> {
        clauses.iter().map(Self::new).collect()
    }

    /// Checks if a document matches
    pub fn matches(&self, document: &Value) -> bool {
        match self {
            CompiledFilter::Field { field, test } => {
                let candidates = candidates(document, field);
                test.matches(&candidates)
            }
            CompiledFilter::And(clauses) => clauses.iter().all(|c| c.matches(document)),
            CompiledFilter::Or(clauses) => clauses.iter().any(|c| c.matches(document)),
        }
    }
}

impl FieldTest {
    fn matches(&self, candidates: &[&Value]) -> bool {
        match self {
            FieldTest::Regex(regex) => candidates
                .iter()
                .any(|v| v.as_str().map_or(false, |s| regex.is_match(s))),
            FieldTest::Op(FieldOp::Eq(expected)) => equals_any(candidates, expected),
            FieldTest::Op(FieldOp::Ne(expected)) => !equals_any(candidates, expected),
            FieldTest::Op(FieldOp::In(values)) => {
                values.iter().any(|expected| equals_any(candidates, expected))
            }
            FieldTest::Op(FieldOp::Gt(bound)) => {
                compares_any(candidates, bound, |o| o == Ordering::Greater)
            }
            FieldTest::Op(FieldOp::Gte(bound)) => {
                compares_any(candidates, bound, |o| o != Ordering::Less)
            }
            FieldTest::Op(FieldOp::Lt(bound)) => {
                compares_any(candidates, bound, |o| o == Ordering::Less)
            }
            FieldTest::Op(FieldOp::Lte(bound)) => {
                compares_any(candidates, bound, |o| o != Ordering::Greater)
            }
            // Compiled into FieldTest::Regex
            FieldTest::Op(FieldOp::Regex { .. }) => false,
        }
    }
}

/// Null matches a missing field
fn equals_any(candidates: &[&Value], expected: &Value) -> bool {
    if expected.is_null() && candidates.is_empty() {
        return true;
    }
    candidates.iter().any(|v| values_equal(v, expected))
}

fn compares_any<F>(candidates: &[&Value], bound: &Value, accept: F) -> bool
where
    F: Fn(Ordering) -> bool,
{
    candidates
        .iter()
        .filter(|v| same_kind(v, bound))
        .any(|v| accept(compare_values(v, bound)))
}

fn same_kind(a: &Value, b: &Value) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

/// Equality with numbers compared by value (1 == 1.0)
pub(crate) fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => compare_values(a, b) == Ordering::Equal,
        _ => a == b,
    }
}

/// Returns every value reached by `path`, fanning out across arrays.
///
/// A reached array contributes itself and each of its elements.
pub(crate) fn candidates<'a>(document: &'a Value, path: &str) -> Vec<&'a Value> {
    let mut reached = vec![document];

    for segment in path.split('.') {
        let mut next = Vec::new();
        for value in reached {
            match value {
                Value::Object(map) => next.extend(map.get(segment)),
                Value::Array(items) => {
                    for item in items {
                        if let Value::Object(map) = item {
                            next.extend(map.get(segment));
                        }
                    }
                }
                _ => {}
            }
        }
        reached = next;
    }

    let mut out = Vec::with_capacity(reached.len());
    for value in reached {
        out.push(value);
        if let Value::Array(items) = value {
            out.extend(items.iter());
        }
    }
    out
}
