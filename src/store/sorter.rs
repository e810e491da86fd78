//! Document sorting
//!
//! Stable multi-key sort. A document sorts on the first value its key path
//! reaches; a missing value sorts like null.

use std::cmp::Ordering;

use serde_json::Value;

use super::filters::candidates;
use crate::criteria::{SortDirection, SortKey};

/// Sorts documents by sort keys
pub struct DocumentSorter;

impl DocumentSorter {
    /// Sorts in place; earlier keys take priority, ties keep input order
    pub fn sort(documents: &mut [Value], keys: &[SortKey]) {
        if keys.is_empty() {
            return;
        }

        documents.sort_by(|a, b| {
            for key in keys {
                let ordering = compare_values(sort_value(a, &key.field), sort_value(b, &key.field));
                let ordering = match key.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }
}

fn sort_value<'a>(document: &'a Value, path: &str) -> &'a Value {
    candidates(document, path)
        .into_iter()
        .next()
        .unwrap_or(&Value::Null)
}

/// Compares two JSON values.
///
/// Ordering rules:
/// - null < bool < number < string < array < object
/// - For same types, natural ordering; arrays and objects compare equal
pub(crate) fn compare_values(a: &Value, b: &Value) -> Ordering {
    let a_rank = type_rank(a);
    let b_rank = type_rank(b);
    if a_rank != b_rank {
        return a_rank.cmp(&b_rank);
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(xi), Some(yi)) = (x.as_i64(), y.as_i64()) {
                return xi.cmp(&yi);
            }
            let xf = x.as_f64().unwrap_or(0.0);
            let yf = y.as_f64().unwrap_or(0.0);
            xf.partial_cmp(&yf).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}
