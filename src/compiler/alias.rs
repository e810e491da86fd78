//! Collision-free names for generated fields
//!
//! A candidate name is free when it is not a prefix of any name in use.
//! Every field generated from a free candidate by appending a suffix is
//! then free as well.

use std::collections::BTreeSet;

use super::errors::{CompileError, CompileResult};
use crate::request::Column;

/// Field names already present in, or generated for, the documents
#[derive(Debug, Clone, Default)]
pub(crate) struct FieldNames {
    in_use: BTreeSet<String>,
}

impl FieldNames {
    /// Collects every column path and its base field, plus `_id`
    pub(crate) fn from_columns(columns: &[Column]) -> Self {
        let mut names = Self::default();
        names.insert("_id");
        for column in columns {
            names.insert(&column.data);
            names.insert(column.base_field());
        }
        names
    }

    pub(crate) fn insert(&mut self, name: &str) {
        self.in_use.insert(name.to_string());
    }

    /// Returns true if no name in use starts with `candidate`
    pub(crate) fn is_free(&self, candidate: &str) -> bool {
        !self.in_use.iter().any(|name| name.starts_with(candidate))
    }

    /// Appends `padding` to `field` until the candidate is free.
    ///
    /// A candidate longer than every name in use is always free, so the
    /// loop is bounded by the longest name.
    pub(crate) fn resolve_alias(&self, field: &str, padding: &str) -> CompileResult<String> {
        let longest = self.in_use.iter().map(String::len).max().unwrap_or(0);
        let mut candidate = field.to_string();

        for _ in 0..=longest {
            if self.is_free(&candidate) {
                return Ok(candidate);
            }
            candidate.push_str(padding);
        }

        if self.is_free(&candidate) {
            Ok(candidate)
        } else {
            Err(CompileError::alias_unresolved(field))
        }
    }
}
