//! Search and sort rules shared by both compilers

use serde_json::Value;

use crate::criteria::{Filter, SortKey};
use crate::observability::Logger;
use crate::request::{Column, Search, TableRequest};

/// Builds the match fragment for one search term against one field.
///
/// Plain searches are trimmed, escaped and matched case-insensitively.
/// Regex searches use the raw value as a case-sensitive pattern.
pub(crate) fn search_fragment(field: &str, search: &Search) -> Filter {
    if search.regex {
        Filter::regex(field, search.value.clone())
    } else {
        Filter::regex_ci(field, regex::escape(search.value.trim()))
    }
}

/// Builds the match fragment for a per-column search.
///
/// "true" / "false" (any case) match by boolean equality, even for regex
/// searches.
pub(crate) fn column_fragment(field: &str, search: &Search) -> Filter {
    match boolean_value(&search.value) {
        Some(flag) => Filter::eq(field, Value::Bool(flag)),
        None => search_fragment(field, search),
    }
}

fn boolean_value(value: &str) -> Option<bool> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Compiles the order directives into sort keys.
///
/// Directives pointing outside `columns` or at non-orderable columns are
/// dropped; survivors keep their input order. `target` maps an orderable
/// column to the field actually sorted on.
pub(crate) fn sort_keys<F>(request: &TableRequest, mut target: F) -> Vec<SortKey>
where
    F: FnMut(&Column) -> Option<String>,
{
    let mut keys = Vec::with_capacity(request.order.len());

    for order in &request.order {
        let column = match request.column_at(order.column) {
            Some(c) if c.is_orderable() => c,
            _ => {
                let index = order.column.to_string();
                Logger::warn("TABLE_SORT_SKIPPED", &[("column", index.as_str())]);
                continue;
            }
        };

        if let Some(field) = target(column) {
            keys.push(SortKey {
                field,
                direction: order.dir.into(),
            });
        }
    }

    keys
}
