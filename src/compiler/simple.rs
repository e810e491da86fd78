//! Single-query compiler for requests without reference columns
//!
//! Produces one filter, one sort and a page window:
//! 1. Global search: one fragment per searchable column, OR-combined
//! 2. Per-column search: one AND clause per searched column
//! 3. Additional and pre-filtering criteria, AND-combined as-is
//! 4. Sort keys from in-bounds directives on orderable columns
//! 5. Skip = start, limit = length unless negative

use crate::criteria::{ExternalCriteria, Filter, SortKey};
use crate::observability::Logger;
use crate::request::TableRequest;

use super::search::{column_fragment, search_fragment, sort_keys};

/// Compiled find query
#[derive(Debug, Clone, PartialEq)]
pub struct FindQuery {
    /// Combined filter; `None` matches every document
    pub filter: Option<Filter>,
    /// Sort keys in priority order (possibly empty)
    pub sort: Vec<SortKey>,
    pub skip: u64,
    /// Maximum rows; `None` means unlimited
    pub limit: Option<u64>,
}

/// Compiler for the plain find path
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleCompiler;

impl SimpleCompiler {
    pub fn new() -> Self {
        Self
    }

    /// Compiles a request into a find query
    pub fn compile_query(&self, request: &TableRequest, criteria: &ExternalCriteria) -> FindQuery {
        let mut clauses = Vec::new();

        if let Some(global) = Self::global_clause(request) {
            clauses.push(global);
        }

        for column in &request.columns {
            if column.has_column_search() {
                clauses.push(column_fragment(&column.data, &column.search));
            }
        }

        clauses.extend(criteria.fragments().cloned());

        let query = FindQuery {
            filter: Filter::all(clauses),
            sort: sort_keys(request, |column| Some(column.data.clone())),
            skip: request.start,
            limit: request.limit(),
        };

        let key_count = query.sort.len().to_string();
        let filtered = query.filter.is_some().to_string();
        Logger::trace(
            "TABLE_COMPILE_SIMPLE",
            &[("filtered", filtered.as_str()), ("sort_keys", key_count.as_str())],
        );

        query
    }

    fn global_clause(request: &TableRequest) -> Option<Filter> {
        if !request.search.has_text() {
            return None;
        }

        let fragments = request
            .columns
            .iter()
            .filter(|c| c.searchable)
            .map(|c| search_fragment(&c.data, &request.search))
            .collect();

        Filter::any(fragments)
    }
}
