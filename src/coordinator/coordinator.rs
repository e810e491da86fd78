//! Table query coordinator
//!
//! Linear flow, no retries:
//! 1. `length == 0` returns an empty envelope
//! 2. Reference requests reject external criteria touching reference columns
//! 3. Total count (pre-filtering criteria only); zero returns
//! 4. Compile; filtered count; zero returns
//! 5. Fetch the page and convert each row
//!
//! Any failure sets `error` on the envelope. Counts assigned before the
//! failure are kept; `data` stays empty.

use std::convert::Infallible;
use std::fmt::Display;

use serde_json::Value;
use uuid::Uuid;

use super::errors::{TableError, TableResult};
use super::output::TableOutput;
use crate::compiler::{AggregationPlan, CompiledQuery, Compiler, TableCompiler};
use crate::config::TableConfig;
use crate::criteria::{ExternalCriteria, Filter};
use crate::observability::Logger;
use crate::request::TableRequest;
use crate::store::StoreExecutor;

/// Runs table requests against one store executor
pub struct TableCoordinator<'a, S: StoreExecutor + ?Sized> {
    store: &'a S,
    config: &'a TableConfig,
}

impl<'a, S: StoreExecutor + ?Sized> TableCoordinator<'a, S> {
    pub fn new(store: &'a S, config: &'a TableConfig) -> Self {
        Self { store, config }
    }

    /// Runs a request without external criteria
    pub fn find_all(&self, request: &TableRequest) -> TableOutput<Value> {
        self.find_all_with(request, &ExternalCriteria::new())
    }

    /// Runs a request restricted by external criteria
    pub fn find_all_with(
        &self,
        request: &TableRequest,
        criteria: &ExternalCriteria,
    ) -> TableOutput<Value> {
        self.find_all_converted(request, criteria, Ok::<Value, Infallible>)
    }

    /// Runs a request and maps every returned row through `converter`
    pub fn find_all_converted<R, E, F>(
        &self,
        request: &TableRequest,
        criteria: &ExternalCriteria,
        converter: F,
    ) -> TableOutput<R>
    where
        F: FnMut(Value) -> Result<R, E>,
        E: Display,
    {
        let mut output = TableOutput::new(request.draw);
        let query_id = Uuid::new_v4().to_string();
        let draw = request.draw.to_string();
        Logger::info(
            "TABLE_QUERY_BEGIN",
            &[("draw", draw.as_str()), ("query_id", query_id.as_str())],
        );

        if let Err(err) = self.run(&query_id, request, criteria, converter, &mut output) {
            let message = err.to_string();
            Logger::error(
                "TABLE_QUERY_FAILED",
                &[("error", message.as_str()), ("query_id", query_id.as_str())],
            );
            output.error = Some(message);
        }

        output
    }

    fn run<R, E, F>(
        &self,
        query_id: &str,
        request: &TableRequest,
        criteria: &ExternalCriteria,
        mut converter: F,
        output: &mut TableOutput<R>,
    ) -> TableResult<()>
    where
        F: FnMut(Value) -> Result<R, E>,
        E: Display,
    {
        if request.length == 0 {
            Logger::info("TABLE_QUERY_EMPTY", &[("query_id", query_id)]);
            return Ok(());
        }

        if request.has_reference_columns() {
            check_reference_predicates(request, criteria, self.config.check_nested_predicates)?;
        }

        output.records_total = self.store.count(criteria.pre_filtering.as_ref())?;
        let total = output.records_total.to_string();
        Logger::info(
            "TABLE_QUERY_TOTAL",
            &[("query_id", query_id), ("total", total.as_str())],
        );
        if output.records_total == 0 {
            return Ok(());
        }

        let compiler = TableCompiler::for_request(request, self.config)?;
        let rows = match compiler.compile(request, criteria)? {
            CompiledQuery::Find(query) => {
                output.records_filtered = self.store.count(query.filter.as_ref())?;
                if !log_filtered(query_id, compiler.kind(), output.records_filtered) {
                    return Ok(());
                }
                self.store.find(&query)?
            }
            CompiledQuery::Aggregate(plan) => {
                output.records_filtered = self.filtered_count(&plan)?;
                if !log_filtered(query_id, compiler.kind(), output.records_filtered) {
                    return Ok(());
                }
                self.store.aggregate(&plan.result)?
            }
        };

        let mut data = Vec::with_capacity(rows.len());
        for row in rows {
            let converted = converter(row).map_err(|e| TableError::Conversion(e.to_string()))?;
            data.push(converted);
        }
        output.data = data;

        let returned = output.data.len().to_string();
        Logger::info(
            "TABLE_QUERY_COMPLETE",
            &[("query_id", query_id), ("rows", returned.as_str())],
        );
        Ok(())
    }

    /// Runs the count pipeline; no output document means zero
    fn filtered_count(&self, plan: &AggregationPlan) -> TableResult<u64> {
        let rows = self.store.aggregate(&plan.count)?;
        let field = &self.config.count_field;

        match rows.first() {
            None => Ok(0),
            Some(doc) => doc
                .get(field)
                .and_then(Value::as_u64)
                .ok_or_else(|| TableError::InvalidCount(field.clone())),
        }
    }
}

/// Logs the filtered count; returns false when nothing matched
fn log_filtered(query_id: &str, path: &str, filtered: u64) -> bool {
    let count = filtered.to_string();
    Logger::info(
        "TABLE_QUERY_FILTERED",
        &[("filtered", count.as_str()), ("path", path), ("query_id", query_id)],
    );
    filtered > 0
}

/// Rejects external criteria that target a reference column or one of its
/// sub-paths. With `nested` unset only top-level predicate fields are seen.
pub(crate) fn check_reference_predicates(
    request: &TableRequest,
    criteria: &ExternalCriteria,
    nested: bool,
) -> TableResult<()> {
    for fragment in criteria.fragments() {
        let fields = predicate_fields(fragment, nested);
        for column in request.reference_columns() {
            if fields.iter().any(|f| targets(f, &column.data)) {
                return Err(TableError::ReferencePredicate(column.data.clone()));
            }
        }
    }
    Ok(())
}

fn predicate_fields(fragment: &Filter, nested: bool) -> Vec<&str> {
    if nested {
        fragment.fields()
    } else {
        fragment.top_level_fields()
    }
}

fn targets(field: &str, column: &str) -> bool {
    field == column
        || field
            .strip_prefix(column)
            .map_or(false, |rest| rest.starts_with('.'))
}
