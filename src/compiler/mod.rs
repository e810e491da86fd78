//! Query compilation for paged table requests
//!
//! Two compilers share the search and sort rules:
//! - [`SimpleCompiler`] emits a single find query when no column is a
//!   reference column
//! - [`ReferenceCompiler`] emits count and result aggregation pipelines that
//!   join referenced documents before filtering and sorting
//!
//! [`TableCompiler`] picks one per request. Compilation is pure; nothing is
//! executed here.

mod alias;
mod errors;
mod pipeline;
mod reference;
mod search;
mod simple;

pub use errors::{CompileError, CompileErrorCode, CompileResult};
pub use pipeline::{Expression, Lookup, Pipeline, Projection, Stage};
pub use reference::{AggregationPlan, ReferenceCompiler, ResolvedReference};
pub use simple::{FindQuery, SimpleCompiler};

use crate::config::TableConfig;
use crate::criteria::ExternalCriteria;
use crate::request::TableRequest;

/// Output of a compiler
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledQuery {
    /// Single find query with filter, sort and page window
    Find(FindQuery),
    /// Count and result pipelines
    Aggregate(AggregationPlan),
}

/// Compiles a table request plus external criteria
pub trait Compiler {
    fn compile(
        &self,
        request: &TableRequest,
        criteria: &ExternalCriteria,
    ) -> CompileResult<CompiledQuery>;
}

impl Compiler for SimpleCompiler {
    fn compile(
        &self,
        request: &TableRequest,
        criteria: &ExternalCriteria,
    ) -> CompileResult<CompiledQuery> {
        Ok(CompiledQuery::Find(self.compile_query(request, criteria)))
    }
}

impl Compiler for ReferenceCompiler {
    fn compile(
        &self,
        request: &TableRequest,
        criteria: &ExternalCriteria,
    ) -> CompileResult<CompiledQuery> {
        self.compile_plan(request, criteria)
            .map(CompiledQuery::Aggregate)
    }
}

/// Compiler selected by the shape of a request
#[derive(Debug, Clone)]
pub enum TableCompiler {
    Simple(SimpleCompiler),
    Reference(ReferenceCompiler),
}

impl TableCompiler {
    /// Uses the reference compiler when any column is a reference column
    pub fn for_request(request: &TableRequest, config: &TableConfig) -> CompileResult<Self> {
        if request.has_reference_columns() {
            ReferenceCompiler::new(config).map(TableCompiler::Reference)
        } else {
            Ok(TableCompiler::Simple(SimpleCompiler::new()))
        }
    }

    /// Returns the path name used in log output
    pub fn kind(&self) -> &'static str {
        match self {
            TableCompiler::Simple(_) => "simple",
            TableCompiler::Reference(_) => "reference",
        }
    }
}

impl Compiler for TableCompiler {
    fn compile(
        &self,
        request: &TableRequest,
        criteria: &ExternalCriteria,
    ) -> CompileResult<CompiledQuery> {
        match self {
            TableCompiler::Simple(compiler) => compiler.compile(request, criteria),
            TableCompiler::Reference(compiler) => compiler.compile(request, criteria),
        }
    }
}
