//! Coordinator errors
//!
//! Every variant is rendered into the response `error` field; none escapes
//! the coordinator.

use thiserror::Error;

use crate::compiler::CompileError;
use crate::store::StoreError;

/// Result type for coordinator steps
pub type TableResult<T> = Result<T, TableError>;

/// Failures of a single table query
#[derive(Debug, Clone, Error)]
pub enum TableError {
    /// An external predicate targets a reference column
    #[error("Reference column '{0}' cannot be used in additional or pre-filtering criteria")]
    ReferencePredicate(String),

    /// Compilation failed
    #[error("{0}")]
    Compile(#[from] CompileError),

    /// The store rejected or failed a query
    #[error("{0}")]
    Store(#[from] StoreError),

    /// The row converter failed
    #[error("Row conversion failed: {0}")]
    Conversion(String),

    /// Count pipeline output without a usable count
    #[error("Count pipeline returned no numeric '{0}' field")]
    InvalidCount(String),
}
