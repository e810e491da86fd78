//! Document store seam
//!
//! The coordinator talks to storage only through [`StoreExecutor`]. A
//! production deployment implements it on top of its database driver;
//! [`MemoryStore`] evaluates the same queries over in-memory documents.

mod errors;
mod filters;
mod memory;
mod sorter;

pub use errors::{StoreError, StoreErrorCode, StoreResult};
pub use filters::{CompiledFilter, FieldTest};
pub use memory::{MemoryCollection, MemoryStore};
pub use sorter::DocumentSorter;

use serde_json::Value;

use crate::compiler::{FindQuery, Pipeline};
use crate::criteria::Filter;

/// Executes compiled queries against one collection
pub trait StoreExecutor {
    /// Counts documents matching `filter`; `None` counts everything
    fn count(&self, filter: Option<&Filter>) -> StoreResult<u64>;

    /// Runs a find query and returns the page of documents
    fn find(&self, query: &FindQuery) -> StoreResult<Vec<Value>>;

    /// Runs an aggregation pipeline and returns its output documents
    fn aggregate(&self, pipeline: &Pipeline) -> StoreResult<Vec<Value>>;
}
