//! Count and execution coordination
//!
//! Counts, compiles, executes and assembles the response envelope for one
//! table request. Failures never propagate; they are reported in the
//! envelope's `error` field.

mod coordinator;
mod errors;
mod output;

pub use coordinator::TableCoordinator;
pub use errors::{TableError, TableResult};
pub use output::TableOutput;
