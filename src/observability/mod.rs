//! Observability subsystem for doctable
//!
//! Structured, synchronous JSON logging. Observability is read-only and never
//! changes the outcome of a table query.
//!
//! ```ignore
//! use doctable::observability::Logger;
//!
//! Logger::info("TABLE_QUERY_COMPLETE", &[("rows", "42")]);
//! ```

mod logger;

pub use logger::{Logger, Severity};
