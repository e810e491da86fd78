//! Request model for paged table queries
//!
//! The request is a pure data holder. Binding from JSON is provided for
//! convenience; the compilers never re-validate and instead tolerate
//! out-of-range indices and unknown field names.

mod errors;
mod input;

pub use errors::{RequestError, RequestResult};
pub use input::{Column, Direction, Order, Search, TableRequest};
