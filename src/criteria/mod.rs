//! Filter and sort expressions shared by the compilers and the store
//!
//! Caller-supplied predicates and compiler-generated fragments use the same
//! [`Filter`] type. The compilers embed external fragments without looking
//! inside them, except for the reference-field collision check.

mod external;
mod filter;
mod sort;

pub use external::ExternalCriteria;
pub use filter::{FieldOp, Filter};
pub use sort::{sort_document, SortDirection, SortKey};
