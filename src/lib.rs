//! doctable - paged table queries over a document store
//!
//! Compiles a table widget request (draw counter, page window, global and
//! per-column search, sort directives, column metadata) into either a single
//! find query or, when columns reference documents in other collections, a
//! pair of aggregation pipelines that join those documents first. The
//! coordinator runs the compiled form through a [`store::StoreExecutor`] and
//! returns the paged response envelope.
//!
//! ```
//! use doctable::config::TableConfig;
//! use doctable::coordinator::TableCoordinator;
//! use doctable::request::{Column, TableRequest};
//! use doctable::store::MemoryStore;
//! use serde_json::json;
//!
//! let mut store = MemoryStore::new();
//! store.insert("order", json!({"_id": 1, "label": "order1"}));
//!
//! let config = TableConfig::default();
//! let orders = store.collection("order");
//! let coordinator = TableCoordinator::new(&orders, &config);
//!
//! let request = TableRequest::new(vec![Column::new("label").with_searchable(true)]);
//! let output = coordinator.find_all(&request);
//! assert_eq!(output.records_total, 1);
//! assert_eq!(output.data[0]["label"], "order1");
//! ```

pub mod compiler;
pub mod config;
pub mod coordinator;
pub mod criteria;
pub mod observability;
pub mod request;
pub mod store;
