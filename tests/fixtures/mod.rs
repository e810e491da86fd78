//! Shared fixtures for the table query suites
//!
//! Three products and three orders; every order references one product
//! through a `{$ref, $id}` pointer.

#![allow(dead_code)]

use std::cell::RefCell;

use doctable::compiler::{FindQuery, Pipeline};
use doctable::coordinator::TableOutput;
use doctable::criteria::Filter;
use doctable::request::{Column, Search};
use doctable::store::{MemoryCollection, MemoryStore, StoreError, StoreExecutor, StoreResult};
use serde_json::{json, Value};

pub const PRODUCTS: &str = "product";
pub const ORDERS: &str = "order";

pub fn products() -> Vec<Value> {
    vec![
        json!({
            "_id": 1,
            "label": "product1",
            "isEnabled": true,
            "createdAt": "2024-05-01T10:00:00",
            "characteristics": [
                {"key": "key1", "value": "val11"},
                {"key": "key2", "value": "val21"}
            ]
        }),
        json!({
            "_id": 2,
            "label": "product2",
            "isEnabled": true,
            "createdAt": "2024-05-01T11:00:00",
            "characteristics": [{"key": "key1", "value": "val12"}]
        }),
        json!({
            "_id": 3,
            "label": "product3",
            "isEnabled": false,
            "createdAt": "2024-05-01T09:00:00",
            "characteristics": [{"key": "key2", "value": "val23"}]
        }),
    ]
}

pub fn orders() -> Vec<Value> {
    vec![
        json!({
            "_id": 1,
            "label": "order1",
            "isEnabled": true,
            "createdAt": "2024-05-01T10:00:00",
            "characteristics": [
                {"key": "key1", "value": "val11"},
                {"key": "key2", "value": "val21"}
            ],
            "product": {"$ref": "product", "$id": 1}
        }),
        json!({
            "_id": 2,
            "label": "order2",
            "isEnabled": true,
            "createdAt": "2024-05-01T11:00:00",
            "characteristics": [{"key": "key1", "value": "val12"}],
            "product": {"$ref": "product", "$id": 2}
        }),
        json!({
            "_id": 3,
            "label": "order3",
            "isEnabled": false,
            "createdAt": "2024-05-01T09:00:00",
            "characteristics": [{"key": "key2", "value": "val23"}],
            "product": {"$ref": "product", "$id": 3}
        }),
    ]
}

pub fn store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.insert_many(PRODUCTS, products());
    store.insert_many(ORDERS, orders());
    store
}

/// Searchable, orderable column with a blank regex search
pub fn column(data: &str) -> Column {
    Column::new(data)
        .with_searchable(true)
        .with_orderable(true)
        .with_search(Search::new("", true))
}

/// Plain columns of an order: `_id`, label, isEnabled, createdAt and the
/// two characteristic sub-fields (indices 0..=5)
pub fn plain_columns() -> Vec<Column> {
    vec![
        column("_id"),
        column("label"),
        column("isEnabled"),
        column("createdAt"),
        column("characteristics.key"),
        column("characteristics.value"),
    ]
}

/// Plain columns plus the product reference column (index 6)
pub fn reference_columns() -> Vec<Column> {
    let mut columns = plain_columns();
    columns.push(
        Column::reference("product", PRODUCTS, ["label", "isEnabled", "createdAt"])
            .with_searchable(true)
            .with_orderable(true)
            .with_order_field("createdAt")
            .with_search(Search::new("", true)),
    );
    columns
}

/// Labels of the returned rows, in order
pub fn labels(output: &TableOutput<Value>) -> Vec<String> {
    output
        .data
        .iter()
        .filter_map(|row| row["label"].as_str().map(str::to_string))
        .collect()
}

/// Labels of the returned rows, sorted
pub fn label_set(output: &TableOutput<Value>) -> Vec<String> {
    let mut labels = labels(output);
    labels.sort();
    labels
}

/// Store wrapper that records every call and can fail one kind of call
pub struct RecordingStore<'a> {
    inner: MemoryCollection<'a>,
    calls: RefCell<Vec<&'static str>>,
    fail_on: Option<&'static str>,
}

impl<'a> RecordingStore<'a> {
    pub fn new(inner: MemoryCollection<'a>) -> Self {
        Self {
            inner,
            calls: RefCell::new(Vec::new()),
            fail_on: None,
        }
    }

    /// Fails every `count`, `find` or `aggregate` call
    pub fn failing(inner: MemoryCollection<'a>, call: &'static str) -> Self {
        Self {
            fail_on: Some(call),
            ..Self::new(inner)
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: &'static str) -> StoreResult<()> {
        self.calls.borrow_mut().push(call);
        if self.fail_on == Some(call) {
            return Err(StoreError::execution_failed(format!("{} unavailable", call)));
        }
        Ok(())
    }
}

impl StoreExecutor for RecordingStore<'_> {
    fn count(&self, filter: Option<&Filter>) -> StoreResult<u64> {
        self.record("count")?;
        self.inner.count(filter)
    }

    fn find(&self, query: &FindQuery) -> StoreResult<Vec<Value>> {
        self.record("find")?;
        self.inner.find(query)
    }

    fn aggregate(&self, pipeline: &Pipeline) -> StoreResult<Vec<Value>> {
        self.record("aggregate")?;
        self.inner.aggregate(pipeline)
    }
}
