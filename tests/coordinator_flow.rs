//! Coordinator flow tests
//!
//! Tests the request state machine:
//! - Zero-length and zero-count short circuits issue no further calls
//! - Failures at any step end up in the envelope, never as panics
//! - Simple and aggregation paths agree on the matched rows

mod fixtures;

use doctable::compiler::{FindQuery, Pipeline, ReferenceCompiler, SimpleCompiler};
use doctable::config::TableConfig;
use doctable::coordinator::TableCoordinator;
use doctable::criteria::{ExternalCriteria, Filter};
use doctable::request::{Column, Order, Search, TableRequest};
use doctable::store::{StoreExecutor, StoreResult};
use fixtures::{plain_columns, reference_columns, store, RecordingStore, ORDERS};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn plain_request() -> TableRequest {
    TableRequest::new(plain_columns())
}

fn reference_request() -> TableRequest {
    TableRequest::new(reference_columns())
}

fn sorted_ids(rows: &[Value]) -> Vec<i64> {
    let mut ids: Vec<i64> = rows.iter().filter_map(|r| r["_id"].as_i64()).collect();
    ids.sort();
    ids
}

/// Store answering every call with fixed output
struct CannedStore {
    total: u64,
    aggregate: Vec<Value>,
}

impl StoreExecutor for CannedStore {
    fn count(&self, _filter: Option<&Filter>) -> StoreResult<u64> {
        Ok(self.total)
    }

    fn find(&self, _query: &FindQuery) -> StoreResult<Vec<Value>> {
        Ok(Vec::new())
    }

    fn aggregate(&self, _pipeline: &Pipeline) -> StoreResult<Vec<Value>> {
        Ok(self.aggregate.clone())
    }
}

// =============================================================================
// Short Circuits
// =============================================================================

/// Zero length touches no store.
#[test]
fn test_zero_length_issues_no_calls() {
    let store = store();
    let recording = RecordingStore::new(store.collection(ORDERS));
    let config = TableConfig::default();

    let output = TableCoordinator::new(&recording, &config).find_all(&reference_request().with_page(0, 0));

    assert_eq!(output.records_total, 0);
    assert_eq!(output.records_filtered, 0);
    assert!(output.data.is_empty());
    assert_eq!(output.error, None);
    assert!(recording.calls().is_empty());
}

/// Zero total stops after the first count.
#[test]
fn test_zero_total_stops_after_count() {
    let store = store();
    let recording = RecordingStore::new(store.collection(ORDERS));
    let config = TableConfig::default();
    let criteria = ExternalCriteria::new().with_pre_filtering(Filter::eq("label", json!("none")));

    let coordinator = TableCoordinator::new(&recording, &config);
    let output = coordinator.find_all_with(&plain_request(), &criteria);

    assert_eq!(output.records_total, 0);
    assert_eq!(output.records_filtered, 0);
    assert_eq!(output.error, None);
    assert_eq!(recording.calls(), vec!["count"]);
}

/// Same on the aggregation path.
#[test]
fn test_zero_total_stops_reference_path() {
    let store = store();
    let recording = RecordingStore::new(store.collection("missing"));
    let config = TableConfig::default();

    let output = TableCoordinator::new(&recording, &config).find_all(&reference_request());

    assert_eq!(output.records_total, 0);
    assert_eq!(output.error, None);
    assert_eq!(recording.calls(), vec!["count"]);
}

/// Zero filtered skips the row fetch.
#[test]
fn test_zero_filtered_skips_fetch() {
    let store = store();
    let config = TableConfig::default();

    let recording = RecordingStore::new(store.collection(ORDERS));
    let request = plain_request().with_search(Search::new("nothing", false));
    let output = TableCoordinator::new(&recording, &config).find_all(&request);
    assert_eq!(output.records_total, 3);
    assert_eq!(output.records_filtered, 0);
    assert_eq!(recording.calls(), vec!["count", "count"]);

    let recording = RecordingStore::new(store.collection(ORDERS));
    let request = reference_request().with_search(Search::new("nothing", false));
    let output = TableCoordinator::new(&recording, &config).find_all(&request);
    assert_eq!(output.records_total, 3);
    assert_eq!(output.records_filtered, 0);
    assert_eq!(recording.calls(), vec!["count", "aggregate"]);
}

/// Full runs issue exactly one call per step.
#[test]
fn test_call_sequence() {
    let store = store();
    let config = TableConfig::default();

    let recording = RecordingStore::new(store.collection(ORDERS));
    TableCoordinator::new(&recording, &config).find_all(&plain_request());
    assert_eq!(recording.calls(), vec!["count", "count", "find"]);

    let recording = RecordingStore::new(store.collection(ORDERS));
    TableCoordinator::new(&recording, &config).find_all(&reference_request());
    assert_eq!(recording.calls(), vec!["count", "aggregate", "aggregate"]);
}

// =============================================================================
// Error Reporting
// =============================================================================

/// A failing total count reports the error with empty output.
#[test]
fn test_total_count_failure() {
    let store = store();
    let recording = RecordingStore::failing(store.collection(ORDERS), "count");
    let config = TableConfig::default();

    let output = TableCoordinator::new(&recording, &config).find_all(&plain_request());

    let error = output.error.unwrap_or_default();
    assert!(error.contains("STORE_EXECUTION_FAILED"), "unexpected error: {}", error);
    assert_eq!(output.records_total, 0);
    assert!(output.data.is_empty());
}

/// A failing fetch keeps the counts but no rows.
#[test]
fn test_fetch_failure_keeps_counts() {
    let store = store();
    let recording = RecordingStore::failing(store.collection(ORDERS), "find");
    let config = TableConfig::default();

    let output = TableCoordinator::new(&recording, &config).find_all(&plain_request());

    assert!(output.error.is_some());
    assert_eq!(output.records_total, 3);
    assert_eq!(output.records_filtered, 3);
    assert!(output.data.is_empty());
}

/// A failing pipeline fails the aggregation path.
#[test]
fn test_pipeline_failure() {
    let store = store();
    let recording = RecordingStore::failing(store.collection(ORDERS), "aggregate");
    let config = TableConfig::default();

    let output = TableCoordinator::new(&recording, &config).find_all(&reference_request());

    assert!(output.error.is_some());
    assert_eq!(output.records_total, 3);
    assert_eq!(output.records_filtered, 0);
    assert_eq!(recording.calls(), vec!["count", "aggregate"]);
}

/// An invalid regex search reaches the envelope as a store error.
#[test]
fn test_invalid_regex_reported() {
    let store = store();
    let orders = store.collection(ORDERS);
    let config = TableConfig::default();
    let request = plain_request().with_search(Search::new("(unclosed", true));

    let output = TableCoordinator::new(&orders, &config).find_all(&request);

    let error = output.error.unwrap_or_default();
    assert!(error.contains("STORE_INVALID_PATTERN"), "unexpected error: {}", error);
    assert_eq!(output.records_total, 3);
}

/// A converter failure discards every converted row.
#[test]
fn test_converter_failure() {
    let store = store();
    let orders = store.collection(ORDERS);
    let config = TableConfig::default();
    let request = plain_request().with_order(vec![Order::asc(0)]);

    let output = TableCoordinator::new(&orders, &config).find_all_converted(
        &request,
        &ExternalCriteria::new(),
        |row| match row["_id"].as_i64() {
            Some(3) => Err(format!("cannot convert order {}", 3)),
            Some(id) => Ok(id),
            None => Err("missing id".to_string()),
        },
    );

    let error = output.error.unwrap_or_default();
    assert!(error.contains("cannot convert order 3"), "unexpected error: {}", error);
    assert!(output.data.is_empty());
    assert_eq!(output.records_filtered, 3);
}

/// A reference column without a collection fails compilation.
#[test]
fn test_unbound_reference_reported() {
    let store = store();
    let recording = RecordingStore::new(store.collection(ORDERS));
    let config = TableConfig::default();

    let mut unbound = Column::new("product").with_searchable(true);
    unbound.reference = true;
    let request = TableRequest::new(vec![Column::new("label"), unbound]);

    let output = TableCoordinator::new(&recording, &config).find_all(&request);

    let error = output.error.unwrap_or_default();
    assert!(error.contains("TABLE_REFERENCE_UNBOUND"), "unexpected error: {}", error);
    assert_eq!(recording.calls(), vec!["count"]);
}

/// An alias padding that would nest the join fields fails the reference path
/// but leaves the simple path usable.
#[test]
fn test_dotted_padding_reported() {
    let store = store();
    let config = TableConfig {
        alias_padding: ".".into(),
        ..TableConfig::default()
    };

    let recording = RecordingStore::new(store.collection(ORDERS));
    let output = TableCoordinator::new(&recording, &config).find_all(&reference_request());
    let error = output.error.unwrap_or_default();
    assert!(error.contains("TABLE_INVALID_PADDING"), "unexpected error: {}", error);
    assert_eq!(output.records_total, 3);
    assert!(output.data.is_empty());
    assert_eq!(recording.calls(), vec!["count"]);

    let orders = store.collection(ORDERS);
    let output = TableCoordinator::new(&orders, &config).find_all(&plain_request());
    assert_eq!(output.error, None);
    assert_eq!(output.records_filtered, 3);
}

/// Count pipeline output without the count field is an error.
#[test]
fn test_malformed_count_output() {
    let store = CannedStore {
        total: 3,
        aggregate: vec![json!({"n": 3})],
    };
    let config = TableConfig::default();

    let output = TableCoordinator::new(&store, &config).find_all(&reference_request());

    let error = output.error.unwrap_or_default();
    assert!(error.contains("'count'"), "unexpected error: {}", error);
    assert_eq!(output.records_total, 3);
}

/// No count document means nothing matched.
#[test]
fn test_empty_count_output_is_zero() {
    let store = CannedStore {
        total: 3,
        aggregate: Vec::new(),
    };
    let config = TableConfig::default();

    let output = TableCoordinator::new(&store, &config).find_all(&reference_request());

    assert_eq!(output.error, None);
    assert_eq!(output.records_total, 3);
    assert_eq!(output.records_filtered, 0);
}

// =============================================================================
// Path Equivalence
// =============================================================================

/// Without reference columns both compilers match the same rows.
#[test]
fn test_simple_and_pipeline_agree() {
    let store = store();
    let orders = store.collection(ORDERS);
    let reference = ReferenceCompiler::new(&TableConfig::default()).unwrap();

    let mut column_search = plain_request();
    if let Some(column) = column_search.column_mut("characteristics.key") {
        column.search = Search::new("KEY2", false);
    }
    let requests = vec![
        plain_request(),
        plain_request().with_search(Search::new(" ORDer2  ", false)),
        plain_request().with_search(Search::new("^o\\w+der[13]$", true)),
        plain_request().with_search(Search::new("val1", false)),
        column_search,
    ];

    for request in requests {
        let request = request.with_page(0, -1);
        let criteria = ExternalCriteria::new();

        let query = SimpleCompiler::new().compile_query(&request, &criteria);
        let plan = reference.compile_plan(&request, &criteria).unwrap();

        let found = orders.find(&query).unwrap();
        let aggregated = orders.aggregate(&plan.result).unwrap();
        assert_eq!(sorted_ids(&found), sorted_ids(&aggregated), "search {:?}", request.search);
        assert_eq!(
            orders.count(query.filter.as_ref()).unwrap(),
            orders.aggregate(&plan.count).unwrap().first().map_or(0, |d| d["count"].as_u64().unwrap()),
        );
    }
}

/// The envelope serializes to the table widget wire shape.
#[test]
fn test_output_wire_shape() {
    let store = store();
    let orders = store.collection(ORDERS);
    let config = TableConfig::default();
    let request = plain_request()
        .with_draw(7)
        .with_search(Search::new("order1", false));

    let output = TableCoordinator::new(&orders, &config).find_all_converted(
        &request,
        &ExternalCriteria::new(),
        |row| Ok::<Value, String>(row["label"].clone()),
    );

    assert_eq!(
        serde_json::to_value(&output).unwrap(),
        json!({
            "draw": 7,
            "recordsTotal": 3,
            "recordsFiltered": 1,
            "data": ["order1"]
        })
    );
}
