//! In-memory document store
//!
//! Collections are ordered lists of JSON documents. Queries and pipelines
//! are evaluated directly against them, which makes the store usable as a
//! reference executor and as a test fixture.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::errors::{StoreError, StoreResult};
use super::filters::{values_equal, CompiledFilter};
use super::sorter::DocumentSorter;
use super::StoreExecutor;
use crate::compiler::{Expression, FindQuery, Lookup, Pipeline, Projection, Stage};
use crate::criteria::Filter;

const ID_FIELD: &str = "_id";

/// Named collections of JSON documents
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: BTreeMap<String, Vec<Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a document to a collection, creating it when absent
    pub fn insert(&mut self, collection: &str, document: Value) {
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }

    pub fn insert_many<I>(&mut self, collection: &str, documents: I)
    where
        I: IntoIterator<Item = Value>,
    {
        for document in documents {
            self.insert(collection, document);
        }
    }

    /// Returns an executor bound to one collection
    pub fn collection(&self, name: &str) -> MemoryCollection<'_> {
        MemoryCollection {
            store: self,
            name: name.to_string(),
        }
    }

    /// Documents of a collection; unknown collections are empty
    pub fn documents(&self, collection: &str) -> &[Value] {
        self.collections
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Executor over a single collection of a [`MemoryStore`]
#[derive(Debug, Clone)]
pub struct MemoryCollection<'a> {
    store: &'a MemoryStore,
    name: String,
}

impl MemoryCollection<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn filtered(&self, filter: Option<&Filter>) -> StoreResult<Vec<Value>> {
        let compiled = CompiledFilter::optional(filter)?;
        Ok(self
            .store
            .documents(&self.name)
            .iter()
            .filter(|doc| compiled.as_ref().map_or(true, |f| f.matches(doc)))
            .cloned()
            .collect())
    }

    fn run_stage(&self, stage: &Stage, rows: Vec<Value>) -> StoreResult<Vec<Value>> {
        match stage {
            Stage::Match(filter) => {
                let compiled = CompiledFilter::new(filter)?;
                Ok(rows.into_iter().filter(|doc| compiled.matches(doc)).collect())
            }
            Stage::Project(projection) => rows
                .iter()
                .map(|doc| project(doc, projection))
                .collect(),
            Stage::Lookup(lookup) => Ok(rows
                .into_iter()
                .map(|doc| self.lookup(doc, lookup))
                .collect()),
            Stage::Sort(keys) => {
                let mut rows = rows;
                DocumentSorter::sort(&mut rows, keys);
                Ok(rows)
            }
            Stage::Skip(n) => Ok(rows.into_iter().skip(to_usize(*n)).collect()),
            Stage::Limit(n) => Ok(rows.into_iter().take(to_usize(*n)).collect()),
            Stage::Count(field) => {
                if rows.is_empty() {
                    return Ok(Vec::new());
                }
                let mut doc = Map::new();
                doc.insert(field.clone(), Value::from(rows.len() as u64));
                Ok(vec![Value::Object(doc)])
            }
        }
    }

    /// Left-outer join: always sets `as_field`, possibly to an empty array
    fn lookup(&self, mut doc: Value, lookup: &Lookup) -> Value {
        let local = get_path(&doc, &lookup.local_field).unwrap_or(&Value::Null);
        let joined: Vec<Value> = self
            .store
            .documents(&lookup.from)
            .iter()
            .filter(|foreign| {
                let key = get_path(foreign, &lookup.foreign_field).unwrap_or(&Value::Null);
                values_equal(key, local)
            })
            .cloned()
            .collect();

        set_path(&mut doc, &lookup.as_field, Value::Array(joined));
        doc
    }
}

impl StoreExecutor for MemoryCollection<'_> {
    fn count(&self, filter: Option<&Filter>) -> StoreResult<u64> {
        Ok(self.filtered(filter)?.len() as u64)
    }

    fn find(&self, query: &FindQuery) -> StoreResult<Vec<Value>> {
        let mut rows = self.filtered(query.filter.as_ref())?;
        DocumentSorter::sort(&mut rows, &query.sort);

        let rows = rows.into_iter().skip(to_usize(query.skip));
        Ok(match query.limit {
            Some(limit) => rows.take(to_usize(limit)).collect(),
            None => rows.collect(),
        })
    }

    fn aggregate(&self, pipeline: &Pipeline) -> StoreResult<Vec<Value>> {
        let mut rows = self.store.documents(&self.name).to_vec();
        for stage in pipeline.stages() {
            rows = self.run_stage(stage, rows)?;
        }
        Ok(rows)
    }
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

/// Keeps `_id` and the included paths, then sets the computed field
fn project(doc: &Value, projection: &Projection) -> StoreResult<Value> {
    let mut out = Value::Object(Map::new());

    if let Some(id) = get_path(doc, ID_FIELD) {
        set_path(&mut out, ID_FIELD, id.clone());
    }
    for field in &projection.include {
        if let Some(value) = get_path(doc, field) {
            set_path(&mut out, field, value.clone());
        }
    }
    if let Some(value) = evaluate(doc, &projection.expression)? {
        set_path(&mut out, &projection.field, value);
    }

    Ok(out)
}

/// Evaluates an expression; `None` leaves the field unset
fn evaluate(doc: &Value, expression: &Expression) -> StoreResult<Option<Value>> {
    match expression {
        Expression::Field(path) => Ok(get_path(doc, path).cloned()),
        Expression::ObjectToArray(path) => match get_path(doc, path) {
            None | Some(Value::Null) => Ok(Some(Value::Null)),
            Some(Value::Object(map)) => {
                let pairs = map
                    .iter()
                    .map(|(k, v)| {
                        let mut pair = Map::new();
                        pair.insert("k".into(), Value::String(k.clone()));
                        pair.insert("v".into(), v.clone());
                        Value::Object(pair)
                    })
                    .collect();
                Ok(Some(Value::Array(pairs)))
            }
            Some(_) => Err(StoreError::execution_failed(format!(
                "$objectToArray requires a document input at '{}'",
                path
            ))),
        },
        Expression::ArrayElemAt(path, index) => match get_path(doc, path) {
            None | Some(Value::Null) => Ok(Some(Value::Null)),
            Some(Value::Array(items)) => Ok(element_at(items, *index).cloned()),
            Some(_) => Err(StoreError::execution_failed(format!(
                "$arrayElemAt requires an array at '{}'",
                path
            ))),
        },
    }
}

fn element_at(items: &[Value], index: i64) -> Option<&Value> {
    let len = i64::try_from(items.len()).ok()?;
    let position = if index < 0 { len + index } else { index };
    usize::try_from(position).ok().and_then(|p| items.get(p))
}

/// Walks nested objects along a dotted path
pub(crate) fn get_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(doc, |current, segment| current.as_object()?.get(segment))
}

/// Sets a value at a dotted path, creating intermediate objects
pub(crate) fn set_path(doc: &mut Value, path: &str, value: Value) {
    let mut segments = path.split('.').peekable();
    let mut current = doc;

    while let Some(segment) = segments.next() {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let map = match current {
            Value::Object(map) => map,
            _ => return,
        };

        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}
