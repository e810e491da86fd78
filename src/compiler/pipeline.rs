//! Aggregation pipeline descriptors
//!
//! Stages are plain data. The store executor decides how to run them;
//! `to_document` renders the usual document-store stage syntax.

use serde_json::{json, Map, Value};

use crate::criteria::{sort_document, Filter, SortKey};

/// Computed value of a projected field
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Object at the path as an array of `{k, v}` pairs
    ObjectToArray(String),
    /// Element of the array at the path; negative indices count from the end
    ArrayElemAt(String, i64),
    /// Value at the path
    Field(String),
}

impl Expression {
    fn to_document(&self) -> Value {
        match self {
            Expression::ObjectToArray(path) => json!({ "$objectToArray": format!("${}", path) }),
            Expression::ArrayElemAt(path, index) => {
                json!({ "$arrayElemAt": [format!("${}", path), index] })
            }
            Expression::Field(path) => Value::String(format!("${}", path)),
        }
    }
}

/// Projection keeping `include` (and `_id`) plus one computed field
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub include: Vec<String>,
    pub field: String,
    pub expression: Expression,
}

/// Left-outer join against another collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    pub from: String,
    pub local_field: String,
    pub foreign_field: String,
    /// Field receiving the array of joined documents
    pub as_field: String,
}

/// A single pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(Filter),
    Project(Projection),
    Lookup(Lookup),
    Sort(Vec<SortKey>),
    Skip(u64),
    Limit(u64),
    /// Replaces the input with one `{field: n}` document; emits nothing for no input
    Count(String),
}

impl Stage {
    /// Returns the stage name for explain output
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Match(_) => "$match",
            Stage::Project(_) => "$project",
            Stage::Lookup(_) => "$lookup",
            Stage::Sort(_) => "$sort",
            Stage::Skip(_) => "$skip",
            Stage::Limit(_) => "$limit",
            Stage::Count(_) => "$count",
        }
    }

    /// Renders the stage in document-store syntax
    pub fn to_document(&self) -> Value {
        let body = match self {
            Stage::Match(filter) => filter.to_document(),
            Stage::Project(projection) => {
                let mut document = Map::new();
                for field in &projection.include {
                    document.insert(field.clone(), Value::from(1));
                }
                document.insert(projection.field.clone(), projection.expression.to_document());
                Value::Object(document)
            }
            Stage::Lookup(lookup) => json!({
                "from": lookup.from,
                "localField": lookup.local_field,
                "foreignField": lookup.foreign_field,
                "as": lookup.as_field,
            }),
            Stage::Sort(keys) => sort_document(keys),
            Stage::Skip(n) | Stage::Limit(n) => Value::from(*n),
            Stage::Count(field) => Value::String(field.clone()),
        };

        let mut doc = Map::new();
        doc.insert(self.name().into(), body);
        Value::Object(doc)
    }
}

/// An ordered sequence of stages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    pub fn push(&mut self, stage: Stage) {
        self.stages.push(stage);
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Renders the pipeline as an array of stage documents
    pub fn to_document(&self) -> Value {
        Value::Array(self.stages.iter().map(Stage::to_document).collect())
    }
}
