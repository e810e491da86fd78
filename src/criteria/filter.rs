//! Filter expressions
//!
//! One representation for both caller-supplied predicate fragments and the
//! fragments emitted by the compilers. The store executor interprets it; the
//! compilers only build and combine it.

use serde_json::{json, Map, Value};

/// Operation applied to a single field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    /// Equality: field = value
    Eq(Value),
    /// Inequality: field != value
    Ne(Value),
    /// Greater than: field > value
    Gt(Value),
    /// Greater than or equal: field >= value
    Gte(Value),
    /// Less than: field < value
    Lt(Value),
    /// Less than or equal: field <= value
    Lte(Value),
    /// Membership: field in values
    In(Vec<Value>),
    /// Pattern match against string values
    Regex {
        pattern: String,
        case_insensitive: bool,
    },
}

impl FieldOp {
    /// Returns the operator name used in the document form
    pub fn op_name(&self) -> &'static str {
        match self {
            FieldOp::Eq(_) => "$eq",
            FieldOp::Ne(_) => "$ne",
            FieldOp::Gt(_) => "$gt",
            FieldOp::Gte(_) => "$gte",
            FieldOp::Lt(_) => "$lt",
            FieldOp::Lte(_) => "$lte",
            FieldOp::In(_) => "$in",
            FieldOp::Regex { .. } => "$regex",
        }
    }

    fn to_document(&self) -> Value {
        match self {
            FieldOp::Eq(value) => value.clone(),
            FieldOp::In(values) => json!({ "$in": values }),
            FieldOp::Regex {
                pattern,
                case_insensitive,
            } => {
                if *case_insensitive {
                    json!({ "$regex": pattern, "$options": "i" })
                } else {
                    json!({ "$regex": pattern })
                }
            }
            FieldOp::Ne(value)
            | FieldOp::Gt(value)
            | FieldOp::Gte(value)
            | FieldOp::Lt(value)
            | FieldOp::Lte(value) => {
                let mut op = Map::new();
                op.insert(self.op_name().into(), value.clone());
                Value::Object(op)
            }
        }
    }
}

/// A boolean filter expression over document fields
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Single field predicate
    Field { field: String, op: FieldOp },
    /// All sub-expressions must match; empty matches everything
    And(Vec<Filter>),
    /// At least one sub-expression must match; empty matches nothing
    Or(Vec<Filter>),
}

impl Filter {
    pub fn field(field: impl Into<String>, op: FieldOp) -> Self {
        Filter::Field {
            field: field.into(),
            op,
        }
    }

    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::field(field, FieldOp::Eq(value))
    }

    pub fn ne(field: impl Into<String>, value: Value) -> Self {
        Self::field(field, FieldOp::Ne(value))
    }

    pub fn gt(field: impl Into<String>, value: Value) -> Self {
        Self::field(field, FieldOp::Gt(value))
    }

    pub fn gte(field: impl Into<String>, value: Value) -> Self {
        Self::field(field, FieldOp::Gte(value))
    }

    pub fn lt(field: impl Into<String>, value: Value) -> Self {
        Self::field(field, FieldOp::Lt(value))
    }

    pub fn lte(field: impl Into<String>, value: Value) -> Self {
        Self::field(field, FieldOp::Lte(value))
    }

    pub fn in_list(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::field(field, FieldOp::In(values))
    }

    /// Case-sensitive pattern match
    pub fn regex(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::field(
            field,
            FieldOp::Regex {
                pattern: pattern.into(),
                case_insensitive: false,
            },
        )
    }

    /// Case-insensitive pattern match
    pub fn regex_ci(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::field(
            field,
            FieldOp::Regex {
                pattern: pattern.into(),
                case_insensitive: true,
            },
        )
    }

    /// AND-combines clauses: none yields `None`, one is returned as-is
    pub fn all(mut clauses: Vec<Filter>) -> Option<Filter> {
        match clauses.len() {
            0 => None,
            1 => clauses.pop(),
            _ => Some(Filter::And(clauses)),
        }
    }

    /// OR-combines clauses: none yields `None`, one is returned as-is
    pub fn any(mut clauses: Vec<Filter>) -> Option<Filter> {
        match clauses.len() {
            0 => None,
            1 => clauses.pop(),
            _ => Some(Filter::Or(clauses)),
        }
    }

    /// Returns every field path referenced anywhere in the expression
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Filter::Field { field, .. } => out.push(field),
            Filter::And(clauses) | Filter::Or(clauses) => {
                for clause in clauses {
                    clause.collect_fields(out);
                }
            }
        }
    }

    /// Returns the field keys of the top-level document form only.
    ///
    /// Fields nested under `$and`/`$or` are not reported.
    pub fn top_level_fields(&self) -> Vec<&str> {
        match self {
            Filter::Field { field, .. } => vec![field.as_str()],
            Filter::And(_) | Filter::Or(_) => Vec::new(),
        }
    }

    /// Renders the expression in document-store query form
    pub fn to_document(&self) -> Value {
        match self {
            Filter::Field { field, op } => {
                let mut doc = Map::new();
                doc.insert(field.clone(), op.to_document());
                Value::Object(doc)
            }
            Filter::And(clauses) => {
                json!({ "$and": clauses.iter().map(Filter::to_document).collect::<Vec<_>>() })
            }
            Filter::Or(clauses) => {
                json!({ "$or": clauses.iter().map(Filter::to_document).collect::<Vec<_>>() })
            }
        }
    }
}
