//! Sort keys

use serde_json::{Map, Value};

use crate::request::Direction;

/// Sort direction of a compiled sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }

    /// Numeric form used by document stores (1 / -1)
    pub fn as_i32(&self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

impl From<Direction> for SortDirection {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::Asc => SortDirection::Ascending,
            Direction::Desc => SortDirection::Descending,
        }
    }
}

/// A single sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Field to sort by
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Renders sort keys as an ordered `{field: 1 | -1}` document
pub fn sort_document(keys: &[SortKey]) -> Value {
    let mut doc = Map::new();
    for key in keys {
        doc.insert(key.field.clone(), Value::from(key.direction.as_i32()));
    }
    Value::Object(doc)
}
