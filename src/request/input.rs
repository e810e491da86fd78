//! Paged table request model
//!
//! Mirrors the wire shape sent by table widgets: a draw counter, a page
//! window, a global search, sort directives and per-column metadata.
//! Column and order indices are not trusted; lookups return `None` instead
//! of failing.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::errors::{RequestError, RequestResult};

/// Sort direction requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

/// A search term, either a plain value or a raw regex
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Search {
    /// Search value (may be blank)
    #[serde(default)]
    pub value: String,
    /// Treat `value` as a raw, case-sensitive pattern
    #[serde(default)]
    pub regex: bool,
}

impl Search {
    pub fn new(value: impl Into<String>, regex: bool) -> Self {
        Self {
            value: value.into(),
            regex,
        }
    }

    /// Returns true if the value contains a non-whitespace character
    pub fn has_text(&self) -> bool {
        !self.value.trim().is_empty()
    }
}

/// A single sort directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Position of the sorted column in `columns` (unchecked)
    pub column: usize,
    pub dir: Direction,
}

impl Order {
    pub fn new(column: usize, dir: Direction) -> Self {
        Self { column, dir }
    }

    pub fn asc(column: usize) -> Self {
        Self::new(column, Direction::Asc)
    }

    pub fn desc(column: usize) -> Self {
        Self::new(column, Direction::Desc)
    }
}

/// Column metadata
///
/// A reference column holds a pointer to a document in another collection.
/// It is resolved through a join before it can be searched or sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    /// Dot-separated document path, unique within a request
    pub data: String,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub searchable: bool,
    #[serde(default)]
    pub orderable: bool,
    #[serde(default)]
    pub search: Search,
    #[serde(default)]
    pub reference: bool,
    /// Collection holding the referenced documents
    #[serde(default)]
    pub reference_collection: Option<String>,
    /// Fields of the referenced document matched by searches
    #[serde(default, alias = "referenceColumns")]
    pub reference_fields: BTreeSet<String>,
    /// Field of the referenced document used for sorting
    #[serde(default, alias = "referenceOrderColumn")]
    pub reference_order_field: Option<String>,
}

impl Column {
    /// Creates a plain column that is neither searchable nor orderable
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }

    /// Creates a reference column resolved against `collection`
    pub fn reference(
        data: impl Into<String>,
        collection: impl Into<String>,
        fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            data: data.into(),
            reference: true,
            reference_collection: Some(collection.into()),
            reference_fields: fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    pub fn with_orderable(mut self, orderable: bool) -> Self {
        self.orderable = orderable;
        self
    }

    pub fn with_search(mut self, search: Search) -> Self {
        self.search = search;
        self
    }

    pub fn with_order_field(mut self, field: impl Into<String>) -> Self {
        self.reference_order_field = Some(field.into());
        self
    }

    /// Returns true if sort directives on this column are honored.
    ///
    /// A reference column without an order field is never orderable.
    pub fn is_orderable(&self) -> bool {
        self.orderable && (!self.reference || self.reference_order_field.is_some())
    }

    /// Returns true if a per-column search applies
    pub fn has_column_search(&self) -> bool {
        self.searchable && self.search.has_text()
    }

    /// Returns true if a join must be synthesized for this column
    pub fn needs_resolution(&self) -> bool {
        self.reference && (self.searchable || self.is_orderable())
    }

    /// Returns the first segment of the field path
    pub fn base_field(&self) -> &str {
        self.data.split('.').next().unwrap_or(&self.data)
    }
}

fn default_draw() -> u32 {
    1
}

fn default_length() -> i64 {
    10
}

/// A paged table request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRequest {
    /// Draw counter, echoed back in the response
    #[serde(default = "default_draw")]
    pub draw: u32,
    /// Index of the first row of the page
    #[serde(default)]
    pub start: u64,
    /// Page size; -1 means no limit
    #[serde(default = "default_length")]
    pub length: i64,
    /// Global search applied across searchable columns
    #[serde(default)]
    pub search: Search,
    #[serde(default)]
    pub order: Vec<Order>,
    pub columns: Vec<Column>,
}

impl TableRequest {
    /// Creates a request for the first page with no search or ordering
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            draw: default_draw(),
            start: 0,
            length: default_length(),
            search: Search::default(),
            order: Vec::new(),
            columns,
        }
    }

    /// Parses a request from its JSON wire form and validates it
    pub fn from_json(json: &str) -> RequestResult<Self> {
        let request: TableRequest = serde_json::from_str(json)?;
        request.validate()?;
        Ok(request)
    }

    pub fn with_draw(mut self, draw: u32) -> Self {
        self.draw = draw;
        self
    }

    pub fn with_page(mut self, start: u64, length: i64) -> Self {
        self.start = start;
        self.length = length;
        self
    }

    pub fn with_search(mut self, search: Search) -> Self {
        self.search = search;
        self
    }

    pub fn with_order(mut self, order: Vec<Order>) -> Self {
        self.order = order;
        self
    }

    /// Returns the column at `index`, or `None` when out of bounds
    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Returns the column with the given field path.
    ///
    /// When the path is duplicated the last column wins.
    pub fn column(&self, field: &str) -> Option<&Column> {
        self.columns.iter().rev().find(|c| c.data == field)
    }

    /// Mutable variant of [`TableRequest::column`]
    pub fn column_mut(&mut self, field: &str) -> Option<&mut Column> {
        self.columns.iter_mut().rev().find(|c| c.data == field)
    }

    /// Returns true if any column is a reference column
    pub fn has_reference_columns(&self) -> bool {
        self.columns.iter().any(|c| c.reference)
    }

    /// Iterates over reference columns
    pub fn reference_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.reference)
    }

    /// Page size, `None` when unlimited
    pub fn limit(&self) -> Option<u64> {
        u64::try_from(self.length).ok()
    }

    /// Checks the guarantees normally provided by the binding layer
    pub fn validate(&self) -> RequestResult<()> {
        if self.length < -1 {
            return Err(RequestError::InvalidLength(self.length));
        }
        if self.columns.is_empty() {
            return Err(RequestError::NoColumns);
        }
        for (index, column) in self.columns.iter().enumerate() {
            if column.data.trim().is_empty() {
                return Err(RequestError::BlankField(index));
            }
            let unbound = column
                .reference_collection
                .as_deref()
                .map_or(true, |c| c.trim().is_empty());
            if column.reference && unbound {
                return Err(RequestError::MissingReferenceCollection(column.data.clone()));
            }
        }
        Ok(())
    }
}
