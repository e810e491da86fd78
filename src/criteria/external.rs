//! Caller-supplied predicate fragments

use super::filter::Filter;

/// Predicates supplied alongside a table request.
///
/// `pre_filtering` restricts every count, including the total.
/// `additional` restricts only the filtered count and the returned rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalCriteria {
    pub additional: Option<Filter>,
    pub pre_filtering: Option<Filter>,
}

impl ExternalCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_additional(mut self, filter: Filter) -> Self {
        self.additional = Some(filter);
        self
    }

    pub fn with_pre_filtering(mut self, filter: Filter) -> Self {
        self.pre_filtering = Some(filter);
        self
    }

    /// Iterates over present fragments, additional first
    pub fn fragments(&self) -> impl Iterator<Item = &Filter> {
        self.additional.iter().chain(self.pre_filtering.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.additional.is_none() && self.pre_filtering.is_none()
    }
}
