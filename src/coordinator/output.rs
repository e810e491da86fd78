//! Response envelope

use serde::Serialize;

/// Paged table response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableOutput<R> {
    /// Echoed from the request
    pub draw: u32,
    /// Rows matching the pre-filtering criteria
    pub records_total: u64,
    /// Rows matching every filter
    pub records_filtered: u64,
    pub data: Vec<R>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<R> TableOutput<R> {
    pub fn new(draw: u32) -> Self {
        Self {
            draw,
            records_total: 0,
            records_filtered: 0,
            data: Vec::new(),
            error: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
