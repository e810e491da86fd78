//! Request binding errors

use thiserror::Error;

/// Result type for request binding
pub type RequestResult<T> = Result<T, RequestError>;

/// Errors raised while binding or validating a table request
#[derive(Debug, Error)]
pub enum RequestError {
    /// Request body is not valid JSON for this shape
    #[error("Invalid request body: {0}")]
    Json(#[from] serde_json::Error),

    /// Request has no columns
    #[error("Request must declare at least one column")]
    NoColumns,

    /// Column field path is blank
    #[error("Column {0} has a blank data field")]
    BlankField(usize),

    /// Page length below -1
    #[error("Length {0} is invalid (must be >= -1)")]
    InvalidLength(i64),

    /// Reference column without a target collection
    #[error("Reference column '{0}' does not name a collection")]
    MissingReferenceCollection(String),
}
