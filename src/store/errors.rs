//! Store error types
//!
//! Error codes:
//! - STORE_INVALID_PATTERN
//! - STORE_EXECUTION_FAILED

use std::fmt;

/// Store-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// A regex filter did not compile
    StoreInvalidPattern,
    /// A query or pipeline stage could not be evaluated
    StoreExecutionFailed,
}

impl StoreErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StoreErrorCode::StoreInvalidPattern => "STORE_INVALID_PATTERN",
            StoreErrorCode::StoreExecutionFailed => "STORE_EXECUTION_FAILED",
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Store error with context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    code: StoreErrorCode,
    message: String,
}

impl StoreError {
    /// Create an invalid pattern error
    pub fn invalid_pattern(pattern: &str, reason: impl fmt::Display) -> Self {
        Self {
            code: StoreErrorCode::StoreInvalidPattern,
            message: format!("Invalid pattern '{}': {}", pattern, reason),
        }
    }

    /// Create an execution failed error
    pub fn execution_failed(reason: impl Into<String>) -> Self {
        Self {
            code: StoreErrorCode::StoreExecutionFailed,
            message: reason.into(),
        }
    }

    pub fn code(&self) -> StoreErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for StoreError {}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
