//! Compiler error types
//!
//! Error codes:
//! - TABLE_REFERENCE_UNBOUND
//! - TABLE_ALIAS_UNRESOLVED
//! - TABLE_INVALID_PADDING

use std::fmt;

/// Compiler-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorCode {
    /// Reference column without a target collection
    TableReferenceUnbound,
    /// No free alias could be generated for a reference column
    TableAliasUnresolved,
    /// Alias padding that cannot form a top-level field name
    TableInvalidPadding,
}

impl CompileErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            CompileErrorCode::TableReferenceUnbound => "TABLE_REFERENCE_UNBOUND",
            CompileErrorCode::TableAliasUnresolved => "TABLE_ALIAS_UNRESOLVED",
            CompileErrorCode::TableInvalidPadding => "TABLE_INVALID_PADDING",
        }
    }
}

impl fmt::Display for CompileErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Compiler error with context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    code: CompileErrorCode,
    message: String,
    field: String,
}

impl CompileError {
    /// Create a reference unbound error
    pub fn reference_unbound(field: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: CompileErrorCode::TableReferenceUnbound,
            message: format!("Reference column '{}' does not name a collection", f),
            field: f,
        }
    }

    /// Create an alias unresolved error
    pub fn alias_unresolved(field: impl Into<String>) -> Self {
        let f = field.into();
        Self {
            code: CompileErrorCode::TableAliasUnresolved,
            message: format!("No free alias for reference column '{}'", f),
            field: f,
        }
    }

    /// Create an invalid padding error; `field` holds the padding
    pub fn invalid_padding(padding: impl Into<String>, reason: &str) -> Self {
        let p = padding.into();
        Self {
            code: CompileErrorCode::TableInvalidPadding,
            message: format!("Alias padding '{}' {}", p, reason),
            field: p,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> CompileErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the column field path
    pub fn field(&self) -> &str {
        &self.field
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CompileError {}

/// Result type for compiler operations
pub type CompileResult<T> = Result<T, CompileError>;
