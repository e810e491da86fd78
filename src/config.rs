//! Table query configuration
//!
//! Controls the naming and layout details of compiled reference pipelines,
//! the strictness of the external predicate pre-check, and the log level.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{Logger, Severity};

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid JSON for this shape
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is present but unusable
    #[error("Invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Configuration shared by the compilers and the coordinator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Position of the identifier pair in an object-to-array reference (default: 1)
    #[serde(default = "default_reference_id_position")]
    pub reference_id_position: i64,

    /// Appended to a reference field path until its alias is free (default: "_")
    #[serde(default = "default_alias_padding")]
    pub alias_padding: String,

    /// Output field of the count stage (default: "count")
    #[serde(default = "default_count_field")]
    pub count_field: String,

    /// Scan external predicates recursively for reference fields (default: true)
    #[serde(default = "default_check_nested_predicates")]
    pub check_nested_predicates: bool,

    /// Minimum severity written by the logger (default: INFO)
    #[serde(default)]
    pub log_level: Severity,
}

fn default_reference_id_position() -> i64 {
    1
}

fn default_alias_padding() -> String {
    "_".to_string()
}

fn default_count_field() -> String {
    "count".to_string()
}

fn default_check_nested_predicates() -> bool {
    true
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            reference_id_position: default_reference_id_position(),
            alias_padding: default_alias_padding(),
            count_field: default_count_field(),
            check_nested_predicates: default_check_nested_predicates(),
            log_level: Severity::default(),
        }
    }
}

impl TableConfig {
    /// Parses and validates a JSON config document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: TableConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Sets the process-wide logger threshold to `log_level`
    pub fn apply_log_level(&self) {
        Logger::set_min_severity(self.log_level);
    }

    /// Rejects values the compilers cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(reason) = alias_padding_problem(&self.alias_padding) {
            return Err(ConfigError::Invalid {
                field: "alias_padding",
                reason: reason.into(),
            });
        }
        if self.count_field.is_empty() || self.count_field.contains('.') {
            return Err(ConfigError::Invalid {
                field: "count_field",
                reason: "must be a non-empty top-level field name".into(),
            });
        }
        if self.count_field.starts_with('$') {
            return Err(ConfigError::Invalid {
                field: "count_field",
                reason: "must not start with '$'".into(),
            });
        }
        Ok(())
    }
}

/// Returns why a padding cannot build top-level alias names, if it cannot
pub(crate) fn alias_padding_problem(padding: &str) -> Option<&'static str> {
    // An empty padding would never lengthen the alias candidate
    if padding.is_empty() {
        Some("must not be empty")
    } else if padding.contains('.') {
        Some("must not contain '.'")
    } else if padding.starts_with('$') {
        Some("must not start with '$'")
    } else {
        None
    }
}
