//! Error types for schema construction, derivation and catalog loading.
//!
//! Field-level validation failures are not errors: they are reported as
//! [`Violation`] values inside a `ValidationResult`.

use std::path::PathBuf;
use thiserror::Error;

/// Structural errors raised while building or deriving schemas.
///
/// These indicate a bug in a schema definition and are never produced by
/// validating a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("duplicate field '{field}' in schema '{schema}'")]
    DuplicateField { schema: String, field: String },

    #[error("unknown field '{field}' referenced in schema '{schema}'")]
    UnknownField { schema: String, field: String },

    #[error("invalid pattern /{pattern}/: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("duplicate schema id '{id}'")]
    DuplicateSchema { id: String },

    #[error("unknown schema '{id}'")]
    UnknownSchema { id: String },

    #[error("invalid schema definition: {message}")]
    InvalidDefinition { message: String },
}

impl SchemaError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors while loading a catalog document.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            LoadError::InvalidJson { .. } => 2,
            LoadError::Schema(e) => e.exit_code(),
        }
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Violation {
    /// Name of the offending field (or `$root` for a non-object payload).
    pub field: String,
    /// Tag of the rule that failed: `required`, `not_empty`, `format`,
    /// `type`, `pattern`, `enum` or `whitelist`.
    pub rule: String,
    /// Human-readable error message.
    pub message: String,
}

impl Violation {
    pub fn new(
        field: impl Into<String>,
        rule: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}
