//! Error types for recsql

use crate::clause::ClauseKind;
use thiserror::Error;

/// Result type alias for recsql operations
pub type RecResult<T> = Result<T, RecError>;

/// Error types for clause construction and statement execution
#[derive(Debug, Error)]
pub enum RecError {
    /// The value handed to the introspector is not a struct with named fields
    #[error("Invalid record kind: expected a struct with named fields, got {kind}")]
    InvalidRecordKind { kind: String },

    /// A builder produced no participating fields where some were required
    #[error("Empty clause: {clause} has no participating fields")]
    EmptyClause { clause: ClauseKind },

    /// Placeholder count does not match the bound value count
    #[error("Mismatched arity: {placeholders} placeholder(s) but {values} value(s)")]
    MismatchedArity { placeholders: usize, values: usize },

    /// Field value could not be serialized while capturing a record
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },
}

impl RecError {
    /// Create an invalid record kind error
    pub fn invalid_record_kind(kind: impl Into<String>) -> Self {
        Self::InvalidRecordKind { kind: kind.into() }
    }

    /// Create an empty clause error
    pub fn empty_clause(clause: ClauseKind) -> Self {
        Self::EmptyClause { clause }
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Check if this is an invalid record kind error
    pub fn is_invalid_record_kind(&self) -> bool {
        matches!(self, Self::InvalidRecordKind { .. })
    }

    /// Check if this is an empty clause error
    pub fn is_empty_clause(&self) -> bool {
        matches!(self, Self::EmptyClause { .. })
    }

    /// Check if this is a mismatched arity error
    pub fn is_mismatched_arity(&self) -> bool {
        matches!(self, Self::MismatchedArity { .. })
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl serde::ser::Error for RecError {
    fn custom<T: std::fmt::Display>(msg: T) -> Self {
        Self::Serialization(msg.to_string())
    }
}
