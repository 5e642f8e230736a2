//! Storage error types for the persistence layer.
//!
//! This module defines all error types that can occur during storage operations.

use std::fmt;

use erpgraph_core::CoreError;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested row was not found.
    #[error("{entity} not found: id {id}")]
    NotFound {
        /// The entity of the missing row.
        entity: String,
        /// The identifier that did not resolve.
        id: i64,
    },

    /// The entity is not known to this storage backend.
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    /// The submitted values do not fit the entity definition.
    #[error("Invalid {entity} record: {source}")]
    InvalidRecord {
        /// The entity being written.
        entity: String,
        /// The underlying definition check failure.
        #[source]
        source: CoreError,
    },

    /// A unique constraint was violated.
    #[error("Constraint violation on {entity}.{field}: value {value} already exists")]
    ConstraintViolation {
        /// The entity being written.
        entity: String,
        /// The unique field.
        field: String,
        /// The conflicting value.
        value: String,
    },

    /// An error occurred while committing or rolling back a transaction.
    #[error("Transaction error: {message}")]
    TransactionError {
        /// Description of the transaction error.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(entity: impl Into<String>, id: i64) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id,
        }
    }

    /// Creates a new `InvalidRecord` error.
    #[must_use]
    pub fn invalid_record(entity: impl Into<String>, source: CoreError) -> Self {
        Self::InvalidRecord {
            entity: entity.into(),
            source,
        }
    }

    /// Creates a new `TransactionError` error.
    #[must_use]
    pub fn transaction_error(message: impl Into<String>) -> Self {
        Self::TransactionError {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::ConstraintViolation { .. } => ErrorCategory::Conflict,
            Self::UnknownEntity(_) | Self::InvalidRecord { .. } => ErrorCategory::Validation,
            Self::TransactionError { .. } => ErrorCategory::Transaction,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of storage errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Row not found.
    NotFound,
    /// Unique constraint conflict.
    Conflict,
    /// Validation error.
    Validation,
    /// Transaction-related error.
    Transaction,
    /// Internal error.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Validation => write!(f, "validation"),
            Self::Transaction => write!(f, "transaction"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
