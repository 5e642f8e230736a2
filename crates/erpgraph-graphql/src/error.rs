//! Error types for GraphQL operations.
//!
//! This module defines the error types used throughout the GraphQL layer.
//! Errors are converted to GraphQL errors carrying an `extensions.code`, and
//! to HTTP responses where they surface outside of query execution.

use async_graphql::ErrorExtensions;
use erpgraph_auth::AuthError;
use erpgraph_storage::StorageError;

use crate::operations::MutationKind;

/// Errors that can occur during GraphQL operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphQLError {
    /// The identifier does not resolve to a row.
    #[error("{entity} not found: id {id}")]
    NotFound {
        /// Entity name.
        entity: String,
        /// Identifier that did not resolve.
        id: i64,
    },

    /// A service handler is registered for the entity but lacks the operation.
    #[error("{entity} service does not support {operation}")]
    UnsupportedOperation {
        /// Entity name.
        entity: String,
        /// The missing operation.
        operation: MutationKind,
    },

    /// A service handler failed.
    #[error("{entity} service failed: {message}")]
    Service {
        /// Entity name.
        entity: String,
        /// Message reported by the handler.
        message: String,
    },

    /// The generic persistence path failed; nothing was applied.
    #[error("Failed to persist {entity}: {source}")]
    Persistence {
        /// Entity name.
        entity: String,
        /// Underlying storage failure.
        #[source]
        source: StorageError,
    },

    /// The permission check denied the operation.
    #[error("Unauthorized: {0}")]
    Unauthorized(#[from] AuthError),

    /// Schema build failed.
    #[error("Failed to build GraphQL schema: {0}")]
    SchemaBuildFailed(String),

    /// Invalid query syntax or arguments.
    #[error("Invalid GraphQL query: {0}")]
    InvalidQuery(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GraphQLError {
    /// Creates a new `Persistence` error.
    #[must_use]
    pub fn persistence(entity: impl Into<String>, source: StorageError) -> Self {
        Self::Persistence {
            entity: entity.into(),
            source,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::UnsupportedOperation { .. } => 501,
            Self::Service { .. } => 422,
            Self::Persistence { source, .. } if source.is_not_found() => 404,
            Self::Persistence { .. } => 500,
            Self::Unauthorized(AuthError::Unauthenticated) => 401,
            Self::Unauthorized(AuthError::Forbidden { .. }) => 403,
            Self::SchemaBuildFailed(_) => 500,
            Self::InvalidQuery(_) => 400,
            Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for GraphQL error extensions.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::UnsupportedOperation { .. } => "UNSUPPORTED_OPERATION",
            Self::Service { .. } => "SERVICE_ERROR",
            Self::Persistence { .. } => "PERSISTENCE_ERROR",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::SchemaBuildFailed(_) => "SCHEMA_BUILD_FAILED",
            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl ErrorExtensions for GraphQLError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| {
            e.set("code", self.error_code());
            match self {
                Self::NotFound { entity, id } => {
                    e.set("entity", entity.clone());
                    e.set("id", *id);
                }
                Self::UnsupportedOperation { entity, operation } => {
                    e.set("entity", entity.clone());
                    e.set("operation", operation.as_str());
                }
                Self::Service { entity, .. } => {
                    e.set("entity", entity.clone());
                }
                Self::Persistence { entity, source } => {
                    e.set("entity", entity.clone());
                    e.set("category", source.category().to_string());
                }
                Self::Unauthorized(auth) => {
                    e.set("reason", auth.error_code());
                }
                _ => {}
            }
        })
    }
}
