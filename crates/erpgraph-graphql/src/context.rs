//! GraphQL execution context.
//!
//! This module provides the context struct that holds all dependencies needed
//! by GraphQL resolvers. The context is constructed per-request and contains
//! both shared state (storage, services, permissions) and request-specific
//! state (actor, request id).
//!
//! # Example
//!
//! ```ignore
//! use erpgraph_graphql::GraphQLContextBuilder;
//!
//! let context = GraphQLContextBuilder::new()
//!     .with_storage(storage.clone())
//!     .with_services(services.clone())
//!     .with_permissions(permissions.clone())
//!     .with_actor(Some(actor))
//!     .with_request_id("req-123")
//!     .build()?;
//! ```

use std::sync::Arc;

use erpgraph_auth::{Action, Actor, AuthError, DynPermissionChecker};
use erpgraph_storage::DynStorage;

use crate::services::ServiceRegistry;

/// GraphQL execution context.
///
/// The context is `Clone` and `Send + Sync`, using `Arc` for shared state.
#[derive(Clone)]
pub struct GraphQLContext {
    /// Entity storage.
    pub storage: DynStorage,

    /// Per-entity service overrides.
    pub services: Arc<ServiceRegistry>,

    /// Permission checker consulted by service handlers.
    pub permissions: DynPermissionChecker,

    /// Caller of the current request (None for anonymous).
    pub actor: Option<Actor>,

    /// Request ID for tracing and correlation.
    pub request_id: String,
}

impl GraphQLContext {
    /// Returns whether the request carries an actor.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.actor.is_some()
    }

    /// Returns the actor ID if present.
    #[must_use]
    pub fn actor_id(&self) -> Option<&str> {
        self.actor.as_ref().map(|a| a.id.as_str())
    }

    /// Runs the permission check for the current actor.
    ///
    /// # Errors
    ///
    /// Returns the checker's denial unchanged.
    pub async fn check_permission(&self, action: Action, resource: &str) -> Result<(), AuthError> {
        self.permissions
            .check(self.actor.as_ref(), action, resource)
            .await
    }

    /// Creates a new builder for GraphQLContext.
    #[must_use]
    pub fn builder() -> GraphQLContextBuilder {
        GraphQLContextBuilder::default()
    }
}

/// Builder for constructing GraphQLContext.
///
/// This builder validates that all required fields are provided before
/// creating the context.
#[derive(Default)]
pub struct GraphQLContextBuilder {
    storage: Option<DynStorage>,
    services: Option<Arc<ServiceRegistry>>,
    permissions: Option<DynPermissionChecker>,
    actor: Option<Actor>,
    request_id: Option<String>,
}

impl GraphQLContextBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the storage backend.
    #[must_use]
    pub fn with_storage(mut self, storage: DynStorage) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Sets the service registry.
    #[must_use]
    pub fn with_services(mut self, services: Arc<ServiceRegistry>) -> Self {
        self.services = Some(services);
        self
    }

    /// Sets the permission checker.
    #[must_use]
    pub fn with_permissions(mut self, permissions: DynPermissionChecker) -> Self {
        self.permissions = Some(permissions);
        self
    }

    /// Sets the request actor.
    #[must_use]
    pub fn with_actor(mut self, actor: Option<Actor>) -> Self {
        self.actor = actor;
        self
    }

    /// Sets the request ID.
    #[must_use]
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Builds the GraphQLContext.
    ///
    /// A missing service registry defaults to an empty one.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing.
    pub fn build(self) -> Result<GraphQLContext, ContextBuilderError> {
        let storage = self
            .storage
            .ok_or(ContextBuilderError::MissingField("storage"))?;

        let permissions = self
            .permissions
            .ok_or(ContextBuilderError::MissingField("permissions"))?;

        let request_id = self
            .request_id
            .ok_or(ContextBuilderError::MissingField("request_id"))?;

        Ok(GraphQLContext {
            storage,
            services: self
                .services
                .unwrap_or_else(|| Arc::new(ServiceRegistry::empty())),
            permissions,
            actor: self.actor,
            request_id,
        })
    }
}

/// Errors that can occur when building a GraphQLContext.
#[derive(Debug, thiserror::Error)]
pub enum ContextBuilderError {
    /// A required field was not provided.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}
