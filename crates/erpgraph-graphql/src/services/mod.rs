//! Per-entity service overrides.
//!
//! A [`ServiceHandler`] carries business rules for one entity. It may provide
//! any subset of create, update and delete; the mutation dispatcher delegates
//! to whichever is present and reports the rest as unsupported.
//!
//! Services are responsible for their own permission checks and rollback.

mod registry;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use erpgraph_auth::AuthError;
use erpgraph_core::{FieldValues, Record};
use erpgraph_storage::StorageError;

use crate::context::GraphQLContext;
use crate::operations::MutationKind;

pub use registry::{ServiceRegistry, ServiceRegistryBuilder, ServiceRegistryError};

/// Failure reported by a service handler.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The permission check denied the operation.
    #[error(transparent)]
    Unauthorized(#[from] AuthError),

    /// A storage call made by the service failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A business rule rejected the operation.
    #[error("{0}")]
    Failed(String),
}

impl ServiceError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Service override for entity creation.
#[async_trait]
pub trait CreateService: Send + Sync {
    /// Persists a new row built from `input` and returns it with its identifier.
    async fn create(&self, input: FieldValues, ctx: &GraphQLContext)
    -> Result<Record, ServiceError>;
}

/// Service override for entity updates.
#[async_trait]
pub trait UpdateService: Send + Sync {
    /// Applies `input` to the row `id` and returns the updated row.
    async fn update(
        &self,
        id: i64,
        input: FieldValues,
        ctx: &GraphQLContext,
    ) -> Result<Record, ServiceError>;
}

/// Service override for entity deletion.
#[async_trait]
pub trait DeleteService: Send + Sync {
    /// Removes the row `id`, returning `true` on confirmed removal.
    async fn delete(&self, id: i64, ctx: &GraphQLContext) -> Result<bool, ServiceError>;
}

/// Optional create, update and delete overrides for one entity.
#[derive(Clone, Default)]
pub struct ServiceHandler {
    pub create: Option<Arc<dyn CreateService>>,
    pub update: Option<Arc<dyn UpdateService>>,
    pub delete: Option<Arc<dyn DeleteService>>,
}

impl ServiceHandler {
    /// A handler with no operations.
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler delegating all three operations to one service.
    pub fn full<S>(service: Arc<S>) -> Self
    where
        S: CreateService + UpdateService + DeleteService + 'static,
    {
        Self {
            create: Some(service.clone() as Arc<dyn CreateService>),
            update: Some(service.clone() as Arc<dyn UpdateService>),
            delete: Some(service as Arc<dyn DeleteService>),
        }
    }

    pub fn with_create(mut self, service: Arc<dyn CreateService>) -> Self {
        self.create = Some(service);
        self
    }

    pub fn with_update(mut self, service: Arc<dyn UpdateService>) -> Self {
        self.update = Some(service);
        self
    }

    pub fn with_delete(mut self, service: Arc<dyn DeleteService>) -> Self {
        self.delete = Some(service);
        self
    }

    /// Whether the handler implements the given operation.
    pub fn supports(&self, kind: MutationKind) -> bool {
        match kind {
            MutationKind::Create => self.create.is_some(),
            MutationKind::Update => self.update.is_some(),
            MutationKind::Delete => self.delete.is_some(),
        }
    }

    /// Operations the handler implements, in create/update/delete order.
    pub fn operations(&self) -> Vec<MutationKind> {
        MutationKind::ALL
            .into_iter()
            .filter(|kind| self.supports(*kind))
            .collect()
    }
}

impl fmt::Debug for ServiceHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceHandler")
            .field("create", &self.create.is_some())
            .field("update", &self.update.is_some())
            .field("delete", &self.delete.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    #[async_trait]
    impl CreateService for Noop {
        async fn create(
            &self,
            _input: FieldValues,
            _ctx: &GraphQLContext,
        ) -> Result<Record, ServiceError> {
            Err(ServiceError::failed("noop"))
        }
    }

    #[async_trait]
    impl UpdateService for Noop {
        async fn update(
            &self,
            _id: i64,
            _input: FieldValues,
            _ctx: &GraphQLContext,
        ) -> Result<Record, ServiceError> {
            Err(ServiceError::failed("noop"))
        }
    }

    #[async_trait]
    impl DeleteService for Noop {
        async fn delete(&self, _id: i64, _ctx: &GraphQLContext) -> Result<bool, ServiceError> {
            Ok(false)
        }
    }

    #[test]
    fn test_partial_handler() {
        let handler = ServiceHandler::new().with_create(Arc::new(Noop));
        assert!(handler.supports(MutationKind::Create));
        assert!(!handler.supports(MutationKind::Update));
        assert!(!handler.supports(MutationKind::Delete));
        assert_eq!(handler.operations(), vec![MutationKind::Create]);
    }

    #[test]
    fn test_full_handler() {
        let handler = ServiceHandler::full(Arc::new(Noop));
        assert_eq!(handler.operations(), MutationKind::ALL.to_vec());
    }

    #[test]
    fn test_service_error_from_auth() {
        let err: ServiceError = AuthError::Unauthenticated.into();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
        assert_eq!(err.to_string(), "Authentication required");
    }
}
