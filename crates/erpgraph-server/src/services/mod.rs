//! Service overrides for the served models.
//!
//! Each service checks the caller's permission before touching storage and
//! runs its writes in a single transaction, rolled back on any failure.

mod product;
mod user;

use std::sync::Arc;

use erpgraph_graphql::{ServiceError, ServiceHandler, ServiceRegistry, ServiceRegistryError};
use erpgraph_storage::{StorageError, Transaction};
use tracing::warn;

use crate::models::{PRODUCT, USER};

pub use product::ProductService;
pub use user::UserService;

/// Registry with every service of this binary.
pub fn registry() -> Result<ServiceRegistry, ServiceRegistryError> {
    ServiceRegistry::builder()
        .register(USER, ServiceHandler::full(Arc::new(UserService)))
        .register(PRODUCT, ServiceHandler::full(Arc::new(ProductService)))
        .build()
}

/// Commits `tx` when `staged` succeeded, rolls it back otherwise.
async fn finish<T>(
    entity: &str,
    tx: Box<dyn Transaction>,
    staged: Result<T, StorageError>,
) -> Result<T, ServiceError> {
    match staged {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = tx.rollback().await {
                warn!(entity, error = %rollback, "Rollback failed");
            }
            Err(e.into())
        }
    }
}

/// Fails with `NotFound` unless row `id` is visible to `tx`.
async fn require_row(
    entity: &str,
    id: i64,
    tx: &dyn Transaction,
) -> Result<(), StorageError> {
    match tx.get(entity, id).await? {
        Some(_) => Ok(()),
        None => Err(StorageError::not_found(entity, id)),
    }
}
