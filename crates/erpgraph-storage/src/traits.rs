//! Storage traits for the persistence layer.
//!
//! This module defines the contract every storage backend implements: plain
//! reads, and writes grouped into a [`Transaction`] that is either committed
//! or rolled back as a whole.

use async_trait::async_trait;
use erpgraph_core::{FieldValues, Record};

use crate::error::StorageError;

/// The main storage trait that all backends must implement.
///
/// Implementations must be thread-safe (`Send + Sync`).
///
/// # Example
///
/// ```ignore
/// use erpgraph_storage::{EntityStorage, StorageError};
///
/// async fn rename(storage: &dyn EntityStorage, id: i64) -> Result<(), StorageError> {
///     let mut tx = storage.begin_transaction().await?;
///     let values = serde_json::json!({"name": "Pencil"});
///     match tx.update("Product", id, values.as_object().unwrap()).await {
///         Ok(_) => tx.commit().await,
///         Err(e) => {
///             tx.rollback().await?;
///             Err(e)
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait EntityStorage: Send + Sync {
    /// Reads a row by entity name and identifier.
    ///
    /// Returns `None` if the row does not exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::UnknownEntity` for entities the backend does not know.
    async fn get(&self, entity: &str, id: i64) -> Result<Option<Record>, StorageError>;

    /// Returns every committed row of an entity, ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::UnknownEntity` for entities the backend does not know.
    async fn list(&self, entity: &str) -> Result<Vec<Record>, StorageError>;

    /// Begins a new transaction.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::TransactionError` if a transaction cannot be started.
    async fn begin_transaction(&self) -> Result<Box<dyn Transaction>, StorageError>;

    /// Returns the name of this storage backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}

/// A unit of work.
///
/// Writes are invisible to other readers until `commit` succeeds. A failed
/// commit leaves the store exactly as it was before the transaction began.
#[async_trait]
pub trait Transaction: Send + Sync {
    /// Reads a row, seeing writes staged in this transaction.
    async fn get(&self, entity: &str, id: i64) -> Result<Option<Record>, StorageError>;

    /// Adds a new row and assigns its identifier.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidRecord` if the values do not fit the entity.
    async fn add(&mut self, entity: &str, values: &FieldValues) -> Result<Record, StorageError>;

    /// Overwrites the given fields of an existing row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the row does not exist.
    /// Returns `StorageError::InvalidRecord` if the values do not fit the entity.
    async fn update(
        &mut self,
        entity: &str,
        id: i64,
        values: &FieldValues,
    ) -> Result<Record, StorageError>;

    /// Removes a row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the row does not exist.
    async fn remove(&mut self, entity: &str, id: i64) -> Result<(), StorageError>;

    /// Commits all staged writes.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::ConstraintViolation` or `StorageError::TransactionError`
    /// if the writes cannot be applied; nothing is applied in that case.
    async fn commit(self: Box<Self>) -> Result<(), StorageError>;

    /// Discards all staged writes.
    async fn rollback(self: Box<Self>) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test that EntityStorage is object-safe
    fn _assert_storage_object_safe(_: &dyn EntityStorage) {}

    // Compile-time test that Transaction is object-safe
    fn _assert_transaction_object_safe(_: &dyn Transaction) {}
}
