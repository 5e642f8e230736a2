//! In-memory storage backend for erpgraph.
//!
//! This crate provides an in-memory implementation of the `EntityStorage` trait
//! from `erpgraph-storage`. Every persisted entity of a [`ModelRegistry`] gets
//! its own table; writes are staged in a transaction and applied on commit.
//!
//! # Example
//!
//! ```ignore
//! use erpgraph_db_memory::InMemoryStorage;
//! use erpgraph_storage::EntityStorage;
//!
//! let storage = InMemoryStorage::new(registry);
//!
//! let mut tx = storage.begin_transaction().await?;
//! let values = serde_json::json!({"name": "Pen", "price": 2});
//! let created = tx.add("Product", values.as_object().unwrap()).await?;
//! tx.commit().await?;
//! ```
//!
//! [`ModelRegistry`]: erpgraph_core::ModelRegistry

pub mod storage;
pub mod transaction;

// Re-export the storage traits for convenience
pub use erpgraph_storage::{DynStorage, EntityStorage, StorageError, Transaction};

pub use storage::InMemoryStorage;
pub use transaction::InMemoryTransaction;

/// Creates a new shareable in-memory storage instance.
pub fn create_storage(registry: std::sync::Arc<erpgraph_core::ModelRegistry>) -> DynStorage {
    std::sync::Arc::new(InMemoryStorage::new(registry))
}
