use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use erpgraph_core::{EntityDefinition, ModelRegistry, Record};
use erpgraph_storage::{EntityStorage, StorageError, Transaction};
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::transaction::InMemoryTransaction;

/// Rows of one entity plus its identifier sequence.
#[derive(Debug)]
pub(crate) struct Table {
    pub(crate) rows: BTreeMap<i64, Record>,
    next_id: i64,
}

impl Table {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Takes the next identifier. Identifiers are never handed out twice.
    pub(crate) fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[derive(Debug)]
pub(crate) struct Inner {
    pub(crate) registry: Arc<ModelRegistry>,
    pub(crate) tables: RwLock<HashMap<String, Table>>,
    pub(crate) fail_commits: AtomicBool,
}

impl Inner {
    pub(crate) fn definition(&self, entity: &str) -> Result<&Arc<EntityDefinition>, StorageError> {
        self.registry
            .get(entity)
            .ok_or_else(|| StorageError::UnknownEntity(entity.to_string()))
    }
}

/// In-memory storage backend.
///
/// This storage implementation provides:
/// - One table per persisted entity of the registry
/// - Per-entity identifier sequences starting at 1
/// - Transactions whose writes are applied atomically on commit
/// - Fault injection for commit failures
#[derive(Debug, Clone)]
pub struct InMemoryStorage {
    pub(crate) inner: Arc<Inner>,
}

impl InMemoryStorage {
    /// Creates a storage with an empty table for every persisted entity.
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        let tables = registry
            .list_entities()
            .keys()
            .map(|name| (name.clone(), Table::new()))
            .collect();

        Self {
            inner: Arc::new(Inner {
                registry,
                tables: RwLock::new(tables),
                fail_commits: AtomicBool::new(false),
            }),
        }
    }

    /// Makes every subsequent commit fail with `StorageError::TransactionError`.
    pub fn set_fail_commits(&self, fail: bool) {
        self.inner.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Number of committed rows of an entity.
    pub async fn count(&self, entity: &str) -> usize {
        let tables = self.inner.tables.read().await;
        tables.get(entity).map_or(0, |t| t.rows.len())
    }

    /// Total number of committed rows across all entities.
    pub async fn total_count(&self) -> usize {
        let tables = self.inner.tables.read().await;
        tables.values().map(|t| t.rows.len()).sum()
    }
}

#[async_trait]
impl EntityStorage for InMemoryStorage {
    async fn get(&self, entity: &str, id: i64) -> Result<Option<Record>, StorageError> {
        self.inner.definition(entity)?;
        let tables = self.inner.tables.read().await;
        Ok(tables.get(entity).and_then(|t| t.rows.get(&id)).cloned())
    }

    async fn list(&self, entity: &str) -> Result<Vec<Record>, StorageError> {
        self.inner.definition(entity)?;
        let tables = self.inner.tables.read().await;
        let rows: Vec<Record> = tables
            .get(entity)
            .map(|t| t.rows.values().cloned().collect())
            .unwrap_or_default();
        trace!(entity, count = rows.len(), "Listed rows");
        Ok(rows)
    }

    async fn begin_transaction(&self) -> Result<Box<dyn Transaction>, StorageError> {
        debug!(backend = self.backend_name(), "Beginning transaction");
        Ok(Box::new(InMemoryTransaction::new(Arc::clone(&self.inner))))
    }

    fn backend_name(&self) -> &'static str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erpgraph_core::{ColumnType, FieldDefinition};
    use serde_json::json;

    fn registry() -> Arc<ModelRegistry> {
        Arc::new(
            ModelRegistry::from_definitions([
                EntityDefinition::new("User", "users")
                    .field(FieldDefinition::identifier("id"))
                    .field(FieldDefinition::new("username", ColumnType::Varchar(Some(80))).unique())
                    .field(FieldDefinition::new("email", ColumnType::Varchar(Some(120))).unique()),
                EntityDefinition::new("Product", "products")
                    .field(FieldDefinition::identifier("id"))
                    .field(FieldDefinition::new("name", ColumnType::Varchar(Some(120))))
                    .field(FieldDefinition::new("price", ColumnType::Integer)),
            ])
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_storage_basic_operations() {
        let storage = InMemoryStorage::new(registry());

        let mut tx = storage.begin_transaction().await.unwrap();
        let created = tx
            .add("Product", json!({"name": "Pen", "price": 2}).as_object().unwrap())
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(created.id, 1);
        assert_eq!(storage.count("Product").await, 1);

        let fetched = storage.get("Product", 1).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert!(storage.get("Product", 2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_orders_by_identifier() {
        let storage = InMemoryStorage::new(registry());
        let mut tx = storage.begin_transaction().await.unwrap();
        for name in ["a", "b", "c"] {
            tx.add("Product", json!({"name": name, "price": 1}).as_object().unwrap())
                .await
                .unwrap();
        }
        tx.commit().await.unwrap();

        let ids: Vec<i64> = storage
            .list("Product")
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(storage.list("User").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_entity() {
        let storage = InMemoryStorage::new(registry());
        assert!(matches!(
            storage.list("Invoice").await,
            Err(StorageError::UnknownEntity(name)) if name == "Invoice"
        ));
        assert!(storage.get("Invoice", 1).await.is_err());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let storage = InMemoryStorage::new(registry());
        let clone = storage.clone();

        let mut tx = clone.begin_transaction().await.unwrap();
        tx.add("Product", json!({"name": "Pen", "price": 2}).as_object().unwrap())
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(storage.total_count().await, 1);
    }
}
