//! Transactions for the in-memory backend.
//!
//! Writes are kept in an overlay keyed by `(entity, id)` and only reach the
//! shared tables when [`Transaction::commit`] succeeds. Commit re-validates the
//! overlay against the committed state under the write lock, so a failed
//! commit leaves every table untouched.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use erpgraph_core::{FieldValues, Record};
use erpgraph_storage::{StorageError, Transaction};
use tracing::{debug, trace, warn};

use crate::storage::{Inner, Table};

type RowKey = (String, i64);

#[derive(Debug, Clone)]
enum Staged {
    Put(Record),
    Deleted,
}

/// A transaction against [`InMemoryStorage`](crate::InMemoryStorage).
///
/// Dropping it without committing discards every staged write.
#[derive(Debug)]
pub struct InMemoryTransaction {
    inner: Arc<Inner>,
    staged: BTreeMap<RowKey, Staged>,
    created: BTreeSet<RowKey>,
}

impl InMemoryTransaction {
    pub(crate) fn new(inner: Arc<Inner>) -> Self {
        Self {
            inner,
            staged: BTreeMap::new(),
            created: BTreeSet::new(),
        }
    }

    /// Number of rows touched by staged writes.
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    async fn current(&self, entity: &str, id: i64) -> Option<Record> {
        match self.staged.get(&(entity.to_string(), id)) {
            Some(Staged::Put(record)) => Some(record.clone()),
            Some(Staged::Deleted) => None,
            None => {
                let tables = self.inner.tables.read().await;
                tables.get(entity).and_then(|t| t.rows.get(&id)).cloned()
            }
        }
    }

    /// Checks the staged writes against the committed tables.
    fn validate(&self, tables: &HashMap<String, Table>) -> Result<(), StorageError> {
        for (entity, id) in self.staged.keys() {
            if self.created.contains(&(entity.clone(), *id)) {
                continue;
            }
            let exists = tables.get(entity).is_some_and(|t| t.rows.contains_key(id));
            if !exists {
                return Err(StorageError::not_found(entity, *id));
            }
        }

        let touched: BTreeSet<&str> = self.staged.keys().map(|(e, _)| e.as_str()).collect();
        for entity in touched {
            let definition = self.inner.definition(entity)?;
            let unique_fields: Vec<&str> = definition
                .data_fields()
                .filter(|f| f.unique)
                .map(|f| f.name.as_str())
                .collect();
            if unique_fields.is_empty() {
                continue;
            }

            let mut rows: BTreeMap<i64, &Record> = tables
                .get(entity)
                .map(|t| t.rows.iter().map(|(id, r)| (*id, r)).collect())
                .unwrap_or_default();
            for ((staged_entity, id), staged) in &self.staged {
                if staged_entity != entity {
                    continue;
                }
                match staged {
                    Staged::Put(record) => {
                        rows.insert(*id, record);
                    }
                    Staged::Deleted => {
                        rows.remove(id);
                    }
                }
            }

            for field in unique_fields {
                let mut seen = BTreeSet::new();
                for record in rows.values() {
                    let Some(value) = record.get(field).filter(|v| !v.is_null()) else {
                        continue;
                    };
                    let rendered = value.to_string();
                    if !seen.insert(rendered.clone()) {
                        return Err(StorageError::ConstraintViolation {
                            entity: entity.to_string(),
                            field: field.to_string(),
                            value: rendered,
                        });
                    }
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Transaction for InMemoryTransaction {
    async fn get(&self, entity: &str, id: i64) -> Result<Option<Record>, StorageError> {
        self.inner.definition(entity)?;
        Ok(self.current(entity, id).await)
    }

    async fn add(&mut self, entity: &str, values: &FieldValues) -> Result<Record, StorageError> {
        let definition = self.inner.definition(entity)?;
        definition
            .check_values(values, false)
            .map_err(|e| StorageError::invalid_record(entity, e))?;

        let id = {
            let mut tables = self.inner.tables.write().await;
            let table = tables
                .get_mut(entity)
                .ok_or_else(|| StorageError::UnknownEntity(entity.to_string()))?;
            table.allocate_id()
        };

        let record = Record::new(entity, id, values.clone());
        trace!(entity, id, "Staged add");
        self.staged
            .insert((entity.to_string(), id), Staged::Put(record.clone()));
        self.created.insert((entity.to_string(), id));
        Ok(record)
    }

    async fn update(
        &mut self,
        entity: &str,
        id: i64,
        values: &FieldValues,
    ) -> Result<Record, StorageError> {
        let definition = self.inner.definition(entity)?;
        let mut record = self
            .current(entity, id)
            .await
            .ok_or_else(|| StorageError::not_found(entity, id))?;
        definition
            .check_values(values, true)
            .map_err(|e| StorageError::invalid_record(entity, e))?;

        record.apply(values);
        trace!(entity, id, "Staged update");
        self.staged
            .insert((entity.to_string(), id), Staged::Put(record.clone()));
        Ok(record)
    }

    async fn remove(&mut self, entity: &str, id: i64) -> Result<(), StorageError> {
        self.inner.definition(entity)?;
        if self.current(entity, id).await.is_none() {
            return Err(StorageError::not_found(entity, id));
        }
        trace!(entity, id, "Staged remove");
        self.staged.insert((entity.to_string(), id), Staged::Deleted);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StorageError> {
        if self.inner.fail_commits.load(Ordering::SeqCst) {
            warn!(staged = self.staged.len(), "Commit rejected by fault injection");
            return Err(StorageError::transaction_error("commit failed (injected)"));
        }

        let this = *self;
        let inner = Arc::clone(&this.inner);
        let mut tables = inner.tables.write().await;
        if let Err(e) = this.validate(&tables) {
            warn!(error = %e, "Commit failed validation, nothing applied");
            return Err(e);
        }

        let writes = this.staged.len();
        for ((entity, id), staged) in this.staged {
            let Some(table) = tables.get_mut(&entity) else {
                return Err(StorageError::UnknownEntity(entity));
            };
            match staged {
                Staged::Put(record) => {
                    table.rows.insert(id, record);
                }
                Staged::Deleted => {
                    table.rows.remove(&id);
                }
            }
        }

        debug!(writes, "Transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StorageError> {
        debug!(discarded = self.staged.len(), "Transaction rolled back");
        Ok(())
    }
}
