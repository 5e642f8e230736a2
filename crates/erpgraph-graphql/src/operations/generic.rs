//! Generic persistence path for entities without a service handler.
//!
//! Each operation runs in a single storage transaction. Every failure after
//! `begin_transaction` rolls the transaction back before the error is
//! returned, so a failed mutation never leaves a partial write behind.

use erpgraph_core::EntityDefinition;
use erpgraph_storage::{StorageError, Transaction};
use tracing::{trace, warn};

use super::{MutationOutcome, MutationRequest};
use crate::context::GraphQLContext;
use crate::error::GraphQLError;

/// Runs a mutation through the storage layer directly.
///
/// # Errors
///
/// Returns `NotFound` when an update or delete targets a missing row, and
/// `Persistence` for every other storage failure.
pub async fn execute(
    entity: &EntityDefinition,
    request: MutationRequest,
    ctx: &GraphQLContext,
) -> Result<MutationOutcome, GraphQLError> {
    let name = entity.name.as_str();
    let mut tx = ctx
        .storage
        .begin_transaction()
        .await
        .map_err(|e| GraphQLError::persistence(name, e))?;

    let staged = stage(name, request, tx.as_mut()).await;
    let outcome = match staged {
        Ok(outcome) => outcome,
        Err(e) => {
            rollback(name, tx).await;
            return Err(e);
        }
    };

    // A failed commit applies nothing, there is nothing left to undo.
    tx.commit()
        .await
        .map_err(|e| GraphQLError::persistence(name, e))?;

    trace!(entity = name, "Generic mutation committed");
    Ok(outcome)
}

async fn stage(
    entity: &str,
    request: MutationRequest,
    tx: &mut dyn Transaction,
) -> Result<MutationOutcome, GraphQLError> {
    match request {
        MutationRequest::Create { input } => {
            let record = tx
                .add(entity, &input)
                .await
                .map_err(|e| GraphQLError::persistence(entity, e))?;
            Ok(MutationOutcome::Record(record))
        }
        MutationRequest::Update { id, input } => {
            ensure_exists(entity, id, tx).await?;
            let record = tx
                .update(entity, id, &input)
                .await
                .map_err(|e| GraphQLError::persistence(entity, e))?;
            Ok(MutationOutcome::Record(record))
        }
        MutationRequest::Delete { id } => {
            ensure_exists(entity, id, tx).await?;
            tx.remove(entity, id)
                .await
                .map_err(|e| GraphQLError::persistence(entity, e))?;
            Ok(MutationOutcome::Deleted(true))
        }
    }
}

async fn ensure_exists(entity: &str, id: i64, tx: &dyn Transaction) -> Result<(), GraphQLError> {
    match tx.get(entity, id).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) | Err(StorageError::NotFound { .. }) => Err(GraphQLError::NotFound {
            entity: entity.to_string(),
            id,
        }),
        Err(e) => Err(GraphQLError::persistence(entity, e)),
    }
}

async fn rollback(entity: &str, tx: Box<dyn Transaction>) {
    if let Err(e) = tx.rollback().await {
        warn!(entity, error = %e, "Rollback failed");
    }
}
