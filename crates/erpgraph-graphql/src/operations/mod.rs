//! Mutation dispatch.
//!
//! Every generated mutation funnels into [`execute`], which picks one of three
//! paths for the entity:
//!
//! - a service handler implementing the operation: delegate to it
//! - a service handler lacking create or update: `UnsupportedOperation`
//! - no service handler, or one lacking delete: the generic persistence
//!   path in [`generic`]

pub mod generic;

use std::fmt;

use erpgraph_auth::Action;
use erpgraph_core::{EntityDefinition, FieldValues, Record};
use tracing::{debug, info, warn};

use crate::context::GraphQLContext;
use crate::error::GraphQLError;
use crate::services::{ServiceError, ServiceHandler};

/// The three generated mutation operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    pub const ALL: [MutationKind; 3] = [Self::Create, Self::Update, Self::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Permission action guarding this operation.
    pub fn action(&self) -> Action {
        match self {
            Self::Create => Action::Create,
            Self::Update => Action::Update,
            Self::Delete => Action::Delete,
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments of one mutation call.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationRequest {
    Create { input: FieldValues },
    Update { id: i64, input: FieldValues },
    Delete { id: i64 },
}

impl MutationRequest {
    pub fn kind(&self) -> MutationKind {
        match self {
            Self::Create { .. } => MutationKind::Create,
            Self::Update { .. } => MutationKind::Update,
            Self::Delete { .. } => MutationKind::Delete,
        }
    }

    /// Target identifier, `None` for create.
    pub fn id(&self) -> Option<i64> {
        match self {
            Self::Create { .. } => None,
            Self::Update { id, .. } | Self::Delete { id } => Some(*id),
        }
    }
}

/// Result of a successful mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// The created or updated row.
    Record(Record),
    /// Whether the row was removed.
    Deleted(bool),
}

impl MutationOutcome {
    pub fn record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            Self::Deleted(_) => None,
        }
    }

    pub fn deleted(&self) -> Option<bool> {
        match self {
            Self::Deleted(success) => Some(*success),
            Self::Record(_) => None,
        }
    }
}

/// Runs one mutation against an entity.
///
/// The service registry is consulted on every call, never at schema build time.
///
/// # Errors
///
/// - `UnsupportedOperation` when a handler exists without create or update
/// - `Service` / `Unauthorized` when the handler fails
/// - `NotFound` / `Persistence` from the generic path
pub async fn execute(
    entity: &EntityDefinition,
    request: MutationRequest,
    ctx: &GraphQLContext,
) -> Result<MutationOutcome, GraphQLError> {
    let kind = request.kind();
    debug!(
        entity = %entity.name,
        operation = %kind,
        id = ?request.id(),
        request_id = %ctx.request_id,
        "Executing mutation"
    );

    let result = match ctx.services.lookup(&entity.name) {
        Some(handler) => delegate(entity, handler, request, ctx).await,
        None => generic::execute(entity, request, ctx).await,
    };

    match &result {
        Ok(_) => info!(entity = %entity.name, operation = %kind, "Mutation succeeded"),
        Err(e) => warn!(
            entity = %entity.name,
            operation = %kind,
            code = e.error_code(),
            error = %e,
            "Mutation failed"
        ),
    }
    result
}

async fn delegate(
    entity: &EntityDefinition,
    handler: &ServiceHandler,
    request: MutationRequest,
    ctx: &GraphQLContext,
) -> Result<MutationOutcome, GraphQLError> {
    let unsupported = |operation| GraphQLError::UnsupportedOperation {
        entity: entity.name.clone(),
        operation,
    };
    let service_error = |e| map_service_error(&entity.name, e);

    match request {
        MutationRequest::Create { input } => {
            let service = handler
                .create
                .as_ref()
                .ok_or_else(|| unsupported(MutationKind::Create))?;
            service
                .create(input, ctx)
                .await
                .map(MutationOutcome::Record)
                .map_err(service_error)
        }
        MutationRequest::Update { id, input } => {
            let service = handler
                .update
                .as_ref()
                .ok_or_else(|| unsupported(MutationKind::Update))?;
            service
                .update(id, input, ctx)
                .await
                .map(MutationOutcome::Record)
                .map_err(service_error)
        }
        MutationRequest::Delete { id } => match handler.delete.as_ref() {
            Some(service) => service
                .delete(id, ctx)
                .await
                .map(MutationOutcome::Deleted)
                .map_err(service_error),
            None => {
                debug!(entity = %entity.name, id, "No delete service, using generic path");
                generic::execute(entity, MutationRequest::Delete { id }, ctx).await
            }
        },
    }
}

fn map_service_error(entity: &str, error: ServiceError) -> GraphQLError {
    match error {
        ServiceError::Unauthorized(auth) => GraphQLError::Unauthorized(auth),
        other => GraphQLError::Service {
            entity: entity.to_string(),
            message: other.to_string(),
        },
    }
}
