//! Mutation resolvers.
//!
//! Handles `create<Entity>`, `update<Entity>` and `delete<Entity>`:
//!
//! ```graphql
//! mutation {
//!   createProduct(input: {name: "Pen", price: 2}) { obj { dbId name price } }
//!   updateProduct(id: 1, input: {price: 3}) { obj { price } }
//!   deleteProduct(id: 1) { success }
//! }
//! ```
//!
//! The resolver only decodes arguments; dispatch happens in
//! [`crate::operations::execute`]. The payload object is resolved on the
//! resulting [`MutationOutcome`].

use std::sync::Arc;

use async_graphql::ErrorExtensions;
use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};
use erpgraph_core::EntityDefinition;
use tracing::trace;

use super::{get_graphql_context, input_to_field_values};
use crate::operations::{self, MutationKind, MutationOutcome, MutationRequest};

/// Resolver for generated mutations.
pub struct MutationResolver;

impl MutationResolver {
    /// Creates the resolver for one operation on one entity.
    pub fn resolve(
        entity: Arc<EntityDefinition>,
        kind: MutationKind,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let entity = Arc::clone(&entity);
            FieldFuture::new(async move {
                let request = parse_request(&ctx, kind)?;
                trace!(entity = %entity.name, operation = %kind, "Decoded mutation arguments");

                let gql_ctx = get_graphql_context(&ctx)?;
                let outcome = operations::execute(&entity, request, gql_ctx)
                    .await
                    .map_err(|e| e.extend())?;

                Ok(Some(FieldValue::owned_any(outcome)))
            })
        }
    }

    /// Resolves the `obj` field of create/update payloads.
    pub fn resolve_obj(ctx: ResolverContext<'_>) -> FieldFuture<'_> {
        FieldFuture::new(async move {
            let outcome = ctx.parent_value.try_downcast_ref::<MutationOutcome>()?;
            Ok(outcome
                .record()
                .map(|record| FieldValue::owned_any(record.clone())))
        })
    }

    /// Resolves the `success` field of delete payloads.
    pub fn resolve_success(ctx: ResolverContext<'_>) -> FieldFuture<'_> {
        FieldFuture::new(async move {
            let outcome = ctx.parent_value.try_downcast_ref::<MutationOutcome>()?;
            Ok(outcome
                .deleted()
                .map(|success| FieldValue::value(async_graphql::Value::Boolean(success))))
        })
    }
}

fn parse_request(
    ctx: &ResolverContext<'_>,
    kind: MutationKind,
) -> Result<MutationRequest, async_graphql::Error> {
    let id = || {
        ctx.args
            .get("id")
            .and_then(|v| v.i64().ok())
            .ok_or_else(|| async_graphql::Error::new("Missing required argument 'id'"))
    };
    let input = || {
        let value = ctx
            .args
            .get("input")
            .ok_or_else(|| async_graphql::Error::new("Missing required argument 'input'"))?;
        input_to_field_values(&value)
    };

    Ok(match kind {
        MutationKind::Create => MutationRequest::Create { input: input()? },
        MutationKind::Update => MutationRequest::Update {
            id: id()?,
            input: input()?,
        },
        MutationKind::Delete => MutationRequest::Delete { id: id()? },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use erpgraph_core::FieldDefinition;

    #[test]
    fn test_mutation_resolvers_created() {
        let entity = Arc::new(
            EntityDefinition::new("Product", "products").field(FieldDefinition::identifier("id")),
        );
        for kind in MutationKind::ALL {
            let _resolver = MutationResolver::resolve(Arc::clone(&entity), kind);
        }
    }
}
