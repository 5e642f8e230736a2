//! List-all resolver.
//!
//! Implements `all_<entity>s` queries. The resolver returns every committed
//! row of its entity, with no filtering, pagination or sorting beyond the
//! storage's identifier order.

use std::sync::Arc;

use async_graphql::ErrorExtensions;
use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};
use erpgraph_core::EntityDefinition;
use tracing::{debug, warn};

use super::get_graphql_context;
use crate::error::GraphQLError;

/// Resolver for list-all queries.
pub struct ListResolver;

impl ListResolver {
    /// Creates a resolver listing every row of `entity`.
    pub fn resolve(
        entity: Arc<EntityDefinition>,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let entity = Arc::clone(&entity);
            FieldFuture::new(async move {
                let gql_ctx = get_graphql_context(&ctx)?;

                let records = gql_ctx.storage.list(&entity.name).await.map_err(|e| {
                    warn!(entity = %entity.name, error = %e, "Storage error listing rows");
                    GraphQLError::persistence(&entity.name, e).extend()
                })?;

                debug!(
                    entity = %entity.name,
                    count = records.len(),
                    "Resolved list query"
                );

                Ok(Some(FieldValue::list(
                    records.into_iter().map(FieldValue::owned_any),
                )))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erpgraph_core::FieldDefinition;

    #[test]
    fn test_list_resolver_created() {
        let entity = Arc::new(
            EntityDefinition::new("Product", "products").field(FieldDefinition::identifier("id")),
        );
        let _resolver = ListResolver::resolve(entity);
    }
}
