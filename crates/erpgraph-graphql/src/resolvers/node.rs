//! Relay node lookup.
//!
//! Every exposed type implements `interface Node { id: ID! }`. The global id
//! is the base64 encoding of `<TypeName>:<id>`, so `node(id:)` can find the
//! entity without a separate type argument.

use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::ErrorExtensions;
use async_graphql::dynamic::{FieldFuture, FieldValue, ResolverContext};
use base64::{Engine, engine::general_purpose::STANDARD};
use erpgraph_core::EntityDefinition;
use tracing::debug;

use super::get_graphql_context;
use crate::error::GraphQLError;

/// Encodes a relay global id.
pub fn encode_global_id(type_name: &str, id: i64) -> String {
    STANDARD.encode(format!("{type_name}:{id}"))
}

/// Decodes a relay global id into its type name and identifier.
pub fn decode_global_id(global_id: &str) -> Option<(String, i64)> {
    let decoded = STANDARD.decode(global_id).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (type_name, id) = decoded.split_once(':')?;
    Some((type_name.to_string(), id.parse().ok()?))
}

/// Resolver for `node(id: ID!)`.
pub struct NodeResolver;

impl NodeResolver {
    /// Creates the resolver over a map from exposed type name to entity.
    pub fn resolve(
        types: Arc<HashMap<String, Arc<EntityDefinition>>>,
    ) -> impl Fn(ResolverContext<'_>) -> FieldFuture<'_> + Send + Sync + Clone {
        move |ctx| {
            let types = Arc::clone(&types);
            FieldFuture::new(async move {
                let global_id = ctx
                    .args
                    .get("id")
                    .and_then(|v| v.string().ok())
                    .ok_or_else(|| async_graphql::Error::new("Missing required argument 'id'"))?;

                let Some((type_name, id)) = decode_global_id(global_id) else {
                    return Err(GraphQLError::InvalidQuery(format!(
                        "Malformed node id: {global_id}"
                    ))
                    .extend());
                };

                // Unknown type names resolve to null like missing rows.
                let Some(entity) = types.get(&type_name) else {
                    debug!(type_name = %type_name, "Node id names an unknown type");
                    return Ok(None);
                };

                let gql_ctx = get_graphql_context(&ctx)?;
                let record = gql_ctx
                    .storage
                    .get(&entity.name, id)
                    .await
                    .map_err(|e| GraphQLError::persistence(&entity.name, e).extend())?;

                debug!(entity = %entity.name, id, found = record.is_some(), "Resolved node");
                Ok(record.map(|r| FieldValue::owned_any(r).with_type(type_name)))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_id_roundtrip() {
        let global_id = encode_global_id("ProductType", 42);
        assert_eq!(global_id, "UHJvZHVjdFR5cGU6NDI=");
        assert_eq!(
            decode_global_id(&global_id),
            Some(("ProductType".to_string(), 42))
        );
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(decode_global_id("not base64!"), None);
        assert_eq!(decode_global_id(&STANDARD.encode("ProductType")), None);
        assert_eq!(decode_global_id(&STANDARD.encode("ProductType:x")), None);
    }
}
