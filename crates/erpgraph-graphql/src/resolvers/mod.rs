//! GraphQL resolvers for entity types.
//!
//! This module provides the resolver factories used by the schema builder:
//! - `list`: `all_<entity>s` queries
//! - `mutation`: `create<Entity>` / `update<Entity>` / `delete<Entity>`
//! - `node`: relay `node(id:)` lookup
//!
//! Every factory takes the entity it serves by value and returns a closure
//! owning its own copy, so fields generated in a loop never share state.

mod list;
mod mutation;
mod node;

pub use list::ListResolver;
pub use mutation::MutationResolver;
pub use node::{NodeResolver, decode_global_id, encode_global_id};

use async_graphql::dynamic::{ResolverContext, ValueAccessor};
use async_graphql::{Error as GraphQLError, Value};
use erpgraph_core::{FieldValues, Record};

use crate::context::GraphQLContext;

/// Helper to extract GraphQL context from resolver context.
pub(crate) fn get_graphql_context<'a>(
    ctx: &'a ResolverContext<'_>,
) -> Result<&'a GraphQLContext, GraphQLError> {
    ctx.data::<GraphQLContext>()
        .map_err(|_| GraphQLError::new("GraphQL context not available"))
}

/// Returns the row an object field is being resolved on.
pub(crate) fn parent_record<'a>(ctx: &'a ResolverContext<'_>) -> Result<&'a Record, GraphQLError> {
    ctx.parent_value.try_downcast_ref::<Record>()
}

/// Convert a serde_json::Value to async_graphql::Value.
pub(crate) fn json_to_graphql_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Boolean(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else if let Some(f) = n.as_f64() {
                Value::Number(
                    async_graphql::Number::from_f64(f)
                        .unwrap_or_else(|| async_graphql::Number::from(0)),
                )
            } else {
                Value::Null
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => {
            Value::List(arr.into_iter().map(json_to_graphql_value).collect())
        }
        serde_json::Value::Object(obj) => {
            let map: async_graphql::indexmap::IndexMap<async_graphql::Name, Value> = obj
                .into_iter()
                .map(|(k, v)| (async_graphql::Name::new(k), json_to_graphql_value(v)))
                .collect();
            Value::Object(map)
        }
    }
}

/// Converts a ValueAccessor to serde_json::Value.
pub(crate) fn value_accessor_to_json(
    value: &ValueAccessor<'_>,
) -> Result<serde_json::Value, GraphQLError> {
    if value.is_null() {
        return Ok(serde_json::Value::Null);
    }

    if let Ok(b) = value.boolean() {
        return Ok(serde_json::Value::Bool(b));
    }

    if let Ok(i) = value.i64() {
        return Ok(serde_json::Value::Number(i.into()));
    }

    if let Ok(f) = value.f64() {
        return Ok(serde_json::json!(f));
    }

    if let Ok(s) = value.string() {
        return Ok(serde_json::Value::String(s.to_string()));
    }

    if let Ok(list) = value.list() {
        let items: Result<Vec<serde_json::Value>, GraphQLError> =
            list.iter().map(|v| value_accessor_to_json(&v)).collect();
        return Ok(serde_json::Value::Array(items?));
    }

    if let Ok(obj) = value.object() {
        let mut map = serde_json::Map::new();
        for (k, v) in obj.iter() {
            map.insert(k.to_string(), value_accessor_to_json(&v)?);
        }
        return Ok(serde_json::Value::Object(map));
    }

    Ok(serde_json::Value::Null)
}

/// Reads an `<Entity>Input` argument into field values.
///
/// Fields the client omitted are absent; explicit nulls are kept.
pub(crate) fn input_to_field_values(
    input: &ValueAccessor<'_>,
) -> Result<FieldValues, GraphQLError> {
    match value_accessor_to_json(input)? {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(GraphQLError::new("Invalid input: expected object")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_to_graphql_value_primitives() {
        assert!(matches!(json_to_graphql_value(json!(null)), Value::Null));
        assert!(matches!(
            json_to_graphql_value(json!(true)),
            Value::Boolean(true)
        ));
        assert!(matches!(json_to_graphql_value(json!(42)), Value::Number(_)));
        assert!(matches!(
            json_to_graphql_value(json!("hello")),
            Value::String(s) if s == "hello"
        ));
    }

    #[test]
    fn test_json_to_graphql_value_complex() {
        assert!(matches!(
            json_to_graphql_value(json!([1, 2, 3])),
            Value::List(_)
        ));
        assert!(matches!(
            json_to_graphql_value(json!({"name": "Pen"})),
            Value::Object(_)
        ));
    }

    #[test]
    fn test_json_float_roundtrips_as_number() {
        let value = json_to_graphql_value(json!(2.5));
        assert!(matches!(value, Value::Number(n) if n.as_f64() == Some(2.5)));
    }
}
