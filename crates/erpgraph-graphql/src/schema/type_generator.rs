//! Exposed type generation.
//!
//! One [`ExposedType`] is generated per entity and memoized in a
//! [`TypeCache`] for the life of the process. Callers compare instances with
//! `Arc::ptr_eq`: asking for the same entity twice yields the same `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::Value;
use async_graphql::dynamic::{Field, FieldFuture, InterfaceField, Object, TypeRef};
use erpgraph_core::{EntityDefinition, FieldDefinition};
use parking_lot::RwLock;
use tracing::{debug, trace};

use super::naming::{self, NODE_INTERFACE};
use crate::resolvers::{encode_global_id, json_to_graphql_value, parent_record};

/// Externally queryable shape of one entity.
#[derive(Debug)]
pub struct ExposedType {
    name: String,
    entity: Arc<EntityDefinition>,
}

impl ExposedType {
    fn new(name: String, entity: Arc<EntityDefinition>) -> Self {
        Self { name, entity }
    }

    /// GraphQL type name, e.g. `ProductType`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entity(&self) -> &Arc<EntityDefinition> {
        &self.entity
    }

    /// Builds the dynamic object registered in the schema.
    ///
    /// ```graphql
    /// type ProductType implements Node {
    ///   id: ID!
    ///   dbId: Int!
    ///   name: String!
    ///   price: Int!
    /// }
    /// ```
    pub fn to_object(&self) -> Object {
        let type_name = self.name.clone();
        let mut obj = Object::new(&self.name)
            .description(format!("{} entity", self.entity.name))
            .implement(NODE_INTERFACE)
            .field(
                Field::new("id", TypeRef::named_nn(TypeRef::ID), move |ctx| {
                    let type_name = type_name.clone();
                    FieldFuture::new(async move {
                        let record = parent_record(&ctx)?;
                        Ok(Some(Value::String(encode_global_id(&type_name, record.id))))
                    })
                })
                .description("Globally unique node identifier"),
            )
            .field(
                Field::new("dbId", TypeRef::named_nn(TypeRef::INT), |ctx| {
                    FieldFuture::new(async move {
                        let record = parent_record(&ctx)?;
                        Ok(Some(Value::from(record.id)))
                    })
                })
                .description(format!(
                    "Value of the {} column",
                    self.entity.identifier_name()
                )),
            );

        for field in self.entity.data_fields() {
            trace!(type_name = %self.name, field = %field.name, "Adding exposed field");
            obj = obj.field(data_field(field));
        }

        obj
    }
}

fn data_field(field: &FieldDefinition) -> Field {
    let scalar = naming::scalar_name(field.column_type);
    let type_ref = if field.nullable {
        TypeRef::named(scalar)
    } else {
        TypeRef::named_nn(scalar)
    };

    let field_name = field.name.clone();
    Field::new(&field.name, type_ref, move |ctx| {
        let field_name = field_name.clone();
        FieldFuture::new(async move {
            let record = parent_record(&ctx)?;
            Ok(record.get(&field_name).cloned().map(json_to_graphql_value))
        })
    })
    .description(field.column_type.sql_name())
}

/// The `Node` interface every exposed type implements.
pub fn node_interface() -> async_graphql::dynamic::Interface {
    async_graphql::dynamic::Interface::new(NODE_INTERFACE)
        .description("An object with a globally unique ID")
        .field(InterfaceField::new("id", TypeRef::named_nn(TypeRef::ID)))
}

/// Process-wide memo of exposed types, keyed by type name.
///
/// Reads take a shared lock. The first request for a type takes the write
/// lock and re-checks before inserting, so concurrent first access still
/// produces a single instance.
#[derive(Debug, Default)]
pub struct TypeCache {
    types: RwLock<HashMap<String, Arc<ExposedType>>>,
}

impl TypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached exposed type for `entity`, generating it on first use.
    pub fn get_or_create_type(&self, entity: &Arc<EntityDefinition>) -> Arc<ExposedType> {
        let name = naming::type_name(&entity.name);

        if let Some(existing) = self.types.read().get(&name) {
            trace!(type_name = %name, "Exposed type cache hit");
            return Arc::clone(existing);
        }

        let mut types = self.types.write();
        let exposed = types.entry(name.clone()).or_insert_with(|| {
            debug!(
                type_name = %name,
                fields = entity.data_fields().count(),
                "Generating exposed type"
            );
            Arc::new(ExposedType::new(name.clone(), Arc::clone(entity)))
        });
        Arc::clone(exposed)
    }

    /// Looks up an already generated type by GraphQL name.
    pub fn get(&self, type_name: &str) -> Option<Arc<ExposedType>> {
        self.types.read().get(type_name).cloned()
    }

    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erpgraph_core::ColumnType;

    fn product() -> Arc<EntityDefinition> {
        Arc::new(
            EntityDefinition::new("Product", "products")
                .field(FieldDefinition::identifier("id"))
                .field(FieldDefinition::new("name", ColumnType::Varchar(Some(120))))
                .field(FieldDefinition::new("price", ColumnType::Integer)),
        )
    }

    #[test]
    fn test_get_or_create_returns_same_instance() {
        let cache = TypeCache::new();
        let entity = product();

        let first = cache.get_or_create_type(&entity);
        let second = cache.get_or_create_type(&entity);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(first.name(), "ProductType");
    }

    #[test]
    fn test_cache_keyed_by_name_not_definition() {
        let cache = TypeCache::new();
        let first = cache.get_or_create_type(&product());
        let second = cache.get_or_create_type(&product());
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_concurrent_first_access_is_idempotent() {
        let cache = Arc::new(TypeCache::new());
        let entity = product();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let entity = Arc::clone(&entity);
                std::thread::spawn(move || cache.get_or_create_type(&entity))
            })
            .collect();
        let types: Vec<Arc<ExposedType>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(types.iter().all(|t| Arc::ptr_eq(t, &types[0])));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_to_object_name() {
        let cache = TypeCache::new();
        let exposed = cache.get_or_create_type(&product());
        assert_eq!(exposed.to_object().type_name(), "ProductType");
        assert!(cache.get("ProductType").is_some());
    }
}
