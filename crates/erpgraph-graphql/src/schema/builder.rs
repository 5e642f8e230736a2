//! Entity GraphQL schema builder.
//!
//! This module provides `EntitySchemaBuilder`, which generates the GraphQL
//! schema from a [`ModelRegistry`]. The builder uses async-graphql's dynamic
//! schema API and runs once at startup, before any request is served.

use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::Value;
use async_graphql::dynamic::{Field, FieldFuture, InputValue, Object, Schema, TypeRef};
use erpgraph_core::{EntityDefinition, ModelRegistry};
use indexmap::IndexMap;
use tracing::{debug, info, trace};

use super::input_types::InputTypeGenerator;
use super::naming::{self, NODE_INTERFACE};
use super::payload::create_payload_type;
use super::type_generator::{TypeCache, node_interface};
use crate::error::GraphQLError;
use crate::operations::MutationKind;
use crate::resolvers::{ListResolver, MutationResolver, NodeResolver};
use crate::services::ServiceRegistry;

type Entities = IndexMap<String, Arc<EntityDefinition>>;

/// Configuration for the schema builder.
#[derive(Debug, Clone)]
pub struct SchemaBuilderConfig {
    /// Maximum query depth allowed.
    pub max_depth: usize,

    /// Maximum query complexity allowed.
    pub max_complexity: usize,

    /// Whether to enable introspection queries.
    pub introspection_enabled: bool,
}

impl Default for SchemaBuilderConfig {
    fn default() -> Self {
        Self {
            max_depth: 15,
            max_complexity: 500,
            introspection_enabled: true,
        }
    }
}

/// Builds the GraphQL schema from entity definitions.
///
/// `EntitySchemaBuilder` generates a complete schema including:
/// - The `Node` interface and one exposed type per entity
/// - One input type and three payload types per entity
/// - Query root: `all_<entity>s`, `node`, `_health`, `_version`
/// - Mutation root: `create<Entity>`, `update<Entity>`, `delete<Entity>`
///
/// # Example
///
/// ```ignore
/// let builder = EntitySchemaBuilder::new(
///     registry,
///     services,
///     SchemaBuilderConfig::default(),
/// );
///
/// let schema = builder.build()?;
/// ```
pub struct EntitySchemaBuilder {
    registry: Arc<ModelRegistry>,
    services: Arc<ServiceRegistry>,
    config: SchemaBuilderConfig,
    types: Arc<TypeCache>,
}

impl EntitySchemaBuilder {
    /// Creates a new schema builder with its own type cache.
    #[must_use]
    pub fn new(
        registry: Arc<ModelRegistry>,
        services: Arc<ServiceRegistry>,
        config: SchemaBuilderConfig,
    ) -> Self {
        Self {
            registry,
            services,
            config,
            types: Arc::new(TypeCache::new()),
        }
    }

    /// Uses a shared type cache instead of a private one.
    #[must_use]
    pub fn with_type_cache(mut self, types: Arc<TypeCache>) -> Self {
        self.types = types;
        self
    }

    /// The cache holding every exposed type of this schema.
    pub fn type_cache(&self) -> &Arc<TypeCache> {
        &self.types
    }

    /// The service registry the schema is checked against.
    pub fn services(&self) -> &Arc<ServiceRegistry> {
        &self.services
    }

    /// Builds the GraphQL schema.
    ///
    /// The Mutation root is only registered when at least one entity exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a service is registered for an unknown entity, an
    /// entity has no data fields, or schema construction fails.
    pub fn build(&self) -> Result<Schema, GraphQLError> {
        debug!("Starting GraphQL schema build");

        let entities = self.registry.list_entities();
        self.check_entities(&entities)?;

        let mutation_root = (!entities.is_empty()).then_some("Mutation");
        let mut schema_builder = Schema::build("Query", mutation_root, None);

        if !entities.is_empty() {
            schema_builder = schema_builder.register(node_interface());
        }

        // Exposed types are generated eagerly, before any request can race.
        for (name, entity) in &entities {
            let exposed = self.types.get_or_create_type(entity);
            schema_builder = schema_builder
                .register(exposed.to_object())
                .register(InputTypeGenerator::create_entity_input(entity));
            for kind in MutationKind::ALL {
                schema_builder = schema_builder.register(create_payload_type(kind, name));
            }
            trace!(entity = %name, type_name = %exposed.name(), "Registered entity types");
        }

        schema_builder = schema_builder.register(self.build_query_type(&entities));
        if !entities.is_empty() {
            schema_builder = schema_builder.register(self.build_mutation_type(&entities));
        }

        // Configure limits
        let mut schema_builder = schema_builder
            .limit_depth(self.config.max_depth)
            .limit_complexity(self.config.max_complexity);

        if !self.config.introspection_enabled {
            schema_builder = schema_builder.disable_introspection();
        }

        let schema = schema_builder
            .finish()
            .map_err(|e| GraphQLError::SchemaBuildFailed(e.to_string()))?;

        info!(
            entities = entities.len(),
            services = self.services.len(),
            "GraphQL schema built"
        );
        Ok(schema)
    }

    fn check_entities(&self, entities: &Entities) -> Result<(), GraphQLError> {
        for name in self.services.entities() {
            if !entities.contains_key(name) {
                return Err(GraphQLError::SchemaBuildFailed(format!(
                    "Service registered for unknown entity {name}"
                )));
            }
        }

        for (name, entity) in entities {
            if entity.data_fields().next().is_none() {
                return Err(GraphQLError::SchemaBuildFailed(format!(
                    "Entity {name} has no data fields to expose"
                )));
            }
            if let Some(handler) = self.services.lookup(name) {
                debug!(entity = %name, operations = ?handler.operations(), "Entity has service overrides");
            }
        }
        Ok(())
    }

    /// Builds the Query root type.
    fn build_query_type(&self, entities: &Entities) -> Object {
        let mut query = Object::new("Query").description("Query root");

        query = query.field(
            Field::new("_health", TypeRef::named_nn(TypeRef::STRING), |_| {
                FieldFuture::new(async { Ok(Some(Value::String("ok".to_string()))) })
            })
            .description("Health check endpoint"),
        );

        query = query.field(
            Field::new("_version", TypeRef::named_nn(TypeRef::STRING), |_| {
                FieldFuture::new(async {
                    Ok(Some(Value::String(env!("CARGO_PKG_VERSION").to_string())))
                })
            })
            .description("API version"),
        );

        if entities.is_empty() {
            return query;
        }

        // Each resolver gets its own Arc of the entity it lists.
        for (name, entity) in entities {
            let type_name = naming::type_name(name);
            query = query.field(
                Field::new(
                    naming::list_field_name(name),
                    TypeRef::named_list(&type_name),
                    ListResolver::resolve(Arc::clone(entity)),
                )
                .description(format!("All {name} rows")),
            );
        }

        let node_types: HashMap<String, Arc<EntityDefinition>> = entities
            .iter()
            .map(|(name, entity)| (naming::type_name(name), Arc::clone(entity)))
            .collect();
        query.field(
            Field::new(
                "node",
                TypeRef::named(NODE_INTERFACE),
                NodeResolver::resolve(Arc::new(node_types)),
            )
            .argument(InputValue::new("id", TypeRef::named_nn(TypeRef::ID)))
            .description("Fetch any object by its global ID"),
        )
    }

    /// Builds the Mutation root type.
    fn build_mutation_type(&self, entities: &Entities) -> Object {
        let mut mutation = Object::new("Mutation").description("Mutation root");

        for (name, entity) in entities {
            for kind in MutationKind::ALL {
                let mut field = Field::new(
                    naming::mutation_field_name(kind, name),
                    TypeRef::named(naming::payload_name(kind, name)),
                    MutationResolver::resolve(Arc::clone(entity), kind),
                )
                .description(format!("{kind} a {name}"));

                if kind != MutationKind::Create {
                    field = field.argument(InputValue::new("id", TypeRef::named_nn(TypeRef::INT)));
                }
                if kind != MutationKind::Delete {
                    field = field.argument(InputValue::new(
                        "input",
                        TypeRef::named_nn(naming::input_name(name)),
                    ));
                }
                mutation = mutation.field(field);
            }
            trace!(entity = %name, "Added mutation fields");
        }

        mutation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erpgraph_core::{ColumnType, FieldDefinition};

    fn registry() -> Arc<ModelRegistry> {
        Arc::new(
            ModelRegistry::from_definitions([
                EntityDefinition::new("User", "users")
                    .field(FieldDefinition::identifier("id"))
                    .field(FieldDefinition::new("username", ColumnType::Varchar(Some(80))).unique())
                    .field(FieldDefinition::new("email", ColumnType::Varchar(Some(120))).unique()),
                EntityDefinition::abstract_base("TimestampMixin")
                    .field(FieldDefinition::new("created_at", ColumnType::Text)),
                EntityDefinition::new("Product", "products")
                    .field(FieldDefinition::identifier("id"))
                    .field(FieldDefinition::new("name", ColumnType::Varchar(Some(120))))
                    .field(FieldDefinition::new("price", ColumnType::Integer))
                    .field(FieldDefinition::new("notes", ColumnType::Text).nullable()),
            ])
            .unwrap(),
        )
    }

    fn builder(registry: Arc<ModelRegistry>) -> EntitySchemaBuilder {
        EntitySchemaBuilder::new(
            registry,
            Arc::new(ServiceRegistry::empty()),
            SchemaBuilderConfig::default(),
        )
    }

    #[test]
    fn test_default_config() {
        let config = SchemaBuilderConfig::default();
        assert_eq!(config.max_depth, 15);
        assert_eq!(config.max_complexity, 500);
        assert!(config.introspection_enabled);
    }

    #[test]
    fn test_empty_registry_builds_query_only_schema() {
        let schema = builder(Arc::new(ModelRegistry::new())).build().unwrap();
        let sdl = schema.sdl();

        assert!(sdl.contains("type Query"));
        assert!(sdl.contains("_health"));
        assert!(sdl.contains("_version"));
        assert!(!sdl.contains("type Mutation"));
    }

    #[test]
    fn test_schema_with_entities() {
        let schema = builder(registry()).build().unwrap();
        let sdl = schema.sdl();

        assert!(sdl.contains("type ProductType implements Node"));
        assert!(sdl.contains("type UserType implements Node"));
        assert!(sdl.contains("all_products: [ProductType]"));
        assert!(sdl.contains("all_users: [UserType]"));
        assert!(sdl.contains("input ProductInput"));
        assert!(sdl.contains("createProduct(input: ProductInput!): CreateProductMutation"));
        assert!(sdl.contains("updateProduct(id: Int!, input: ProductInput!): UpdateProductMutation"));
        assert!(sdl.contains("deleteProduct(id: Int!): DeleteProductMutation"));
        assert!(sdl.contains("notes: String\n"));
        assert!(sdl.contains("price: Int!"));
        assert!(!sdl.contains("TimestampMixin"));
    }

    #[test]
    fn test_types_are_cached_once_per_entity() {
        let builder = builder(registry());
        builder.build().unwrap();
        assert_eq!(builder.type_cache().len(), 2);

        let product = registry().get("Product").cloned().unwrap();
        let cached = builder.type_cache().get("ProductType").unwrap();
        assert!(Arc::ptr_eq(
            &cached,
            &builder.type_cache().get_or_create_type(&product)
        ));
    }

    #[test]
    fn test_service_for_unknown_entity_rejected() {
        let services = ServiceRegistry::builder()
            .register("Invoice", crate::services::ServiceHandler::new())
            .build()
            .unwrap();
        let builder = EntitySchemaBuilder::new(
            registry(),
            Arc::new(services),
            SchemaBuilderConfig::default(),
        );

        assert!(matches!(
            builder.build(),
            Err(GraphQLError::SchemaBuildFailed(msg)) if msg.contains("Invoice")
        ));
    }

    #[test]
    fn test_schema_with_disabled_introspection() {
        let config = SchemaBuilderConfig {
            introspection_enabled: false,
            ..Default::default()
        };
        let builder = EntitySchemaBuilder::new(registry(), Arc::new(ServiceRegistry::empty()), config);
        assert!(builder.build().is_ok());
    }
}
