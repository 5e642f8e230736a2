//! Entity definitions served by this binary.

use erpgraph_core::{ColumnType, CoreError, EntityDefinition, FieldDefinition, ModelRegistry};

pub const USER: &str = "User";
pub const PRODUCT: &str = "Product";

pub fn user() -> EntityDefinition {
    EntityDefinition::new(USER, "users")
        .field(FieldDefinition::identifier("id"))
        .field(FieldDefinition::new("username", ColumnType::Varchar(Some(80))).unique())
        .field(FieldDefinition::new("email", ColumnType::Varchar(Some(120))).unique())
}

pub fn product() -> EntityDefinition {
    EntityDefinition::new(PRODUCT, "products")
        .field(FieldDefinition::identifier("id"))
        .field(FieldDefinition::new("name", ColumnType::Varchar(Some(120))))
        .field(FieldDefinition::new("price", ColumnType::Integer))
}

/// Shared audit columns; has no table of its own.
pub fn timestamp_mixin() -> EntityDefinition {
    EntityDefinition::abstract_base("TimestampMixin")
        .field(FieldDefinition::new("created_at", ColumnType::Text).nullable())
        .field(FieldDefinition::new("updated_at", ColumnType::Text).nullable())
}

/// Registry of every model, mixins included.
pub fn registry() -> Result<ModelRegistry, CoreError> {
    ModelRegistry::from_definitions([user(), timestamp_mixin(), product()])
}
