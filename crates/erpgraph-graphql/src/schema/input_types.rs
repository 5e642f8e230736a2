//! Input types for GraphQL mutations.
//!
//! For each entity this generates `<Entity>Input` with one field per data
//! column. The identifier is never part of the input: update and delete take
//! it as a separate `id: Int!` argument.
//!
//! Every input field is optional at the GraphQL level so that an update can
//! carry only the changed columns. A create missing a required column is
//! rejected by the storage layer.

use async_graphql::dynamic::{InputObject, InputValue, TypeRef};
use erpgraph_core::EntityDefinition;
use tracing::trace;

use super::naming;

/// Generates input types for entity mutations.
pub struct InputTypeGenerator;

impl InputTypeGenerator {
    /// Creates the input type for one entity.
    ///
    /// Example generated type:
    /// ```graphql
    /// input ProductInput {
    ///   name: String
    ///   price: Int
    /// }
    /// ```
    pub fn create_entity_input(entity: &EntityDefinition) -> InputObject {
        let type_name = naming::input_name(&entity.name);
        trace!(entity = %entity.name, type_name = %type_name, "Creating input type");

        let mut input = InputObject::new(&type_name).description(format!(
            "Fields of {} accepted by create and update mutations",
            entity.name
        ));
        for field in entity.data_fields() {
            let mut value = InputValue::new(
                &field.name,
                TypeRef::named(naming::scalar_name(field.column_type)),
            );
            if !field.nullable {
                value = value.description("Required on create");
            }
            input = input.field(value);
        }
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erpgraph_core::{ColumnType, FieldDefinition};

    #[test]
    fn test_create_entity_input() {
        let entity = EntityDefinition::new("Product", "products")
            .field(FieldDefinition::identifier("id"))
            .field(FieldDefinition::new("name", ColumnType::Varchar(Some(120))));

        let input = InputTypeGenerator::create_entity_input(&entity);
        assert_eq!(input.type_name(), "ProductInput");
    }
}
