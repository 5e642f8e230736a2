//! Deterministic GraphQL names derived from entity names.

use async_graphql::dynamic::TypeRef;
use erpgraph_core::ColumnType;

use crate::operations::MutationKind;

/// Name of the relay node interface.
pub const NODE_INTERFACE: &str = "Node";

/// Exposed object type name, e.g. `ProductType`.
pub fn type_name(entity: &str) -> String {
    format!("{entity}Type")
}

/// Input object name, e.g. `ProductInput`.
pub fn input_name(entity: &str) -> String {
    format!("{entity}Input")
}

/// List query field name, e.g. `all_products`.
pub fn list_field_name(entity: &str) -> String {
    format!("all_{}s", entity.to_lowercase())
}

/// Mutation field name, e.g. `createProduct`.
pub fn mutation_field_name(kind: MutationKind, entity: &str) -> String {
    format!("{}{entity}", kind.as_str())
}

/// Mutation payload type name, e.g. `CreateProductMutation`.
pub fn payload_name(kind: MutationKind, entity: &str) -> String {
    let verb = match kind {
        MutationKind::Create => "Create",
        MutationKind::Update => "Update",
        MutationKind::Delete => "Delete",
    };
    format!("{verb}{entity}Mutation")
}

/// GraphQL scalar for a column type.
pub fn scalar_name(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::Varchar(_) | ColumnType::Text => TypeRef::STRING,
        ColumnType::Integer | ColumnType::BigInteger => TypeRef::INT,
        ColumnType::Boolean => TypeRef::BOOLEAN,
        ColumnType::Float => TypeRef::FLOAT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_names() {
        assert_eq!(type_name("Product"), "ProductType");
        assert_eq!(input_name("Product"), "ProductInput");
        assert_eq!(list_field_name("Product"), "all_products");
        assert_eq!(list_field_name("User"), "all_users");
    }

    #[test]
    fn test_mutation_names() {
        assert_eq!(
            mutation_field_name(MutationKind::Create, "Product"),
            "createProduct"
        );
        assert_eq!(
            mutation_field_name(MutationKind::Delete, "User"),
            "deleteUser"
        );
        assert_eq!(
            payload_name(MutationKind::Update, "Product"),
            "UpdateProductMutation"
        );
    }

    #[test]
    fn test_scalar_mapping() {
        assert_eq!(scalar_name(ColumnType::Varchar(Some(80))), "String");
        assert_eq!(scalar_name(ColumnType::Text), "String");
        assert_eq!(scalar_name(ColumnType::BigInteger), "Int");
        assert_eq!(scalar_name(ColumnType::Boolean), "Boolean");
        assert_eq!(scalar_name(ColumnType::Float), "Float");
    }
}
