//! Mutation payload types.
//!
//! `Create<Entity>Mutation` and `Update<Entity>Mutation` expose the affected
//! row as `obj`; `Delete<Entity>Mutation` exposes `success`.

use async_graphql::dynamic::{Field, Object, TypeRef};

use super::naming;
use crate::operations::MutationKind;
use crate::resolvers::MutationResolver;

/// Creates the payload type of one mutation.
pub fn create_payload_type(kind: MutationKind, entity: &str) -> Object {
    let name = naming::payload_name(kind, entity);
    let obj = Object::new(&name).description(format!("Result of {kind} on {entity}"));

    match kind {
        MutationKind::Create | MutationKind::Update => obj.field(
            Field::new(
                "obj",
                TypeRef::named(naming::type_name(entity)),
                MutationResolver::resolve_obj,
            )
            .description(format!("The {} row after the mutation", entity)),
        ),
        MutationKind::Delete => obj.field(
            Field::new(
                "success",
                TypeRef::named(TypeRef::BOOLEAN),
                MutationResolver::resolve_success,
            )
            .description("True when the row was removed"),
        ),
    }
}
