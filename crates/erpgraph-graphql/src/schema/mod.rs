//! GraphQL schema generation.
//!
//! ## Components
//!
//! - [`TypeCache`] / [`ExposedType`] - Memoized per-entity object types
//! - [`InputTypeGenerator`] - Per-entity mutation input types
//! - [`EntitySchemaBuilder`] - Assembles Query and Mutation roots
//!
//! ## Architecture
//!
//! The schema is built once, single-threaded, during process boot:
//! 1. The model registry lists persisted entities
//! 2. Each entity gets its exposed type, input type and payload types
//! 3. Query and Mutation roots are assembled with per-entity resolvers
//! 4. The finished schema is immutable and shared by all requests

mod builder;
mod input_types;
pub mod naming;
mod payload;
mod type_generator;

pub use builder::{EntitySchemaBuilder, SchemaBuilderConfig};
pub use input_types::InputTypeGenerator;
pub use payload::create_payload_type;
pub use type_generator::{ExposedType, TypeCache, node_interface};
