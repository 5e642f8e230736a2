//! # erpgraph-graphql
//!
//! GraphQL CRUD layer generated from entity definitions.
//!
//! The schema is built once at startup from a [`ModelRegistry`]: every
//! persisted entity gets an exposed object type, a `all_<entity>s` list query,
//! and `create` / `update` / `delete` mutations. Mutations consult the
//! [`ServiceRegistry`] at call time and fall back to generic persistence when
//! an entity has no service handler.
//!
//! ## Endpoints
//!
//! - `POST /graphql` - GraphQL endpoint
//! - `GET /graphql` - GraphQL (query via URL param)
//! - `GET /graphiql` - GraphiQL IDE (when enabled)
//!
//! ## Configuration
//!
//! Add to `erpgraph.toml`:
//!
//! ```toml
//! [graphql]
//! path = "/graphql"
//! max_depth = 15
//! max_complexity = 500
//! introspection = true
//! graphiql = true
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Configuration options
//! - [`schema`] - Type generation and schema assembly
//! - [`services`] - Per-entity service overrides
//! - [`operations`] - Mutation dispatch and generic persistence fallback
//! - [`context`] - GraphQL execution context
//! - [`handler`] - Axum HTTP handlers
//! - [`error`] - Error types for GraphQL operations
//!
//! [`ModelRegistry`]: erpgraph_core::ModelRegistry

pub mod config;
pub mod context;
pub mod error;
pub mod handler;
pub mod operations;
pub mod resolvers;
pub mod schema;
pub mod services;

// Re-export main types
pub use config::GraphQLConfig;
pub use context::{ContextBuilderError, GraphQLContext, GraphQLContextBuilder};
pub use error::GraphQLError;
pub use handler::{
    GraphQLContextTemplate, GraphQLState, REQUEST_ID_HEADER, graphiql_handler, graphql_handler,
    graphql_handler_get,
};
pub use operations::{MutationKind, MutationOutcome, MutationRequest, execute};
pub use schema::{EntitySchemaBuilder, ExposedType, SchemaBuilderConfig, TypeCache};
pub use services::{
    CreateService, DeleteService, ServiceError, ServiceHandler, ServiceRegistry,
    ServiceRegistryBuilder, ServiceRegistryError, UpdateService,
};

/// Result type for GraphQL operations.
pub type Result<T> = std::result::Result<T, GraphQLError>;
