//! # erpgraph-core
//!
//! Entity definitions, rows and the model registry shared by every erpgraph crate.

pub mod entity;
pub mod error;
pub mod record;
pub mod registry;

pub use entity::{ColumnType, EntityDefinition, FieldDefinition, is_valid_name};
pub use error::{CoreError, Result};
pub use record::{FieldValues, Record};
pub use registry::ModelRegistry;
