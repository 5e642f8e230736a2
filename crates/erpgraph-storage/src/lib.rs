//! # erpgraph-storage
//!
//! Persistence abstraction for erpgraph.
//!
//! This crate defines the traits that storage backends implement. It does not
//! contain any implementation; see `erpgraph-db-memory` for the in-memory one.
//!
//! ## Overview
//!
//! [`EntityStorage`] exposes reads ("get by id", "list all") and hands out
//! [`Transaction`]s for writes ("add new", "update", "remove"), which are made
//! durable by a `commit` that can fail.

mod error;
mod traits;

pub use error::{ErrorCategory, StorageError};
pub use traits::{EntityStorage, Transaction};

/// Type alias for a shareable storage instance.
pub type DynStorage = std::sync::Arc<dyn EntityStorage>;
