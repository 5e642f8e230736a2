//! # erpgraph-auth
//!
//! Authorization for erpgraph.
//!
//! This crate provides:
//! - [`Actor`] and [`Action`], the subject and verb of a permission check
//! - [`PermissionChecker`], the trait consulted by domain services before writing
//! - [`AllowAll`] and [`RolePolicy`], the two checkers shipped with the server
//! - [`RequestActor`], an Axum extractor reading the actor from request headers
//!
//! ## Overview
//!
//! Authentication is out of scope: the actor is taken as asserted by the
//! `x-user-id` / `x-user-roles` headers, typically set by a fronting proxy.

pub mod actor;
pub mod checker;
pub mod error;
pub mod extractors;
pub mod policy;

pub use actor::{Action, Actor};
pub use checker::{AllowAll, DynPermissionChecker, PermissionChecker};
pub use error::AuthError;
pub use extractors::{RequestActor, USER_ID_HEADER, USER_ROLES_HEADER, actor_from_headers};
pub use policy::{PolicyConfig, PolicyRule, RolePolicy};

/// Type alias for authorization results.
pub type AuthResult<T> = Result<T, AuthError>;
