//! Authorization error types.

use crate::actor::Action;

/// Errors that can occur during authorization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No actor is attached to the request.
    #[error("Authentication required")]
    Unauthenticated,

    /// The actor is known but may not perform the action.
    #[error("Forbidden: {actor} may not {action} {resource}")]
    Forbidden {
        /// The actor identifier.
        actor: String,
        /// The attempted action.
        action: Action,
        /// The entity the action targets.
        resource: String,
    },
}

impl AuthError {
    /// Creates a new `Forbidden` error.
    #[must_use]
    pub fn forbidden(actor: impl Into<String>, action: Action, resource: impl Into<String>) -> Self {
        Self::Forbidden {
            actor: actor.into(),
            action,
            resource: resource.into(),
        }
    }

    /// Returns the OAuth-style error code for this error.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden { .. } => "forbidden",
        }
    }
}
