use std::sync::Arc;

use async_trait::async_trait;

use crate::actor::{Action, Actor};
use crate::error::AuthError;

/// Decides whether an actor may perform an action on an entity.
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait PermissionChecker: Send + Sync {
    /// Returns `Ok(())` when the action is allowed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthenticated` when the check needs an actor and
    /// there is none, `AuthError::Forbidden` when the actor lacks permission.
    async fn check(
        &self,
        actor: Option<&Actor>,
        action: Action,
        resource: &str,
    ) -> Result<(), AuthError>;
}

/// Type alias for a shareable permission checker.
pub type DynPermissionChecker = Arc<dyn PermissionChecker>;

/// Checker that grants everything, even to anonymous callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl PermissionChecker for AllowAll {
    async fn check(
        &self,
        _actor: Option<&Actor>,
        _action: Action,
        _resource: &str,
    ) -> Result<(), AuthError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time test that PermissionChecker is object-safe
    fn _assert_object_safe(_: &dyn PermissionChecker) {}

    #[tokio::test]
    async fn test_allow_all_allows_anonymous() {
        let checker: DynPermissionChecker = Arc::new(AllowAll);
        assert!(checker.check(None, Action::Delete, "User").await.is_ok());
    }
}
