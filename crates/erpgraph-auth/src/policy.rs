//! Role-based permission policy.
//!
//! A policy is a flat list of rules; a request is allowed when any role of
//! the actor matches a rule covering the target entity and action.
//!
//! # Example
//!
//! ```toml
//! [[rules]]
//! role = "admin"
//! resource = "*"
//! actions = ["create", "read", "update", "delete"]
//!
//! [[rules]]
//! role = "clerk"
//! resource = "Product"
//! actions = ["create", "update"]
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::actor::{Action, Actor};
use crate::checker::PermissionChecker;
use crate::error::AuthError;

/// Wildcard resource matching every entity.
pub const ANY_RESOURCE: &str = "*";

/// One grant of actions on a resource to a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRule {
    pub role: String,
    pub resource: String,
    pub actions: Vec<Action>,
}

impl PolicyRule {
    fn matches(&self, actor: &Actor, action: Action, resource: &str) -> bool {
        actor.has_role(&self.role)
            && (self.resource == ANY_RESOURCE || self.resource == resource)
            && self.actions.contains(&action)
    }
}

/// Serializable policy document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

/// Checker enforcing a [`PolicyConfig`].
#[derive(Debug, Clone)]
pub struct RolePolicy {
    rules: Vec<PolicyRule>,
}

impl RolePolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self {
            rules: config.rules,
        }
    }

    pub fn rules(&self) -> &[PolicyRule] {
        &self.rules
    }
}

#[async_trait]
impl PermissionChecker for RolePolicy {
    async fn check(
        &self,
        actor: Option<&Actor>,
        action: Action,
        resource: &str,
    ) -> Result<(), AuthError> {
        let actor = actor.ok_or(AuthError::Unauthenticated)?;

        if self
            .rules
            .iter()
            .any(|rule| rule.matches(actor, action, resource))
        {
            return Ok(());
        }

        debug!(
            actor = %actor.id,
            action = %action,
            resource,
            "No policy rule grants access"
        );
        Err(AuthError::forbidden(&actor.id, action, resource))
    }
}
