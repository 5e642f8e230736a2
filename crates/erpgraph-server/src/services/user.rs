use async_trait::async_trait;
use erpgraph_auth::Action;
use erpgraph_core::{FieldValues, Record};
use erpgraph_graphql::{
    CreateService, DeleteService, GraphQLContext, ServiceError, UpdateService,
};
use tracing::{info, warn};

use super::{finish, require_row};
use crate::models::USER;

/// Create, update and delete for `User`.
pub struct UserService;

impl UserService {
    async fn authorize(&self, ctx: &GraphQLContext, action: Action) -> Result<(), ServiceError> {
        ctx.check_permission(action, USER).await.map_err(|e| {
            warn!(actor = ?ctx.actor_id(), %action, error = %e, "Permission denied for user");
            ServiceError::from(e)
        })
    }
}

#[async_trait]
impl CreateService for UserService {
    async fn create(
        &self,
        input: FieldValues,
        ctx: &GraphQLContext,
    ) -> Result<Record, ServiceError> {
        self.authorize(ctx, Action::Create).await?;

        let mut tx = ctx.storage.begin_transaction().await?;
        let staged = tx.add(USER, &input).await;
        let user = finish(USER, tx, staged).await.inspect_err(|e| {
            warn!(error = %e, "User creation failed");
        })?;

        info!(id = user.id, username = ?user.get("username"), "User created");
        Ok(user)
    }
}

#[async_trait]
impl UpdateService for UserService {
    async fn update(
        &self,
        id: i64,
        input: FieldValues,
        ctx: &GraphQLContext,
    ) -> Result<Record, ServiceError> {
        self.authorize(ctx, Action::Update).await?;

        let mut tx = ctx.storage.begin_transaction().await?;
        let staged = match require_row(USER, id, tx.as_ref()).await {
            Ok(()) => tx.update(USER, id, &input).await,
            Err(e) => Err(e),
        };
        let user = finish(USER, tx, staged).await.inspect_err(|e| {
            warn!(id, error = %e, "User update failed");
        })?;

        info!(id, username = ?user.get("username"), "User updated");
        Ok(user)
    }
}

#[async_trait]
impl DeleteService for UserService {
    async fn delete(&self, id: i64, ctx: &GraphQLContext) -> Result<bool, ServiceError> {
        self.authorize(ctx, Action::Delete).await?;

        let mut tx = ctx.storage.begin_transaction().await?;
        let staged = match require_row(USER, id, tx.as_ref()).await {
            Ok(()) => tx.remove(USER, id).await,
            Err(e) => Err(e),
        };
        finish(USER, tx, staged).await.inspect_err(|e| {
            warn!(id, error = %e, "User deletion failed");
        })?;

        info!(id, "User deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use erpgraph_auth::{Actor, AuthError, PolicyConfig, PolicyRule, RolePolicy};
    use erpgraph_db_memory::{EntityStorage, InMemoryStorage};
    use erpgraph_graphql::operations::generic;
    use erpgraph_graphql::{MutationOutcome, MutationRequest};
    use serde_json::json;

    fn context(storage: &InMemoryStorage, actor: Option<Actor>) -> GraphQLContext {
        let policy = RolePolicy::new(PolicyConfig {
            rules: vec![
                PolicyRule {
                    role: "admin".into(),
                    resource: USER.into(),
                    actions: vec![Action::Create, Action::Update, Action::Delete],
                },
                PolicyRule {
                    role: "support".into(),
                    resource: USER.into(),
                    actions: vec![Action::Update],
                },
            ],
        });
        GraphQLContext::builder()
            .with_storage(Arc::new(storage.clone()))
            .with_permissions(Arc::new(policy))
            .with_actor(actor)
            .with_request_id("test")
            .build()
            .unwrap()
    }

    fn admin() -> Option<Actor> {
        Some(Actor::new("1").with_role("admin"))
    }

    fn storage() -> InMemoryStorage {
        InMemoryStorage::new(Arc::new(crate::models::registry().unwrap()))
    }

    fn input(value: serde_json::Value) -> FieldValues {
        value.as_object().cloned().unwrap()
    }

    async fn seed(storage: &InMemoryStorage) -> Record {
        UserService
            .create(
                input(json!({"username": "ann", "email": "ann@example.com"})),
                &context(storage, admin()),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let storage = storage();
        let ctx = context(&storage, admin());
        seed(&storage).await;

        let updated = UserService
            .update(1, input(json!({"email": "ann@corp.example"})), &ctx)
            .await
            .unwrap();
        assert_eq!(updated.get("email"), Some(&json!("ann@corp.example")));
        assert_eq!(updated.get("username"), Some(&json!("ann")));

        let stored = storage.get(USER, 1).await.unwrap().unwrap();
        assert_eq!(stored, updated);

        assert!(UserService.delete(1, &ctx).await.unwrap());
        assert_eq!(storage.count(USER).await, 0);
    }

    #[tokio::test]
    async fn test_forbidden_update_and_delete_leave_row() {
        let storage = storage();
        seed(&storage).await;

        let guest = context(&storage, Some(Actor::new("2").with_role("guest")));
        let err = UserService
            .update(1, input(json!({"username": "eve"})), &guest)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Unauthorized(AuthError::Forbidden { .. })
        ));

        let support = context(&storage, Some(Actor::new("3").with_role("support")));
        let err = UserService.delete(1, &support).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Unauthorized(AuthError::Forbidden { .. })
        ));

        let stored = storage.get(USER, 1).await.unwrap().unwrap();
        assert_eq!(stored.get("username"), Some(&json!("ann")));
    }

    #[tokio::test]
    async fn test_missing_row_is_not_found() {
        let storage = storage();
        let ctx = context(&storage, admin());

        let err = UserService
            .update(4, input(json!({"username": "bob"})), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Storage(ref e) if e.is_not_found()));

        let err = UserService.delete(4, &ctx).await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(ref e) if e.is_not_found()));
        assert_eq!(storage.total_count().await, 0);
    }

    #[tokio::test]
    async fn test_failed_commit_rolls_back_update_and_delete() {
        let storage = storage();
        let ctx = context(&storage, admin());
        seed(&storage).await;

        storage.set_fail_commits(true);
        let err = UserService
            .update(1, input(json!({"username": "bob"})), &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));

        let err = UserService.delete(1, &ctx).await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
        storage.set_fail_commits(false);

        let stored = storage.get(USER, 1).await.unwrap().unwrap();
        assert_eq!(stored.get("username"), Some(&json!("ann")));
    }

    #[tokio::test]
    async fn test_service_and_generic_paths_persist_same_row() {
        let values = json!({"username": "ann", "email": "ann@example.com"});
        let changes = json!({"email": "ann@corp.example"});

        let via_service = storage();
        let ctx = context(&via_service, admin());
        UserService.create(input(values.clone()), &ctx).await.unwrap();
        UserService.update(1, input(changes.clone()), &ctx).await.unwrap();

        let via_generic = storage();
        let ctx = context(&via_generic, admin());
        let user = crate::models::user();
        generic::execute(&user, MutationRequest::Create { input: input(values) }, &ctx)
            .await
            .unwrap();
        let outcome = generic::execute(
            &user,
            MutationRequest::Update {
                id: 1,
                input: input(changes),
            },
            &ctx,
        )
        .await
        .unwrap();

        let expected = via_service.get(USER, 1).await.unwrap().unwrap();
        assert_eq!(via_generic.get(USER, 1).await.unwrap(), Some(expected.clone()));
        assert_eq!(outcome, MutationOutcome::Record(expected));
    }
}
