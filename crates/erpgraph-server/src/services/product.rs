use async_trait::async_trait;
use erpgraph_auth::Action;
use erpgraph_core::{FieldValues, Record};
use erpgraph_graphql::{
    CreateService, DeleteService, GraphQLContext, ServiceError, UpdateService,
};
use tracing::{debug, info, warn};

use super::{finish, require_row};
use crate::models::PRODUCT;

/// Create, update and delete for `Product`.
pub struct ProductService;

#[async_trait]
impl CreateService for ProductService {
    async fn create(
        &self,
        input: FieldValues,
        ctx: &GraphQLContext,
    ) -> Result<Record, ServiceError> {
        debug!(actor = ?ctx.actor_id(), ?input, "Creating product");
        ctx.check_permission(Action::Create, PRODUCT).await?;

        let mut tx = ctx.storage.begin_transaction().await?;
        let staged = tx.add(PRODUCT, &input).await;
        let product = finish(PRODUCT, tx, staged).await?;

        info!(id = product.id, "Product created");
        Ok(product)
    }
}

#[async_trait]
impl UpdateService for ProductService {
    async fn update(
        &self,
        id: i64,
        input: FieldValues,
        ctx: &GraphQLContext,
    ) -> Result<Record, ServiceError> {
        debug!(actor = ?ctx.actor_id(), id, ?input, "Updating product");
        ctx.check_permission(Action::Update, PRODUCT).await?;

        let mut tx = ctx.storage.begin_transaction().await?;
        let staged = match require_row(PRODUCT, id, tx.as_ref()).await {
            Ok(()) => tx.update(PRODUCT, id, &input).await,
            Err(e) => {
                warn!(id, "Product update failed: not found");
                Err(e)
            }
        };
        let product = finish(PRODUCT, tx, staged).await?;

        info!(id, "Product updated");
        Ok(product)
    }
}

#[async_trait]
impl DeleteService for ProductService {
    async fn delete(&self, id: i64, ctx: &GraphQLContext) -> Result<bool, ServiceError> {
        debug!(actor = ?ctx.actor_id(), id, "Deleting product");
        ctx.check_permission(Action::Delete, PRODUCT).await?;

        let mut tx = ctx.storage.begin_transaction().await?;
        let staged = match require_row(PRODUCT, id, tx.as_ref()).await {
            Ok(()) => tx.remove(PRODUCT, id).await,
            Err(e) => {
                warn!(id, "Product deletion failed: not found");
                Err(e)
            }
        };
        finish(PRODUCT, tx, staged).await?;

        info!(id, "Product deleted");
        Ok(true)
    }
}
