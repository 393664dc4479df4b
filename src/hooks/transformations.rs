use crate::cache::QueryKey;
use crate::error::ClientResult;
use crate::models::{
    ExecuteTransformationRequest, ExecuteTransformationResponse, Transformation,
    TransformationCreate, TransformationUpdate,
};

use super::{has_id, HookContext, Messages, PendingFlag};

pub struct TransformationHooks {
    ctx: HookContext,
    creating: PendingFlag,
    updating: PendingFlag,
    deleting: PendingFlag,
    executing: PendingFlag,
}

impl TransformationHooks {
    pub fn new(ctx: HookContext) -> Self {
        Self {
            ctx,
            creating: PendingFlag::new("create transformation"),
            updating: PendingFlag::new("update transformation"),
            deleting: PendingFlag::new("delete transformation"),
            executing: PendingFlag::new("execute transformation"),
        }
    }

    pub async fn transformations(&self) -> ClientResult<Vec<Transformation>> {
        let api = self.ctx.api.clone();
        let all = self
            .ctx
            .query(QueryKey::Transformations, true, || async move {
                api.list_transformations().await
            })
            .await?;
        Ok(all.unwrap_or_default())
    }

    pub async fn transformation(&self, id: &str) -> ClientResult<Option<Transformation>> {
        let api = self.ctx.api.clone();
        let owned = id.to_string();
        self.ctx
            .query(QueryKey::Transformation(owned.clone()), has_id(id), || async move {
                api.get_transformation(&owned).await
            })
            .await
    }

    pub async fn create_transformation(
        &self,
        request: &TransformationCreate,
    ) -> ClientResult<Transformation> {
        self.ctx
            .mutate(
                &self.creating,
                Messages {
                    success: "Transformation created",
                    failure: "Failed to create transformation",
                },
                || self.ctx.api.create_transformation(request),
                |_| vec![QueryKey::Transformations],
            )
            .await
    }

    pub async fn update_transformation(
        &self,
        id: &str,
        request: &TransformationUpdate,
    ) -> ClientResult<Transformation> {
        self.ctx
            .mutate(
                &self.updating,
                Messages {
                    success: "Transformation updated",
                    failure: "Failed to update transformation",
                },
                || self.ctx.api.update_transformation(id, request),
                |_| transformation_keys(id),
            )
            .await
    }

    pub async fn delete_transformation(&self, id: &str) -> ClientResult<()> {
        self.ctx
            .mutate(
                &self.deleting,
                Messages {
                    success: "Transformation deleted",
                    failure: "Failed to delete transformation",
                },
                || self.ctx.api.delete_transformation(id),
                |_| transformation_keys(id),
            )
            .await
    }

    /// Run a transformation against `input_text`. Changes no server state,
    /// so nothing is invalidated.
    pub async fn execute_transformation(
        &self,
        request: &ExecuteTransformationRequest,
    ) -> ClientResult<ExecuteTransformationResponse> {
        self.ctx
            .mutate(
                &self.executing,
                Messages {
                    success: "Transformation complete",
                    failure: "Failed to execute transformation",
                },
                || self.ctx.api.execute_transformation(request),
                |_| Vec::new(),
            )
            .await
    }

    pub fn is_executing(&self) -> bool {
        self.executing.is_pending()
    }
}

fn transformation_keys(id: &str) -> Vec<QueryKey> {
    vec![
        QueryKey::Transformation(id.to_string()),
        QueryKey::Transformations,
    ]
}
