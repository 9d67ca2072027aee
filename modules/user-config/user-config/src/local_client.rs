use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use user_config_sdk::{
    CreateUserConfigRequest, DeleteUserConfigRequest, GetUserConfigRequest,
    ListUserConfigsRequest, RequestContext, SetUserConfigRequest, StatUserConfigsRequest,
    UpdateUserConfigRequest, UserConfig, UserConfigApi, UserConfigError, UserConfigsPage,
};

use crate::domain::service::Service;

/// In-process client exposing the domain service through `UserConfigApi`.
pub struct UserConfigLocalClient {
    service: Arc<Service>,
}

impl UserConfigLocalClient {
    #[must_use]
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl UserConfigApi for UserConfigLocalClient {
    async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateUserConfigRequest,
    ) -> Result<UserConfig, UserConfigError> {
        self.service.create(ctx, req).await.map_err(Into::into)
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        req: UpdateUserConfigRequest,
    ) -> Result<UserConfig, UserConfigError> {
        self.service.update(ctx, req).await.map_err(Into::into)
    }

    async fn set(
        &self,
        ctx: &RequestContext,
        req: SetUserConfigRequest,
    ) -> Result<UserConfig, UserConfigError> {
        self.service.set(ctx, req).await.map_err(Into::into)
    }

    async fn delete(
        &self,
        ctx: &RequestContext,
        req: DeleteUserConfigRequest,
    ) -> Result<(), UserConfigError> {
        self.service.delete(ctx, req).await.map_err(Into::into)
    }

    async fn get(
        &self,
        ctx: &RequestContext,
        req: GetUserConfigRequest,
    ) -> Result<UserConfig, UserConfigError> {
        self.service.get(ctx, req).await.map_err(Into::into)
    }

    async fn list(
        &self,
        ctx: &RequestContext,
        req: ListUserConfigsRequest,
    ) -> Result<UserConfigsPage, UserConfigError> {
        self.service.list(ctx, req).await.map_err(Into::into)
    }

    async fn stat(
        &self,
        ctx: &RequestContext,
        req: StatUserConfigsRequest,
    ) -> Result<Vec<Value>, UserConfigError> {
        self.service.stat(ctx, req).await.map_err(Into::into)
    }
}
