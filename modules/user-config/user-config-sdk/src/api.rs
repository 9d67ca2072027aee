//! `UserConfigApi` trait definition.
//!
//! All methods take the caller's `RequestContext`. The context, not the
//! request payload, decides which user a record belongs to.

use async_trait::async_trait;
use serde_json::Value;

use crate::context::RequestContext;
use crate::errors::UserConfigError;
use crate::models::{
    CreateUserConfigRequest, DeleteUserConfigRequest, GetUserConfigRequest,
    ListUserConfigsRequest, SetUserConfigRequest, StatUserConfigsRequest,
    UpdateUserConfigRequest, UserConfig, UserConfigsPage,
};

/// Public API trait for the `user-config` module.
///
/// ```ignore
/// let client: Arc<dyn UserConfigApi> = module.client()?;
/// let cfg = client.get(&ctx, GetUserConfigRequest { .. }).await?;
/// ```
#[async_trait]
pub trait UserConfigApi: Send + Sync {
    /// Create a user config owned by the caller.
    async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateUserConfigRequest,
    ) -> Result<UserConfig, UserConfigError>;

    /// Update the caller's user config with the given name.
    async fn update(
        &self,
        ctx: &RequestContext,
        req: UpdateUserConfigRequest,
    ) -> Result<UserConfig, UserConfigError>;

    /// Create the caller's user config, or update it if it already exists.
    async fn set(
        &self,
        ctx: &RequestContext,
        req: SetUserConfigRequest,
    ) -> Result<UserConfig, UserConfigError>;

    /// Delete the caller's user config with the given name.
    async fn delete(
        &self,
        ctx: &RequestContext,
        req: DeleteUserConfigRequest,
    ) -> Result<(), UserConfigError>;

    /// Get the caller's user config with the given name.
    async fn get(
        &self,
        ctx: &RequestContext,
        req: GetUserConfigRequest,
    ) -> Result<UserConfig, UserConfigError>;

    /// List user configs visible to the caller.
    async fn list(
        &self,
        ctx: &RequestContext,
        req: ListUserConfigsRequest,
    ) -> Result<UserConfigsPage, UserConfigError>;

    /// Aggregate user configs visible to the caller.
    async fn stat(
        &self,
        ctx: &RequestContext,
        req: StatUserConfigsRequest,
    ) -> Result<Vec<Value>, UserConfigError>;
}
