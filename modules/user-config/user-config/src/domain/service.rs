//! Domain service for user configs.
//!
//! Every operation runs the same pipeline: required-field guards, the
//! authorization scope guard, tag normalization, then a single repository
//! call whose result is returned unchanged. The service keeps no state
//! between calls.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, error, info, instrument};
use user_config_sdk::{
    AggregateOperator, CreateUserConfigRequest, DeleteUserConfigRequest, GetUserConfigRequest,
    ListUserConfigsRequest, Page, RequestContext, SetUserConfigRequest, StatQuery,
    StatUserConfigsRequest, TagsInput, UpdateUserConfigRequest, UserConfig, UserConfigsPage,
};

use super::error::DomainError;
use super::filter::{QueryFilterBuilder, SELF_FILTER};
use super::guards;
use super::repo::{AccessScope, NewUserConfig, UserConfigPatch, UserConfigRepository};
use super::tags::normalize_tags;

/// Filters `list` may append from request parameters.
const LIST_FILTERS: &[&str] = &["name", "user_id", "domain_id", SELF_FILTER];
/// Filters `stat` may append from request parameters.
const STAT_FILTERS: &[&str] = &["domain_id", SELF_FILTER];
/// Fields searched by the free-text keyword.
const KEYWORD_FIELDS: &[&str] = &["name"];

/// Fields accepted by the `only` projection of `get`.
pub const PROJECTABLE_FIELDS: &[&str] = &[
    "name",
    "data",
    "tags",
    "user_id",
    "domain_id",
    "created_at",
    "updated_at",
];

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_name_length: usize,
    pub max_tags: usize,
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_name_length: 128,
            max_tags: 64,
            default_page_size: 50,
            max_page_size: 1000,
        }
    }
}

impl ServiceConfig {
    /// Fill in the default limit and clamp the requested one.
    #[must_use]
    pub fn effective_page(&self, page: Option<Page>) -> Page {
        let page = page.unwrap_or_default();
        let limit = page
            .limit
            .filter(|l| *l > 0)
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size);
        Page {
            start: Some(page.start.unwrap_or(1).max(1)),
            limit: Some(limit),
        }
    }
}

pub struct Service {
    repo: Arc<dyn UserConfigRepository>,
    config: ServiceConfig,
}

impl Service {
    pub fn new(repo: Arc<dyn UserConfigRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    fn normalize(
        &self,
        tags: Option<&TagsInput>,
    ) -> Result<Option<BTreeMap<String, String>>, DomainError> {
        tags.map(|t| normalize_tags(t, self.config.max_tags))
            .transpose()
    }

    #[instrument(skip(self, ctx, req), fields(domain_id = ?req.domain_id, name = ?req.name))]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateUserConfigRequest,
    ) -> Result<UserConfig, DomainError> {
        let CreateUserConfigRequest {
            name,
            data,
            tags,
            domain_id,
        } = req;
        let name = guards::required("name", name)?;
        let data = guards::required_value("data", data)?;
        let domain_id = guards::required("domain_id", domain_id)?;

        guards::authorize_user_scope(ctx, &domain_id)?;
        guards::deny_domain_owner(ctx)?;
        guards::max_length("name", &name, self.config.max_name_length)?;

        let tags = self.normalize(tags.as_ref())?.unwrap_or_default();

        info!("Creating user config");
        let created = self
            .repo
            .create(NewUserConfig {
                name,
                data,
                tags,
                user_id: ctx.user_id().to_owned(),
                domain_id,
            })
            .await?;

        info!(user_id = %created.user_id, "Successfully created user config");
        Ok(created)
    }

    #[instrument(skip(self, ctx, req), fields(domain_id = ?req.domain_id, name = ?req.name))]
    pub async fn update(
        &self,
        ctx: &RequestContext,
        req: UpdateUserConfigRequest,
    ) -> Result<UserConfig, DomainError> {
        let UpdateUserConfigRequest {
            name,
            data,
            tags,
            domain_id,
        } = req;
        let name = guards::required("name", name)?;
        let domain_id = guards::required("domain_id", domain_id)?;

        guards::authorize_user_scope(ctx, &domain_id)?;

        let patch = UserConfigPatch {
            data,
            tags: self.normalize(tags.as_ref())?,
        };

        info!("Updating user config");
        let scope = AccessScope::new(domain_id, ctx.user_id());
        let updated = self.repo.update(&scope, &name, patch).await?;

        info!("Successfully updated user config");
        Ok(updated)
    }

    /// Create the caller's config or update it in place.
    ///
    /// The lookup is keyed on (domain_id, user_id, name). When nothing exists
    /// the repository upsert is used, so concurrent `set` calls for the same
    /// key converge on one record.
    #[instrument(skip(self, ctx, req), fields(domain_id = ?req.domain_id, name = ?req.name))]
    pub async fn set(
        &self,
        ctx: &RequestContext,
        req: SetUserConfigRequest,
    ) -> Result<UserConfig, DomainError> {
        let SetUserConfigRequest {
            name,
            data,
            tags,
            domain_id,
        } = req;
        let name = guards::required("name", name)?;
        let data = guards::required_value("data", data)?;
        let domain_id = guards::required("domain_id", domain_id)?;

        guards::authorize_user_scope(ctx, &domain_id)?;
        guards::deny_domain_owner(ctx)?;
        guards::max_length("name", &name, self.config.max_name_length)?;

        let patch = UserConfigPatch {
            data: Some(data),
            tags: self.normalize(tags.as_ref())?,
        };

        let scope = AccessScope::new(domain_id, ctx.user_id());
        let existing = self.repo.find(&scope, &name).await?;

        match existing.as_slice() {
            [] => {
                info!("Creating user config via set");
                self.repo.upsert(&scope, &name, patch).await
            }
            [current] => {
                info!("Updating user config via set");
                self.repo.update_record(current, patch).await
            }
            many => {
                error!(
                    count = many.len(),
                    user_id = %scope.user_id,
                    "Multiple user configs share one key"
                );
                Err(DomainError::invariant_violation(format!(
                    "{} user configs named '{name}' exist for one user",
                    many.len()
                )))
            }
        }
    }

    #[instrument(skip(self, ctx, req), fields(domain_id = ?req.domain_id, name = ?req.name))]
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        req: DeleteUserConfigRequest,
    ) -> Result<(), DomainError> {
        let name = guards::required("name", req.name)?;
        let domain_id = guards::required("domain_id", req.domain_id)?;

        guards::authorize_user_scope(ctx, &domain_id)?;

        info!("Deleting user config");
        let scope = AccessScope::new(domain_id, ctx.user_id());
        self.repo.delete(&scope, &name).await?;

        info!("Successfully deleted user config");
        Ok(())
    }

    #[instrument(skip(self, ctx, req), fields(domain_id = ?req.domain_id, name = ?req.name))]
    pub async fn get(
        &self,
        ctx: &RequestContext,
        req: GetUserConfigRequest,
    ) -> Result<UserConfig, DomainError> {
        let name = guards::required("name", req.name)?;
        let domain_id = guards::required("domain_id", req.domain_id)?;

        guards::authorize_user_scope(ctx, &domain_id)?;

        if let Some(only) = &req.only {
            if let Some(unknown) = only
                .iter()
                .find(|f| !PROJECTABLE_FIELDS.contains(&f.as_str()))
            {
                return Err(DomainError::validation(
                    "only",
                    format!("unknown field '{unknown}'"),
                ));
            }
        }

        debug!("Getting user config");
        let scope = AccessScope::new(domain_id, ctx.user_id());
        self.repo.get(&scope, &name, req.only.as_deref()).await
    }

    #[instrument(skip(self, ctx, req), fields(domain_id = ?req.domain_id))]
    pub async fn list(
        &self,
        ctx: &RequestContext,
        req: ListUserConfigsRequest,
    ) -> Result<UserConfigsPage, DomainError> {
        let domain_id = guards::required("domain_id", req.domain_id)?;

        guards::authorize_user_scope(ctx, &domain_id)?;

        let mut query = QueryFilterBuilder::new(req.query.unwrap_or_default(), LIST_FILTERS)
            .append_eq("name", req.name.as_deref())?
            .append_eq("user_id", req.user_id.as_deref())?
            .append_eq("domain_id", Some(domain_id.as_str()))?
            .append_self_filter(ctx)?
            .append_keyword(KEYWORD_FIELDS)
            .build();
        query.page = Some(self.config.effective_page(query.page));

        debug!("Listing user configs");
        let page = self.repo.list(&query).await?;

        debug!(
            "Successfully listed {} of {} user configs",
            page.items.len(),
            page.total_count
        );
        Ok(page)
    }

    #[instrument(skip(self, ctx, req), fields(domain_id = ?req.domain_id))]
    pub async fn stat(
        &self,
        ctx: &RequestContext,
        req: StatUserConfigsRequest,
    ) -> Result<Vec<Value>, DomainError> {
        let query = guards::required_value("query", req.query)?;
        let domain_id = guards::required("domain_id", req.domain_id)?;

        guards::authorize_user_scope(ctx, &domain_id)?;
        validate_aggregate(&query)?;

        let mut query = QueryFilterBuilder::new(query, STAT_FILTERS)
            .append_eq("domain_id", Some(domain_id.as_str()))?
            .append_self_filter(ctx)?
            .append_keyword(KEYWORD_FIELDS)
            .build();
        if query.page.is_some() {
            query.page = Some(self.config.effective_page(query.page));
        }

        debug!("Aggregating user configs");
        self.repo.stat(&query).await
    }
}

fn validate_aggregate(query: &StatQuery) -> Result<(), DomainError> {
    let aggregate = &query.aggregate;
    if aggregate.group_by.is_empty() && aggregate.fields.is_empty() {
        return Err(DomainError::validation(
            "query.aggregate",
            "at least one group key or field is required",
        ));
    }

    let names = aggregate
        .group_by
        .iter()
        .map(|g| g.name.as_str())
        .chain(aggregate.fields.iter().map(|f| f.name.as_str()));
    let mut seen = Vec::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(DomainError::validation(
                "query.aggregate",
                "output names cannot be empty",
            ));
        }
        if seen.contains(&name) {
            return Err(DomainError::validation(
                "query.aggregate",
                format!("duplicate output name '{name}'"),
            ));
        }
        seen.push(name);
    }

    for field in &aggregate.fields {
        if field.operator != AggregateOperator::Count && field.key.is_none() {
            return Err(DomainError::validation(
                "query.aggregate",
                format!("field '{}' requires a key", field.name),
            ));
        }
    }

    Ok(())
}
