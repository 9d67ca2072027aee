use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{Map, Value};
use user_config_sdk::{Query, StatQuery, UserConfig, UserConfigsPage};

use super::error::DomainError;

/// Owner of the records a single-record operation may touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessScope {
    pub domain_id: String,
    pub user_id: String,
}

impl AccessScope {
    pub fn new(domain_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            domain_id: domain_id.into(),
            user_id: user_id.into(),
        }
    }
}

/// Values for a new record. Timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserConfig {
    pub name: String,
    pub data: Map<String, Value>,
    pub tags: BTreeMap<String, String>,
    pub user_id: String,
    pub domain_id: String,
}

/// Fields replaced by an update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserConfigPatch {
    pub data: Option<Map<String, Value>>,
    pub tags: Option<BTreeMap<String, String>>,
}

/// Repository trait for user config persistence.
///
/// Implementations enforce uniqueness of (domain_id, user_id, name).
/// Single-record methods only ever see records inside the given scope.
#[async_trait]
pub trait UserConfigRepository: Send + Sync {
    /// Insert a new record. Fails with `AlreadyExists` if the key is taken.
    async fn create(&self, new: NewUserConfig) -> Result<UserConfig, DomainError>;

    /// Apply `patch` to the record with the given name. Fails with `NotFound`.
    async fn update(
        &self,
        scope: &AccessScope,
        name: &str,
        patch: UserConfigPatch,
    ) -> Result<UserConfig, DomainError>;

    /// Apply `patch` to a record previously returned by this repository.
    async fn update_record(
        &self,
        existing: &UserConfig,
        patch: UserConfigPatch,
    ) -> Result<UserConfig, DomainError>;

    /// Atomically insert the record or apply `patch` to the existing one.
    async fn upsert(
        &self,
        scope: &AccessScope,
        name: &str,
        patch: UserConfigPatch,
    ) -> Result<UserConfig, DomainError>;

    /// Delete the record with the given name. Fails with `NotFound`.
    async fn delete(&self, scope: &AccessScope, name: &str) -> Result<(), DomainError>;

    /// Fetch the record with the given name, keeping only the `only` fields
    /// when a projection is given. Fails with `NotFound`.
    async fn get(
        &self,
        scope: &AccessScope,
        name: &str,
        only: Option<&[String]>,
    ) -> Result<UserConfig, DomainError>;

    /// All records stored under the scope with the given name.
    async fn find(&self, scope: &AccessScope, name: &str) -> Result<Vec<UserConfig>, DomainError>;

    /// Records matching the query, paginated, with the pre-pagination total.
    async fn list(&self, query: &Query) -> Result<UserConfigsPage, DomainError>;

    /// Aggregated rows over the records matching the query.
    async fn stat(&self, query: &StatQuery) -> Result<Vec<Value>, DomainError>;
}
