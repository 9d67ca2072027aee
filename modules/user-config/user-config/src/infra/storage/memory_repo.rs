use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use async_trait::async_trait;
use serde_json::{Map, Value};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use user_config_sdk::{Query, StatQuery, UserConfig, UserConfigsPage};

use crate::domain::error::DomainError;
use crate::domain::repo::{AccessScope, NewUserConfig, UserConfigPatch, UserConfigRepository};

use super::evaluate;

/// (domain_id, user_id, name)
type RecordKey = (String, String, String);

fn key(domain_id: &str, user_id: &str, name: &str) -> RecordKey {
    (domain_id.to_owned(), user_id.to_owned(), name.to_owned())
}

fn apply_patch(record: &mut UserConfig, patch: UserConfigPatch) {
    if let Some(data) = patch.data {
        record.data = data;
    }
    if let Some(tags) = patch.tags {
        record.tags = tags;
    }
    record.updated_at = OffsetDateTime::now_utc();
}

/// Process-local repository. Every write takes the single map lock, so the
/// key uniqueness check and the write happen atomically.
#[derive(Default)]
pub struct InMemoryUserConfigRepository {
    records: RwLock<BTreeMap<RecordKey, UserConfig>>,
}

impl InMemoryUserConfigRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn snapshot(&self) -> Vec<UserConfig> {
        self.records.read().await.values().cloned().collect()
    }

    async fn patch_existing(
        &self,
        key: RecordKey,
        patch: UserConfigPatch,
    ) -> Result<UserConfig, DomainError> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&key)
            .ok_or_else(|| DomainError::not_found(key.2.clone()))?;
        apply_patch(record, patch);
        Ok(record.clone())
    }
}

#[async_trait]
impl UserConfigRepository for InMemoryUserConfigRepository {
    async fn create(&self, new: NewUserConfig) -> Result<UserConfig, DomainError> {
        let mut records = self.records.write().await;
        match records.entry(key(&new.domain_id, &new.user_id, &new.name)) {
            Entry::Occupied(_) => Err(DomainError::already_exists(new.name)),
            Entry::Vacant(slot) => {
                let now = OffsetDateTime::now_utc();
                let record = UserConfig {
                    name: new.name,
                    data: new.data,
                    tags: new.tags,
                    user_id: new.user_id,
                    domain_id: new.domain_id,
                    created_at: now,
                    updated_at: now,
                };
                Ok(slot.insert(record).clone())
            }
        }
    }

    async fn update(
        &self,
        scope: &AccessScope,
        name: &str,
        patch: UserConfigPatch,
    ) -> Result<UserConfig, DomainError> {
        self.patch_existing(key(&scope.domain_id, &scope.user_id, name), patch)
            .await
    }

    async fn update_record(
        &self,
        existing: &UserConfig,
        patch: UserConfigPatch,
    ) -> Result<UserConfig, DomainError> {
        self.patch_existing(
            key(&existing.domain_id, &existing.user_id, &existing.name),
            patch,
        )
        .await
    }

    async fn upsert(
        &self,
        scope: &AccessScope,
        name: &str,
        patch: UserConfigPatch,
    ) -> Result<UserConfig, DomainError> {
        let mut records = self.records.write().await;
        let record = match records.entry(key(&scope.domain_id, &scope.user_id, name)) {
            Entry::Occupied(slot) => {
                let record = slot.into_mut();
                apply_patch(record, patch);
                record
            }
            Entry::Vacant(slot) => {
                let now = OffsetDateTime::now_utc();
                slot.insert(UserConfig {
                    name: name.to_owned(),
                    data: patch.data.unwrap_or_else(Map::new),
                    tags: patch.tags.unwrap_or_default(),
                    user_id: scope.user_id.clone(),
                    domain_id: scope.domain_id.clone(),
                    created_at: now,
                    updated_at: now,
                })
            }
        };
        Ok(record.clone())
    }

    async fn delete(&self, scope: &AccessScope, name: &str) -> Result<(), DomainError> {
        let mut records = self.records.write().await;
        records
            .remove(&key(&scope.domain_id, &scope.user_id, name))
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found(name))
    }

    async fn get(
        &self,
        scope: &AccessScope,
        name: &str,
        only: Option<&[String]>,
    ) -> Result<UserConfig, DomainError> {
        let records = self.records.read().await;
        records
            .get(&key(&scope.domain_id, &scope.user_id, name))
            .cloned()
            .map(|record| evaluate::project(record, only))
            .ok_or_else(|| DomainError::not_found(name))
    }

    async fn find(&self, scope: &AccessScope, name: &str) -> Result<Vec<UserConfig>, DomainError> {
        let records = self.records.read().await;
        Ok(records
            .get(&key(&scope.domain_id, &scope.user_id, name))
            .cloned()
            .into_iter()
            .collect())
    }

    async fn list(&self, query: &Query) -> Result<UserConfigsPage, DomainError> {
        evaluate::select(self.snapshot().await, query)
    }

    async fn stat(&self, query: &StatQuery) -> Result<Vec<Value>, DomainError> {
        evaluate::aggregate(self.snapshot().await, query)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_config(user: &str, name: &str, color: &str) -> NewUserConfig {
        NewUserConfig {
            name: name.to_owned(),
            data: json!({"color": color}).as_object().cloned().unwrap(),
            tags: BTreeMap::new(),
            user_id: user.to_owned(),
            domain_id: "d1".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_key() {
        let repo = InMemoryUserConfigRepository::new();
        repo.create(new_config("u1", "theme", "dark")).await.unwrap();

        let err = repo
            .create(new_config("u1", "theme", "light"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::AlreadyExists { .. }));

        // Same name for another user is a different key
        repo.create(new_config("u2", "theme", "light")).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_is_scoped_to_owner() {
        let repo = InMemoryUserConfigRepository::new();
        repo.create(new_config("u1", "theme", "dark")).await.unwrap();

        let err = repo
            .update(
                &AccessScope::new("d1", "u2"),
                "theme",
                UserConfigPatch::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_patches() {
        let repo = InMemoryUserConfigRepository::new();
        let scope = AccessScope::new("d1", "u1");
        let tags: BTreeMap<String, String> = [("env".to_owned(), "prod".to_owned())].into();

        let first = repo
            .upsert(
                &scope,
                "theme",
                UserConfigPatch {
                    data: json!({"color": "dark"}).as_object().cloned(),
                    tags: Some(tags.clone()),
                },
            )
            .await
            .unwrap();
        assert_eq!(first.tags, tags);

        let second = repo
            .upsert(
                &scope,
                "theme",
                UserConfigPatch {
                    data: json!({"color": "light"}).as_object().cloned(),
                    tags: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(second.data["color"], "light");
        assert_eq!(second.tags, tags);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(repo.find(&scope, "theme").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let repo = InMemoryUserConfigRepository::new();
        let err = repo
            .delete(&AccessScope::new("d1", "u1"), "theme")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
