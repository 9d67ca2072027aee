use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition as SqlCondition, DatabaseConnection,
    EntityTrait, IntoActiveModel, QueryFilter, SqlErr,
};
use serde_json::Value;
use time::OffsetDateTime;
use user_config_sdk::{Condition, Operator, Query, StatQuery, UserConfig, UserConfigsPage};

use crate::domain::error::DomainError;
use crate::domain::repo::{AccessScope, NewUserConfig, UserConfigPatch, UserConfigRepository};

use super::entity::{self, Entity as UserConfigEntity};
use super::evaluate;
use super::mapper::tags_to_json;

pub struct SeaOrmUserConfigRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserConfigRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(
        &self,
        domain_id: &str,
        user_id: &str,
        name: &str,
    ) -> Result<Option<entity::Model>, DomainError> {
        let id = (domain_id.to_owned(), user_id.to_owned(), name.to_owned());
        Ok(UserConfigEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn patch_model(
        &self,
        model: entity::Model,
        patch: UserConfigPatch,
    ) -> Result<UserConfig, DomainError> {
        let mut active_model = model.into_active_model();
        if let Some(data) = patch.data {
            active_model.data = ActiveValue::Set(Value::Object(data));
        }
        if let Some(tags) = patch.tags {
            active_model.tags = ActiveValue::Set(tags_to_json(&tags));
        }
        active_model.updated_at = ActiveValue::Set(OffsetDateTime::now_utc());

        active_model.update(&self.db).await?.try_into()
    }

    /// Load candidate rows, narrowing in SQL by the key columns the filter pins.
    async fn load(&self, filter: &[Condition]) -> Result<Vec<UserConfig>, DomainError> {
        UserConfigEntity::find()
            .filter(pushdown(filter))
            .all(&self.db)
            .await?
            .into_iter()
            .map(UserConfig::try_from)
            .collect()
    }
}

fn pushdown(filter: &[Condition]) -> SqlCondition {
    let mut condition = SqlCondition::all();
    for cond in filter {
        if cond.operator != Operator::Eq {
            continue;
        }
        let Some(value) = cond.value.as_str() else {
            continue;
        };
        let column = match cond.key.as_str() {
            "domain_id" => entity::Column::DomainId,
            "user_id" => entity::Column::UserId,
            "name" => entity::Column::Name,
            _ => continue,
        };
        condition = condition.add(column.eq(value));
    }
    condition
}

#[async_trait]
impl UserConfigRepository for SeaOrmUserConfigRepository {
    async fn create(&self, new: NewUserConfig) -> Result<UserConfig, DomainError> {
        let now = OffsetDateTime::now_utc();
        let name = new.name.clone();

        let active_model = entity::ActiveModel {
            domain_id: ActiveValue::Set(new.domain_id),
            user_id: ActiveValue::Set(new.user_id),
            name: ActiveValue::Set(new.name),
            data: ActiveValue::Set(Value::Object(new.data)),
            tags: ActiveValue::Set(tags_to_json(&new.tags)),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        match active_model.insert(&self.db).await {
            Ok(model) => model.try_into(),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(DomainError::already_exists(name))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update(
        &self,
        scope: &AccessScope,
        name: &str,
        patch: UserConfigPatch,
    ) -> Result<UserConfig, DomainError> {
        let model = self
            .find_model(&scope.domain_id, &scope.user_id, name)
            .await?
            .ok_or_else(|| DomainError::not_found(name))?;
        self.patch_model(model, patch).await
    }

    async fn update_record(
        &self,
        existing: &UserConfig,
        patch: UserConfigPatch,
    ) -> Result<UserConfig, DomainError> {
        let model = self
            .find_model(&existing.domain_id, &existing.user_id, &existing.name)
            .await?
            .ok_or_else(|| DomainError::not_found(existing.name.clone()))?;
        self.patch_model(model, patch).await
    }

    async fn upsert(
        &self,
        scope: &AccessScope,
        name: &str,
        patch: UserConfigPatch,
    ) -> Result<UserConfig, DomainError> {
        let now = OffsetDateTime::now_utc();

        let mut columns_to_update = vec![entity::Column::UpdatedAt];
        if patch.data.is_some() {
            columns_to_update.push(entity::Column::Data);
        }
        if patch.tags.is_some() {
            columns_to_update.push(entity::Column::Tags);
        }

        let active_model = entity::ActiveModel {
            domain_id: ActiveValue::Set(scope.domain_id.clone()),
            user_id: ActiveValue::Set(scope.user_id.clone()),
            name: ActiveValue::Set(name.to_owned()),
            data: ActiveValue::Set(Value::Object(patch.data.unwrap_or_default())),
            tags: ActiveValue::Set(tags_to_json(&patch.tags.unwrap_or_default())),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        UserConfigEntity::insert(active_model)
            .on_conflict(
                OnConflict::columns([
                    entity::Column::DomainId,
                    entity::Column::UserId,
                    entity::Column::Name,
                ])
                .update_columns(columns_to_update)
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        self.find_model(&scope.domain_id, &scope.user_id, name)
            .await?
            .ok_or_else(|| DomainError::database("Record should exist after upsert"))?
            .try_into()
    }

    async fn delete(&self, scope: &AccessScope, name: &str) -> Result<(), DomainError> {
        let id = (scope.domain_id.clone(), scope.user_id.clone(), name.to_owned());
        let result = UserConfigEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found(name));
        }
        Ok(())
    }

    async fn get(
        &self,
        scope: &AccessScope,
        name: &str,
        only: Option<&[String]>,
    ) -> Result<UserConfig, DomainError> {
        let model = self
            .find_model(&scope.domain_id, &scope.user_id, name)
            .await?
            .ok_or_else(|| DomainError::not_found(name))?;
        Ok(evaluate::project(model.try_into()?, only))
    }

    async fn find(&self, scope: &AccessScope, name: &str) -> Result<Vec<UserConfig>, DomainError> {
        self.find_model(&scope.domain_id, &scope.user_id, name)
            .await?
            .into_iter()
            .map(UserConfig::try_from)
            .collect()
    }

    async fn list(&self, query: &Query) -> Result<UserConfigsPage, DomainError> {
        let records = self.load(&query.filter).await?;
        evaluate::select(records, query)
    }

    async fn stat(&self, query: &StatQuery) -> Result<Vec<Value>, DomainError> {
        let records = self.load(&query.filter).await?;
        evaluate::aggregate(records, query)
    }
}
