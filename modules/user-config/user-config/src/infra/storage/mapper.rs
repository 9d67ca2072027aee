use std::collections::BTreeMap;

use serde_json::Value;
use user_config_sdk::UserConfig;

use crate::domain::error::DomainError;

use super::entity;

impl TryFrom<entity::Model> for UserConfig {
    type Error = DomainError;

    fn try_from(model: entity::Model) -> Result<Self, Self::Error> {
        let Value::Object(data) = model.data else {
            return Err(DomainError::database(format!(
                "user config '{}' has a non-object data column",
                model.name
            )));
        };
        let tags: BTreeMap<String, String> = serde_json::from_value(model.tags)
            .map_err(|e| DomainError::database(format!("invalid tags column: {e}")))?;

        Ok(UserConfig {
            name: model.name,
            data,
            tags,
            user_id: model.user_id,
            domain_id: model.domain_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

pub(super) fn tags_to_json(tags: &BTreeMap<String, String>) -> Value {
    Value::Object(
        tags.iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect(),
    )
}
