//! Public models for the `user-config` module.
//!
//! These are transport-agnostic data structures that define the contract
//! between the `user-config` module and its consumers.
//!
//! Request types keep every field optional. The required-field matrix is
//! enforced by the service so a missing field surfaces as a validation
//! error instead of a deserialization failure.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::query::{Query, StatQuery};

/// A named key/value document owned by one user within one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    pub name: String,
    pub data: Map<String, Value>,
    pub tags: BTreeMap<String, String>,
    pub user_id: String,
    pub domain_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Loosely-typed tag input accepted from clients.
///
/// Either a mapping (`{"env": "prod"}`) or a list of pairs
/// (`[{"key": "env", "value": "prod"}]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    Map(Map<String, Value>),
    Pairs(Vec<TagPair>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPair {
    pub key: String,
    #[serde(default)]
    pub value: Value,
}

/// Request to create a user config. `user_id` is never accepted from the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateUserConfigRequest {
    pub name: Option<String>,
    pub data: Option<Map<String, Value>>,
    pub tags: Option<TagsInput>,
    pub domain_id: Option<String>,
}

/// Request to create or update the caller's user config with the given name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetUserConfigRequest {
    pub name: Option<String>,
    pub data: Option<Map<String, Value>>,
    pub tags: Option<TagsInput>,
    pub domain_id: Option<String>,
}

/// Request to update an existing user config. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateUserConfigRequest {
    pub name: Option<String>,
    pub data: Option<Map<String, Value>>,
    pub tags: Option<TagsInput>,
    pub domain_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteUserConfigRequest {
    pub name: Option<String>,
    pub domain_id: Option<String>,
}

/// Request to fetch a single user config.
///
/// `only` restricts the returned document to the listed fields. Identity
/// fields (`name`, `user_id`, `domain_id`) are always returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GetUserConfigRequest {
    pub name: Option<String>,
    pub domain_id: Option<String>,
    pub only: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListUserConfigsRequest {
    pub domain_id: Option<String>,
    pub name: Option<String>,
    pub user_id: Option<String>,
    pub query: Option<Query>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatUserConfigsRequest {
    pub domain_id: Option<String>,
    pub query: Option<StatQuery>,
}

/// A page of user configs together with the number of records matching the
/// query before pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfigsPage {
    pub items: Vec<UserConfig>,
    pub total_count: u64,
}
