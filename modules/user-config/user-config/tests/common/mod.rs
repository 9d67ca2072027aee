#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

//! Common test utilities for user-config integration tests

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use serde_json::{Map, Value};
use user_config::infra::storage::migrations::Migrator;
use user_config_sdk::{RequestContext, SetUserConfigRequest, UserType};

pub const DOMAIN: &str = "d1";

pub async fn inmem_db() -> DatabaseConnection {
    // Every pooled connection to `:memory:` would open its own database
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1);
    let db = Database::connect(opts).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn user_ctx(user_id: &str) -> RequestContext {
    RequestContext::builder()
        .user_id(user_id)
        .domain_id(DOMAIN)
        .user_type(UserType::User)
        .build()
}

pub fn owner_ctx() -> RequestContext {
    RequestContext::builder()
        .user_id("owner")
        .domain_id(DOMAIN)
        .user_type(UserType::DomainOwner)
        .build()
}

pub fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

pub fn set_request(name: &str, data: Value) -> SetUserConfigRequest {
    SetUserConfigRequest {
        name: Some(name.to_owned()),
        data: Some(object(data)),
        tags: None,
        domain_id: Some(DOMAIN.to_owned()),
    }
}
