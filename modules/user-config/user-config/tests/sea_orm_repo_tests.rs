#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Integration tests for the SeaORM repository against in-memory SQLite

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use common::{DOMAIN, inmem_db, object, set_request, user_ctx};
use serde_json::json;
use user_config::domain::error::DomainError;
use user_config::domain::repo::{AccessScope, NewUserConfig, UserConfigPatch, UserConfigRepository};
use user_config::domain::service::{Service, ServiceConfig};
use user_config::infra::SeaOrmUserConfigRepository;
use user_config_sdk::{
    Aggregate, AggregateField, AggregateOperator, Condition, GroupKey, ListUserConfigsRequest,
    Operator, Page, Query, Sort, StatQuery,
};

fn new_config(user_id: &str, name: &str, data: serde_json::Value) -> NewUserConfig {
    NewUserConfig {
        name: name.to_owned(),
        data: object(data),
        tags: BTreeMap::from([("env".to_owned(), "prod".to_owned())]),
        user_id: user_id.to_owned(),
        domain_id: DOMAIN.to_owned(),
    }
}

async fn seeded_repo() -> SeaOrmUserConfigRepository {
    let repo = SeaOrmUserConfigRepository::new(inmem_db().await);
    repo.create(new_config("u1", "theme", json!({"color": "dark", "size": 12})))
        .await
        .unwrap();
    repo.create(new_config("u1", "language", json!({"code": "en"})))
        .await
        .unwrap();
    repo.create(new_config("u2", "theme", json!({"color": "light", "size": 14})))
        .await
        .unwrap();
    repo
}

// =============================================================================
// Single-record operations
// =============================================================================

#[tokio::test]
async fn test_create_and_get_round_trip() {
    let repo = SeaOrmUserConfigRepository::new(inmem_db().await);
    let created = repo
        .create(new_config("u1", "theme", json!({"color": "dark"})))
        .await
        .unwrap();

    let fetched = repo
        .get(&AccessScope::new(DOMAIN, "u1"), "theme", None)
        .await
        .unwrap();

    assert_eq!(fetched.name, created.name);
    assert_eq!(fetched.data, created.data);
    assert_eq!(fetched.tags["env"], "prod");
    assert_eq!(fetched.user_id, "u1");
}

#[tokio::test]
async fn test_create_duplicate_key_is_already_exists() {
    let repo = seeded_repo().await;
    let err = repo
        .create(new_config("u1", "theme", json!({})))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::AlreadyExists { .. }));
}

#[tokio::test]
async fn test_get_is_scoped_to_user() {
    let repo = seeded_repo().await;
    let err = repo
        .get(&AccessScope::new(DOMAIN, "u2"), "language", None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn test_update_patches_only_given_fields() {
    let repo = seeded_repo().await;
    let scope = AccessScope::new(DOMAIN, "u1");

    let updated = repo
        .update(
            &scope,
            "theme",
            UserConfigPatch {
                data: Some(object(json!({"color": "blue"}))),
                tags: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.data["color"], "blue");
    assert_eq!(updated.tags["env"], "prod");
    assert!(updated.updated_at >= updated.created_at);
}

#[tokio::test]
async fn test_upsert_inserts_then_updates() {
    let repo = SeaOrmUserConfigRepository::new(inmem_db().await);
    let scope = AccessScope::new(DOMAIN, "u1");

    let first = repo
        .upsert(
            &scope,
            "theme",
            UserConfigPatch {
                data: Some(object(json!({"color": "dark"}))),
                tags: Some(BTreeMap::from([("env".to_owned(), "dev".to_owned())])),
            },
        )
        .await
        .unwrap();
    assert_eq!(first.data["color"], "dark");

    let second = repo
        .upsert(
            &scope,
            "theme",
            UserConfigPatch {
                data: Some(object(json!({"color": "light"}))),
                tags: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(second.data["color"], "light");
    assert_eq!(second.tags["env"], "dev");
    assert_eq!(repo.find(&scope, "theme").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_then_find_is_empty() {
    let repo = seeded_repo().await;
    let scope = AccessScope::new(DOMAIN, "u1");

    repo.delete(&scope, "theme").await.unwrap();
    assert!(repo.find(&scope, "theme").await.unwrap().is_empty());

    let err = repo.delete(&scope, "theme").await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn test_get_with_projection() {
    let repo = seeded_repo().await;
    let only = vec!["data".to_owned()];
    let projected = repo
        .get(
            &AccessScope::new(DOMAIN, "u1"),
            "theme",
            Some(only.as_slice()),
        )
        .await
        .unwrap();

    assert_eq!(projected.data["color"], "dark");
    assert!(projected.tags.is_empty());
}

// =============================================================================
// Queries
// =============================================================================

#[tokio::test]
async fn test_list_filters_sorts_and_paginates() {
    let repo = seeded_repo().await;
    let query = Query {
        filter: vec![
            Condition::equals("domain_id", DOMAIN),
            Condition::new("data.size", Operator::Exists, true),
        ],
        sort: Some(Sort {
            key: "data.size".to_owned(),
            desc: true,
        }),
        page: Some(Page {
            start: Some(1),
            limit: Some(1),
        }),
        ..Query::default()
    };

    let page = repo.list(&query).await.unwrap();

    assert_eq!(page.total_count, 2);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].user_id, "u2");
}

#[tokio::test]
async fn test_list_pushes_down_user_filter() {
    let repo = seeded_repo().await;
    let query = Query {
        filter: vec![Condition::equals("user_id", "u1")],
        ..Query::default()
    };

    let page = repo.list(&query).await.unwrap();

    assert_eq!(page.total_count, 2);
    assert!(page.items.iter().all(|c| c.user_id == "u1"));
}

#[tokio::test]
async fn test_stat_groups_by_name() {
    let repo = seeded_repo().await;
    let query = StatQuery {
        filter: vec![Condition::equals("domain_id", DOMAIN)],
        aggregate: Aggregate {
            group_by: vec![GroupKey {
                key: "name".to_owned(),
                name: "name".to_owned(),
            }],
            fields: vec![
                AggregateField {
                    name: "total".to_owned(),
                    operator: AggregateOperator::Count,
                    key: None,
                },
                AggregateField {
                    name: "max_size".to_owned(),
                    operator: AggregateOperator::Max,
                    key: Some("data.size".to_owned()),
                },
            ],
        },
        ..StatQuery::default()
    };

    let rows = repo.stat(&query).await.unwrap();

    assert_eq!(
        rows,
        vec![
            json!({"name": "language", "total": 1, "max_size": null}),
            json!({"name": "theme", "total": 2, "max_size": 14}),
        ]
    );
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_set_keeps_one_record() {
    let repo = Arc::new(SeaOrmUserConfigRepository::new(inmem_db().await));
    let service = Arc::new(Service::new(repo, ServiceConfig::default()));
    let ctx = user_ctx("u1");

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let service = Arc::clone(&service);
            let ctx = ctx.clone();
            tokio::spawn(async move { service.set(&ctx, set_request("theme", json!({"n": i}))).await })
        })
        .collect();

    let mut written = Vec::new();
    for handle in handles {
        let cfg = handle.await.unwrap().unwrap();
        written.push(cfg.data["n"].clone());
    }

    let list = ListUserConfigsRequest {
        domain_id: Some(DOMAIN.to_owned()),
        ..ListUserConfigsRequest::default()
    };
    let page = service.list(&ctx, list.clone()).await.unwrap();
    assert_eq!(page.total_count, 1);
    assert!(written.contains(&page.items[0].data["n"]));

    service
        .set(&ctx, set_request("theme", json!({"n": "last"})))
        .await
        .unwrap();
    let page = service.list(&ctx, list).await.unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].data["n"], "last");
}
