//! Query types accepted by `list` and `stat`.
//!
//! Condition keys are dotted paths over a user config document, e.g.
//! `name`, `user_id`, `data.color` or `tags.env`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison applied by a [`Condition`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    #[default]
    Eq,
    Not,
    In,
    NotIn,
    Contain,
    NotContain,
    Lt,
    Lte,
    Gt,
    Gte,
    Exists,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(alias = "k")]
    pub key: String,
    #[serde(alias = "v", default)]
    pub value: Value,
    #[serde(alias = "o", default)]
    pub operator: Operator,
}

impl Condition {
    pub fn new(key: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            operator,
        }
    }

    pub fn equals(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(key, Operator::Eq, value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub key: String,
    #[serde(default)]
    pub desc: bool,
}

/// Offset pagination. `start` is 1-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Page {
    pub start: Option<u64>,
    pub limit: Option<u64>,
}

/// Query for `list`.
///
/// A record matches when every `filter` condition holds and, if `filter_or`
/// is non-empty, at least one of its conditions holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Query {
    pub filter: Vec<Condition>,
    pub filter_or: Vec<Condition>,
    pub keyword: Option<String>,
    pub sort: Option<Sort>,
    pub page: Option<Page>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateOperator {
    Count,
    Sum,
    Min,
    Max,
    Average,
    AddToSet,
}

/// A grouping key: the value at `key` is emitted under `name` in every row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupKey {
    pub key: String,
    pub name: String,
}

/// An aggregated output column. `key` is required for every operator except `count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateField {
    pub name: String,
    pub operator: AggregateOperator,
    #[serde(default)]
    pub key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Aggregate {
    pub group_by: Vec<GroupKey>,
    pub fields: Vec<AggregateField>,
}

/// Query for `stat`. Rows can be sorted by any output column name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatQuery {
    pub filter: Vec<Condition>,
    pub filter_or: Vec<Condition>,
    pub keyword: Option<String>,
    pub aggregate: Aggregate,
    pub sort: Option<Sort>,
    pub page: Option<Page>,
}
