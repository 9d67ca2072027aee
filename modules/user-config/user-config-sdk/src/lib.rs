#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! User Config SDK
//!
//! This crate provides the public API for the `user-config` module:
//! - `UserConfigApi` trait
//! - Model and request types for user configs
//! - Query types used by `list` and `stat`
//! - `RequestContext` carrying the caller identity
//! - Error type (`UserConfigError`)
//!
//! ## Usage
//!
//! ```ignore
//! use user_config_sdk::{RequestContext, SetUserConfigRequest, UserConfigApi, UserType};
//!
//! let ctx = RequestContext::builder()
//!     .user_id("user-1")
//!     .domain_id("domain-1")
//!     .user_type(UserType::User)
//!     .build();
//!
//! let cfg = client.set(&ctx, request).await?;
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod api;
pub mod context;
pub mod errors;
pub mod models;
pub mod query;

pub use api::UserConfigApi;
pub use context::{RequestContext, RequestContextBuilder, UserType};
pub use errors::UserConfigError;
pub use models::{
    CreateUserConfigRequest, DeleteUserConfigRequest, GetUserConfigRequest,
    ListUserConfigsRequest, SetUserConfigRequest, StatUserConfigsRequest, TagPair, TagsInput,
    UpdateUserConfigRequest, UserConfig, UserConfigsPage,
};
pub use query::{
    Aggregate, AggregateField, AggregateOperator, Condition, GroupKey, Operator, Page, Query,
    Sort, StatQuery,
};
