#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! User Config Module Implementation
//!
//! The public API is defined in `user-config-sdk` and re-exported here.

pub use user_config_sdk::{
    RequestContext, UserConfig, UserConfigApi, UserConfigError, UserConfigsPage, UserType,
};

pub mod module;
pub use module::UserConfigModule;

pub mod local_client;

#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
