//! Configuration for the user config module.
//!
//! The module section lives at `modules.user_config` of the application
//! configuration. A missing section or a missing `config` key falls back to
//! the defaults; a present but malformed `config` is an error.

use figment::Figment;
use serde::Deserialize;

use crate::domain::service::ServiceConfig;

pub const MODULE_NAME: &str = "user_config";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid config for module '{module}': {source}")]
    InvalidConfig {
        module: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration for the user config module.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct UserConfigModuleConfig {
    /// Longest accepted config name, in characters.
    /// Default: `128`
    pub max_name_length: usize,

    /// Most tags a single record may carry.
    /// Default: `64`
    pub max_tags: usize,

    /// Page size used by `list` when the query has none.
    /// Default: `50`
    pub default_page_size: u64,

    /// Upper bound for any requested page size.
    /// Default: `1000`
    pub max_page_size: u64,
}

impl Default for UserConfigModuleConfig {
    fn default() -> Self {
        let service = ServiceConfig::default();
        Self {
            max_name_length: service.max_name_length,
            max_tags: service.max_tags,
            default_page_size: service.default_page_size,
            max_page_size: service.max_page_size,
        }
    }
}

impl UserConfigModuleConfig {
    /// Load the module configuration, falling back to defaults when absent.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidConfig` if the `config` section exists but
    /// cannot be deserialized.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let path = format!("modules.{MODULE_NAME}");
        let Ok(module_raw) = figment.extract_inner::<serde_json::Value>(&path) else {
            return Ok(Self::default());
        };
        let Some(config_section) = module_raw.as_object().and_then(|m| m.get("config")) else {
            return Ok(Self::default());
        };

        serde_json::from_value(config_section.clone()).map_err(|e| ConfigError::InvalidConfig {
            module: MODULE_NAME.to_owned(),
            source: e,
        })
    }

    #[must_use]
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            max_name_length: self.max_name_length,
            max_tags: self.max_tags,
            default_page_size: self.default_page_size.max(1),
            max_page_size: self.max_page_size.max(1),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use figment::providers::Serialized;
    use serde_json::json;

    fn figment(value: serde_json::Value) -> Figment {
        Figment::new().merge(Serialized::defaults(value))
    }

    #[test]
    fn test_default_config() {
        let cfg = UserConfigModuleConfig::default();
        assert_eq!(cfg.max_name_length, 128);
        assert_eq!(cfg.max_tags, 64);
        assert_eq!(cfg.default_page_size, 50);
        assert_eq!(cfg.max_page_size, 1000);
    }

    #[test]
    fn test_missing_module_returns_default() {
        let cfg = UserConfigModuleConfig::from_figment(&figment(json!({"modules": {}}))).unwrap();
        assert_eq!(cfg, UserConfigModuleConfig::default());

        let cfg = UserConfigModuleConfig::from_figment(&figment(json!({
            "modules": {"user_config": {"database": {}}}
        })))
        .unwrap();
        assert_eq!(cfg, UserConfigModuleConfig::default());
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let cfg = UserConfigModuleConfig::from_figment(&figment(json!({
            "modules": {"user_config": {"config": {"max_tags": 8}}}
        })))
        .unwrap();
        assert_eq!(cfg.max_tags, 8);
        assert_eq!(cfg.max_page_size, 1000);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result = UserConfigModuleConfig::from_figment(&figment(json!({
            "modules": {"user_config": {"config": {"max_tagz": 8}}}
        })));
        assert!(matches!(result, Err(ConfigError::InvalidConfig { .. })));
    }

    #[test]
    fn test_service_config_never_has_zero_page_size() {
        let cfg = UserConfigModuleConfig {
            default_page_size: 0,
            ..UserConfigModuleConfig::default()
        };
        assert_eq!(cfg.service_config().default_page_size, 1);
    }
}
