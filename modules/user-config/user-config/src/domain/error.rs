use thiserror::Error;
use user_config_sdk::UserConfigError;

/// Domain-specific errors using thiserror
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Permission denied: {reason}")]
    PermissionDenied { reason: String },

    #[error("User config not found: {name}")]
    NotFound { name: String },

    #[error("User config '{name}' already exists")]
    AlreadyExists { name: String },

    #[error("Invariant violated: {message}")]
    InvariantViolation { message: String },

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn required(field: impl Into<String>) -> Self {
        Self::validation(field, "required parameter is missing")
    }

    pub fn permission_denied(reason: impl Into<String>) -> Self {
        Self::PermissionDenied {
            reason: reason.into(),
        }
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    pub fn already_exists(name: impl Into<String>) -> Self {
        Self::AlreadyExists { name: name.into() }
    }

    pub fn invariant_violation(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        Self::database(e.to_string())
    }
}

/// Convert domain errors to SDK errors for public API consumption.
impl From<DomainError> for UserConfigError {
    fn from(domain_error: DomainError) -> Self {
        match domain_error {
            DomainError::Validation { field, message } => {
                UserConfigError::validation(format!("{field}: {message}"))
            }
            DomainError::PermissionDenied { reason } => UserConfigError::permission_denied(reason),
            DomainError::NotFound { name } => UserConfigError::not_found(name),
            DomainError::AlreadyExists { name } => UserConfigError::conflict(name),
            e @ (DomainError::InvariantViolation { .. } | DomainError::Database { .. }) => {
                tracing::error!(error = %e, "Internal user config error");
                UserConfigError::internal()
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_required_is_validation() {
        let err = DomainError::required("name");
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "name"));
    }

    #[test]
    fn test_sdk_mapping_hides_internal_details() {
        let sdk: UserConfigError = DomainError::database("connection reset").into();
        assert_eq!(sdk, UserConfigError::Internal);

        let sdk: UserConfigError = DomainError::invariant_violation("2 records").into();
        assert_eq!(sdk, UserConfigError::Internal);
    }

    #[test]
    fn test_sdk_mapping_keeps_client_errors() {
        let sdk: UserConfigError = DomainError::not_found("theme").into();
        assert_eq!(sdk, UserConfigError::not_found("theme"));

        let sdk: UserConfigError = DomainError::already_exists("theme").into();
        assert_eq!(sdk, UserConfigError::conflict("theme"));

        let sdk: UserConfigError = DomainError::validation("name", "too long").into();
        assert_eq!(sdk, UserConfigError::validation("name: too long"));
    }
}
