//! Public error types for the `user-config` module.
//!
//! These errors are safe to expose to other modules and consumers.

use thiserror::Error;

/// Errors that can be returned by the `UserConfigApi`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UserConfigError {
    /// A required field is missing or a field value is invalid.
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The caller is not allowed to perform the operation.
    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    /// No user config with the given name exists for the caller.
    #[error("User config not found: {name}")]
    NotFound { name: String },

    /// A user config with the given name already exists for the caller.
    #[error("User config '{name}' already exists")]
    Conflict { name: String },

    /// An internal error occurred.
    #[error("Internal error")]
    Internal,
}

impl UserConfigError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    pub fn conflict(name: impl Into<String>) -> Self {
        Self::Conflict { name: name.into() }
    }

    #[must_use]
    pub fn internal() -> Self {
        Self::Internal
    }
}
