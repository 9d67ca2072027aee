//! Request guards applied at the top of every service operation.
//!
//! Each guard is a plain function over the request context or a request
//! field so it can be composed explicitly and tested on its own.

use tracing::warn;
use user_config_sdk::RequestContext;

use super::error::DomainError;

/// Returns the value of a required field, rejecting `None` and blank strings.
pub fn required(field: &str, value: Option<String>) -> Result<String, DomainError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(DomainError::required(field)),
    }
}

/// Returns the value of a required non-string field.
pub fn required_value<T>(field: &str, value: Option<T>) -> Result<T, DomainError> {
    value.ok_or_else(|| DomainError::required(field))
}

/// Records are user-scoped inside the caller's own domain.
pub fn authorize_user_scope(ctx: &RequestContext, domain_id: &str) -> Result<(), DomainError> {
    if ctx.domain_id() != domain_id {
        warn!(
            caller_domain = ctx.domain_id(),
            requested_domain = domain_id,
            "Rejected cross-domain user config request"
        );
        return Err(DomainError::permission_denied(
            "request domain does not match caller domain",
        ));
    }
    Ok(())
}

/// Domain owners manage the domain, not per-user configs.
pub fn deny_domain_owner(ctx: &RequestContext) -> Result<(), DomainError> {
    if ctx.is_domain_owner() {
        warn!(user_id = ctx.user_id(), "Domain owner attempted to write a user config");
        return Err(DomainError::permission_denied(
            "domain owners cannot manage user configs",
        ));
    }
    Ok(())
}

pub fn max_length(field: &str, value: &str, max: usize) -> Result<(), DomainError> {
    let len = value.chars().count();
    if len > max {
        return Err(DomainError::validation(
            field,
            format!("too long: {len} characters (max: {max})"),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use user_config_sdk::UserType;

    fn ctx(user_type: UserType) -> RequestContext {
        RequestContext::builder()
            .user_id("u1")
            .domain_id("d1")
            .user_type(user_type)
            .build()
    }

    #[test]
    fn test_required_rejects_missing_and_blank() {
        assert!(required("name", None).is_err());
        assert!(required("name", Some("   ".to_owned())).is_err());
        assert_eq!(required("name", Some("theme".to_owned())).unwrap(), "theme");
    }

    #[test]
    fn test_required_value() {
        assert_eq!(required_value("data", Some(5)).unwrap(), 5);
        assert!(required_value::<i32>("data", None).is_err());
    }

    #[test]
    fn test_authorize_user_scope_requires_matching_domain() {
        let ctx = ctx(UserType::User);
        assert!(authorize_user_scope(&ctx, "d1").is_ok());
        let err = authorize_user_scope(&ctx, "d2").unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied { .. }));
    }

    #[test]
    fn test_deny_domain_owner() {
        assert!(deny_domain_owner(&ctx(UserType::User)).is_ok());
        assert!(deny_domain_owner(&ctx(UserType::ApiUser)).is_ok());
        let err = deny_domain_owner(&ctx(UserType::DomainOwner)).unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied { .. }));
    }

    #[test]
    fn test_max_length_counts_chars() {
        assert!(max_length("name", "abc", 3).is_ok());
        assert!(max_length("name", "abcd", 3).is_err());
    }
}
