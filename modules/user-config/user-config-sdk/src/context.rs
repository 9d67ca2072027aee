use serde::{Deserialize, Serialize};

/// Role of the caller as resolved by the authentication layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    #[default]
    User,
    ApiUser,
    DomainOwner,
}

impl UserType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::User => "USER",
            UserType::ApiUser => "API_USER",
            UserType::DomainOwner => "DOMAIN_OWNER",
        }
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `RequestContext` carries the authenticated caller identity for a single call.
///
/// It is produced by the authentication layer and passed explicitly into every
/// operation. Client payloads never override the identity it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    user_id: String,
    domain_id: String,
    user_type: UserType,
}

impl RequestContext {
    /// Create a new `RequestContext` builder
    #[must_use]
    pub fn builder() -> RequestContextBuilder {
        RequestContextBuilder::default()
    }

    /// Identity of the calling user
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Domain (tenant) the caller authenticated against
    #[must_use]
    pub fn domain_id(&self) -> &str {
        &self.domain_id
    }

    #[must_use]
    pub fn user_type(&self) -> UserType {
        self.user_type
    }

    #[must_use]
    pub fn is_domain_owner(&self) -> bool {
        self.user_type == UserType::DomainOwner
    }
}

#[derive(Default)]
pub struct RequestContextBuilder {
    user_id: Option<String>,
    domain_id: Option<String>,
    user_type: Option<UserType>,
}

impl RequestContextBuilder {
    #[must_use]
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    #[must_use]
    pub fn domain_id(mut self, domain_id: impl Into<String>) -> Self {
        self.domain_id = Some(domain_id.into());
        self
    }

    #[must_use]
    pub fn user_type(mut self, user_type: UserType) -> Self {
        self.user_type = Some(user_type);
        self
    }

    #[must_use]
    pub fn build(self) -> RequestContext {
        RequestContext {
            user_id: self.user_id.unwrap_or_default(),
            domain_id: self.domain_id.unwrap_or_default(),
            user_type: self.user_type.unwrap_or_default(),
        }
    }
}
