//! Query-filter builder used by `list` and `stat`.
//!
//! The builder takes the client query and appends server-side conditions
//! before it reaches the repository. Only fields named in the operation's
//! permitted list may be appended.

use user_config_sdk::{Condition, Operator, Query, RequestContext, StatQuery};

use super::error::DomainError;

/// Pseudo-field that stands for "restrict to the caller's own records".
pub const SELF_FILTER: &str = "user_self";

/// Queries the builder can augment.
pub trait FilterTarget {
    fn filter_mut(&mut self) -> &mut Vec<Condition>;
    fn filter_or_mut(&mut self) -> &mut Vec<Condition>;
    fn take_keyword(&mut self) -> Option<String>;
}

impl FilterTarget for Query {
    fn filter_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.filter
    }

    fn filter_or_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.filter_or
    }

    fn take_keyword(&mut self) -> Option<String> {
        self.keyword.take()
    }
}

impl FilterTarget for StatQuery {
    fn filter_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.filter
    }

    fn filter_or_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.filter_or
    }

    fn take_keyword(&mut self) -> Option<String> {
        self.keyword.take()
    }
}

pub struct QueryFilterBuilder<'p, Q> {
    query: Q,
    permitted: &'p [&'p str],
}

impl<'p, Q: FilterTarget> QueryFilterBuilder<'p, Q> {
    pub fn new(query: Q, permitted: &'p [&'p str]) -> Self {
        Self { query, permitted }
    }

    fn ensure_permitted(&self, field: &str) -> Result<(), DomainError> {
        if self.permitted.contains(&field) {
            Ok(())
        } else {
            Err(DomainError::validation(
                field,
                "filter is not permitted for this operation",
            ))
        }
    }

    /// Append `field == value` when a value is present.
    pub fn append_eq(mut self, field: &str, value: Option<&str>) -> Result<Self, DomainError> {
        self.ensure_permitted(field)?;
        if let Some(value) = value {
            self.query
                .filter_mut()
                .push(Condition::equals(field, value));
        }
        Ok(self)
    }

    /// Restrict results to the caller's records unless the caller owns the domain.
    pub fn append_self_filter(mut self, ctx: &RequestContext) -> Result<Self, DomainError> {
        self.ensure_permitted(SELF_FILTER)?;
        if !ctx.is_domain_owner() {
            self.query
                .filter_mut()
                .push(Condition::equals("user_id", ctx.user_id()));
        }
        Ok(self)
    }

    /// Rewrite the free-text keyword into `contain` conditions over `fields`.
    #[must_use]
    pub fn append_keyword(mut self, fields: &[&str]) -> Self {
        let keyword = self
            .query
            .take_keyword()
            .map(|k| k.trim().to_owned())
            .filter(|k| !k.is_empty());

        if let Some(keyword) = keyword {
            let filter_or = self.query.filter_or_mut();
            for field in fields {
                filter_or.push(Condition::new(*field, Operator::Contain, keyword.clone()));
            }
        }
        self
    }

    pub fn build(self) -> Q {
        self.query
    }
}
