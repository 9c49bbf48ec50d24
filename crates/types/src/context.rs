//! Security context strings
//!
//! A context has the form `user:role:type[:range]`. The range keeps any
//! further colons (`s0-s0:c0.c1023`), so only the first three separators
//! split fields.

use selutils_errors::PolicyError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A parsed security context.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecurityContext {
    user: String,
    role: String,
    type_: String,
    range: Option<String>,
}

/// Individual fields requested with `-u`, `-r`, `-t` and `-l`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextComponents {
    pub user: Option<String>,
    pub role: Option<String>,
    pub type_: Option<String>,
    pub range: Option<String>,
}

impl ContextComponents {
    /// Whether at least one field was given.
    #[must_use]
    pub fn any(&self) -> bool {
        self.user.is_some() || self.role.is_some() || self.type_.is_some() || self.range.is_some()
    }
}

impl SecurityContext {
    /// Parse a context string.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::InvalidContext`] when fewer than three fields are
    /// present, a field is empty, or the string contains a NUL byte.
    pub fn parse(raw: &str) -> Result<Self, PolicyError> {
        let invalid = || PolicyError::InvalidContext {
            context: raw.to_string(),
        };

        let trimmed = raw.trim_end_matches('\0');
        if trimmed.contains('\0') {
            return Err(invalid());
        }

        let mut fields = trimmed.splitn(4, ':');
        let user = fields.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let role = fields.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let type_ = fields.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let range = match fields.next() {
            Some("") => return Err(invalid()),
            Some(range) => Some(range.to_string()),
            None => None,
        };

        Ok(Self {
            user: user.to_string(),
            role: role.to_string(),
            type_: type_.to_string(),
            range,
        })
    }

    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    #[must_use]
    pub fn type_(&self) -> &str {
        &self.type_
    }

    #[must_use]
    pub fn range(&self) -> Option<&str> {
        self.range.as_deref()
    }

    /// Copy of this context with the given fields replaced.
    #[must_use]
    pub fn with_components(&self, components: &ContextComponents) -> Self {
        Self {
            user: components.user.clone().unwrap_or_else(|| self.user.clone()),
            role: components.role.clone().unwrap_or_else(|| self.role.clone()),
            type_: components.type_.clone().unwrap_or_else(|| self.type_.clone()),
            range: components.range.clone().or_else(|| self.range.clone()),
        }
    }
}

impl FromStr for SecurityContext {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SecurityContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.user, self.role, self.type_)?;
        if let Some(range) = &self.range {
            write!(f, ":{range}")?;
        }
        Ok(())
    }
}
