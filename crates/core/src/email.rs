//! Email address value object.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

const MAX_LEN: usize = 254;

/// A syntactically plausible email address.
///
/// Only shape is checked (one `@`, non-empty local part and domain, no
/// whitespace). Comparison is exact: the session claim and stored booking
/// owner must match byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn parse(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if value.is_empty() || value.len() > MAX_LEN {
            return Err(DomainError::validation("email must be 1-254 characters"));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("email must not contain whitespace"));
        }
        let Some((local, domain)) = value.split_once('@') else {
            return Err(DomainError::validation("email must contain '@'"));
        };
        if local.is_empty() || domain.is_empty() || domain.contains('@') {
            return Err(DomainError::validation(format!("invalid email: {value}")));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Email {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}
