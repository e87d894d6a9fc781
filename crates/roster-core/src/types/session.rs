//! Session token and user identity types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, InvalidInputError};

/// An opaque token naming an authenticated session.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Create a new session token.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or only whitespace.
    pub fn new(token: impl Into<String>) -> Result<Self, Error> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(InvalidInputError::SessionToken {
                reason: "cannot be empty".to_string(),
            }
            .into());
        }
        Ok(Self(token))
    }

    /// Returns the token value for directory lookups.
    ///
    /// # Security
    ///
    /// Use only to compare against a session directory.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionToken").field(&"[REDACTED]").finish()
    }
}

/// The user a session token resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// User name as recorded by the login subsystem.
    pub user: String,
}

impl UserIdentity {
    pub fn new(user: impl Into<String>) -> Self {
        Self { user: user.into() }
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user)
    }
}
