//! Record identifier type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// Maximum accepted length of a record id, in bytes.
const MAX_LEN: usize = 256;

/// The primary key of a record within a collection.
///
/// # Example
///
/// ```
/// use roster_core::RecordId;
///
/// let id = RecordId::new("s1").unwrap();
/// assert_eq!(id.as_str(), "s1");
/// assert!(RecordId::new("").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

impl RecordId {
    /// Create a new record id, validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty, too long, or contains control characters.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        Self::validate(&s)?;
        Ok(Self(s))
    }

    /// Returns the id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(s: &str) -> Result<(), Error> {
        let reason = if s.is_empty() {
            "cannot be empty"
        } else if s.len() > MAX_LEN {
            "exceeds maximum length of 256 bytes"
        } else if s.chars().any(char::is_control) {
            "cannot contain control characters"
        } else {
            return Ok(());
        };

        Err(InvalidInputError::RecordId {
            value: s.to_string(),
            reason: reason.to_string(),
        }
        .into())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for RecordId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
