//! Session directory trait.

use async_trait::async_trait;

use crate::types::{SessionToken, UserIdentity};
use crate::Result;

/// Maps session tokens to the users that own them.
#[async_trait]
pub trait SessionDirectory: Send + Sync {
    /// Resolve a token, returning `None` for unknown or expired sessions.
    async fn resolve(&self, token: &SessionToken) -> Result<Option<UserIdentity>>;
}
