//! Live channel settings.

use std::time::Duration;

/// Default bound on a single store or session-directory call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Settings shared by the validator, applier and service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveConfig {
    /// Upper bound on each collaborator call; a call that takes longer is
    /// reported as a timeout instead of holding the connection.
    pub store_timeout: Duration,
}

impl LiveConfig {
    /// Replace the store timeout.
    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    pub(crate) fn store_timeout_ms(&self) -> u64 {
        u64::try_from(self.store_timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}
