//! The set of open live-channel connections.

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Identifier of one live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the registry knows about an open connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub id: ConnectionId,
    pub peer: Option<SocketAddr>,
    pub connected_at: DateTime<Utc>,
}

/// Registry of open connections, shared by all connection tasks.
///
/// Cloning is cheap and every clone sees the same set.
#[derive(Debug, Clone, Default)]
pub struct ConnectionRegistry {
    inner: Arc<Mutex<HashMap<ConnectionId, ConnectionInfo>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ConnectionId, ConnectionInfo>> {
        // Entries are inserted and removed whole; a poisoned map is still consistent.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a connection. It stays registered until the guard is dropped.
    pub fn register(&self, peer: Option<SocketAddr>) -> ConnectionGuard {
        let info = ConnectionInfo {
            id: ConnectionId::new(),
            peer,
            connected_at: Utc::now(),
        };
        let id = info.id;
        self.lock().insert(id, info);

        ConnectionGuard {
            id,
            registry: self.clone(),
        }
    }

    fn remove(&self, id: ConnectionId) {
        self.lock().remove(&id);
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.lock().contains_key(&id)
    }

    /// Number of open connections.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of every open connection, oldest first.
    pub fn snapshot(&self) -> Vec<ConnectionInfo> {
        let mut connections: Vec<_> = self.lock().values().cloned().collect();
        connections.sort_by_key(|c| c.connected_at);
        connections
    }
}

/// Keeps a connection registered; deregisters it when dropped, whether the
/// connection closed cleanly or its task ended on a transport error.
#[derive(Debug)]
pub struct ConnectionGuard {
    id: ConnectionId,
    registry: ConnectionRegistry,
}

impl ConnectionGuard {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}
