//! Connection registry for tracking all open client sessions

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tokio::sync::RwLock;

/// Unique handle assigned to each accepted connection
pub type ConnectionId = u64;

/// Bookkeeping for one open connection
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub id: ConnectionId,
    pub peer: SocketAddr,
    pub connected_at: Instant,
}

impl ConnectionInfo {
    pub fn new(id: ConnectionId, peer: SocketAddr) -> Self {
        Self {
            id,
            peer,
            connected_at: Instant::now(),
        }
    }
}

/// The set of currently open connections
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<ConnectionId, ConnectionInfo>>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Allocate the next connection ID
    pub fn next_id(&self) -> ConnectionId {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Register a newly accepted connection
    ///
    /// Returns `false` if the ID was already present.
    pub async fn register(&self, info: ConnectionInfo) -> bool {
        let mut connections = self.connections.write().await;
        connections.insert(info.id, info).is_none()
    }

    /// Unregister a connection, returning its info if it was present
    pub async fn unregister(&self, id: ConnectionId) -> Option<ConnectionInfo> {
        let mut connections = self.connections.write().await;
        connections.remove(&id)
    }

    /// Snapshot of all open connections, ordered by ID
    ///
    /// Entries may be unregistered right after the snapshot is taken.
    pub async fn connections(&self) -> Vec<ConnectionInfo> {
        let connections = self.connections.read().await;
        let mut snapshot: Vec<_> = connections.values().cloned().collect();
        snapshot.sort_by_key(|c| c.id);
        snapshot
    }

    /// Get the number of open connections
    pub async fn count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Remove every entry, returning how many were dropped
    pub async fn clear(&self) -> usize {
        let mut connections = self.connections.write().await;
        let dropped = connections.len();
        connections.clear();
        dropped
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
