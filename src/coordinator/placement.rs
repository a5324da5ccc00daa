//! Replica placement
//!
//! Replicas are the first `replicas` servers in registration order. There is
//! no load or capacity weighting; a real deployment would rank servers here.

use crate::common::Result;

/// PlacementManager picks replica sets for new chunks.
#[derive(Debug, Clone)]
pub struct PlacementManager {
    /// Number of replicas per chunk
    replicas: usize,
}

impl PlacementManager {
    pub fn new(replicas: usize) -> Self {
        Self { replicas }
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// Select servers for a new chunk.
    ///
    /// Returns `min(replicas, servers.len())` addresses. Fewer registered
    /// servers than the replication factor is not an error.
    pub fn select_servers(&self, servers: &[String]) -> Result<Vec<String>> {
        if servers.is_empty() {
            return Err(crate::Error::NoServersAvailable);
        }

        Ok(servers.iter().take(self.replicas).cloned().collect())
    }
}
