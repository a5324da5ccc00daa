//! Master metadata
//!
//! Stores:
//! - Namespace (file path → ordered chunk handles)
//! - Chunk table (handle → replicas, version, lease)
//! - Registered chunk servers
//!
//! All three live in one `Namespace` behind a single read/write lock, since
//! allocation touches every table at once.

use crate::common::{ChunkHandle, ChunkRecord, FileRecord, Result};
use crate::coordinator::placement::PlacementManager;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug)]
struct Namespace {
    files: HashMap<String, FileRecord>,
    chunks: HashMap<ChunkHandle, ChunkRecord>,
    /// Registration order matters: placement takes a prefix.
    servers: Vec<String>,
    next_chunk: u64,
}

impl Namespace {
    fn new() -> Self {
        Self {
            files: HashMap::new(),
            chunks: HashMap::new(),
            servers: Vec::new(),
            next_chunk: 1,
        }
    }
}

/// Point-in-time summary of the master's tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataStatus {
    pub files: usize,
    pub chunks: usize,
    pub servers: Vec<String>,
    pub replication_factor: usize,
}

/// Metadata store
pub struct MetadataStore {
    inner: RwLock<Namespace>,
    placement: PlacementManager,
    lease: chrono::Duration,
}

impl MetadataStore {
    pub fn new(placement: PlacementManager, lease: chrono::Duration) -> Self {
        Self {
            inner: RwLock::new(Namespace::new()),
            placement,
            lease,
        }
    }

    // === Server registry ===

    /// Register a chunk server. Returns `true` if the address was new.
    ///
    /// Existing chunk records are not touched; the server only becomes a
    /// candidate for future allocations.
    pub async fn register_server(&self, address: &str) -> bool {
        let mut ns = self.inner.write().await;
        if ns.servers.iter().any(|s| s == address) {
            return false;
        }
        ns.servers.push(address.to_string());
        tracing::info!("Registered chunkserver: {}", address);
        true
    }

    // === Namespace operations ===

    /// Create an empty file
    pub async fn create_file(&self, path: &str) -> Result<()> {
        let mut ns = self.inner.write().await;
        if ns.files.contains_key(path) {
            return Err(crate::Error::AlreadyExists(path.to_string()));
        }
        ns.files.insert(path.to_string(), FileRecord::new(path));
        tracing::info!("Created file: {}", path);
        Ok(())
    }

    /// Allocate a new chunk at the end of `path`
    pub async fn allocate_chunk(&self, path: &str) -> Result<ChunkRecord> {
        let mut ns = self.inner.write().await;
        if !ns.files.contains_key(path) {
            return Err(crate::Error::FileNotFound(path.to_string()));
        }

        let servers = self.placement.select_servers(&ns.servers)?;

        let handle = ChunkHandle::from_seq(ns.next_chunk);
        let record = ChunkRecord::new(handle.clone(), servers, self.lease)?;
        ns.next_chunk += 1;

        ns.chunks.insert(handle.clone(), record.clone());
        if let Some(file) = ns.files.get_mut(path) {
            file.chunks.push(handle.clone());
        }

        tracing::info!(
            "Allocated chunk {} for file {} on servers {:?}",
            handle,
            path,
            record.servers
        );
        Ok(record)
    }

    /// Chunk records of `path`, in file order
    pub async fn chunk_locations(&self, path: &str) -> Result<Vec<ChunkRecord>> {
        let ns = self.inner.read().await;
        let file = ns
            .files
            .get(path)
            .ok_or_else(|| crate::Error::FileNotFound(path.to_string()))?;

        file.chunks
            .iter()
            .map(|handle| {
                ns.chunks.get(handle).cloned().ok_or_else(|| {
                    crate::Error::Internal(format!("chunk {} missing from chunk table", handle))
                })
            })
            .collect()
    }

    pub async fn status(&self) -> MetadataStatus {
        let ns = self.inner.read().await;
        MetadataStatus {
            files: ns.files.len(),
            chunks: ns.chunks.len(),
            servers: ns.servers.clone(),
            replication_factor: self.placement.replicas(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn store(replicas: usize) -> MetadataStore {
        MetadataStore::new(PlacementManager::new(replicas), chrono::Duration::seconds(60))
    }

    #[tokio::test]
    async fn test_register_is_idempotent() {
        let store = store(3);
        assert!(store.register_server("localhost:8081").await);
        assert!(!store.register_server("localhost:8081").await);
        assert!(store.register_server("localhost:8082").await);

        assert_eq!(
            store.status().await.servers,
            vec!["localhost:8081", "localhost:8082"]
        );
    }

    #[tokio::test]
    async fn test_create_twice_conflicts() {
        let store = store(3);
        store.create_file("/a").await.unwrap();

        let err = store.create_file("/a").await.unwrap_err();
        assert!(matches!(err, crate::Error::AlreadyExists(p) if p == "/a"));
    }

    #[tokio::test]
    async fn test_unknown_file() {
        let store = store(3);
        store.register_server("localhost:8081").await;

        assert!(matches!(
            store.chunk_locations("/missing").await,
            Err(crate::Error::FileNotFound(_))
        ));
        assert!(matches!(
            store.allocate_chunk("/missing").await,
            Err(crate::Error::FileNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_allocate_without_servers() {
        let store = store(3);
        store.create_file("/a").await.unwrap();

        assert!(matches!(
            store.allocate_chunk("/a").await,
            Err(crate::Error::NoServersAvailable)
        ));
        assert!(store.chunk_locations("/a").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_replica_count_capped_by_registered() {
        let store = store(3);
        store.register_server("localhost:8081").await;
        store.register_server("localhost:8082").await;
        store.create_file("/a").await.unwrap();

        let chunk = store.allocate_chunk("/a").await.unwrap();
        assert_eq!(chunk.servers.len(), 2);
        assert_eq!(chunk.primary, "localhost:8081");
        assert_eq!(chunk.version, 1);

        // Later registrations do not resize existing chunks
        store.register_server("localhost:8083").await;
        let chunks = store.chunk_locations("/a").await.unwrap();
        assert_eq!(chunks[0].servers.len(), 2);

        let next = store.allocate_chunk("/a").await.unwrap();
        assert_eq!(next.servers.len(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_registration_not_repeated_in_replicas() {
        let store = store(3);
        store.register_server("localhost:8081").await;
        store.register_server("localhost:8081").await;
        store.create_file("/a").await.unwrap();

        let chunk = store.allocate_chunk("/a").await.unwrap();
        assert_eq!(chunk.servers, vec!["localhost:8081"]);
    }

    #[tokio::test]
    async fn test_allocations_append_in_order() {
        let store = store(3);
        store.register_server("localhost:8081").await;
        store.create_file("/a").await.unwrap();

        let mut allocated = Vec::new();
        for _ in 0..5 {
            allocated.push(store.allocate_chunk("/a").await.unwrap().handle);
        }

        let listed: Vec<_> = store
            .chunk_locations("/a")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.handle)
            .collect();
        assert_eq!(listed, allocated);

        let unique: HashSet<_> = allocated.iter().collect();
        assert_eq!(unique.len(), 5);
        assert_eq!(store.status().await.chunks, 5);
    }

    #[tokio::test]
    async fn test_lease_starts_at_allocation() {
        let store = store(3);
        store.register_server("localhost:8081").await;
        store.create_file("/a").await.unwrap();

        let before = chrono::Utc::now();
        let chunk = store.allocate_chunk("/a").await.unwrap();
        let after = chrono::Utc::now();

        let lease = chrono::Duration::seconds(60);
        assert!(chunk.lease_end >= before + lease);
        assert!(chunk.lease_end <= after + lease);
    }

    #[tokio::test]
    async fn test_lease_overflow_does_not_consume_handle() {
        let store = MetadataStore::new(PlacementManager::new(1), chrono::Duration::MAX);
        store.register_server("localhost:8081").await;
        store.create_file("/a").await.unwrap();

        assert!(matches!(
            store.allocate_chunk("/a").await,
            Err(crate::Error::Internal(_))
        ));
        assert!(store.chunk_locations("/a").await.unwrap().is_empty());
        assert_eq!(store.status().await.chunks, 0);
    }

    #[tokio::test]
    async fn test_concurrent_allocations_are_distinct() {
        let store = Arc::new(store(1));
        store.register_server("localhost:8081").await;
        store.create_file("/a").await.unwrap();

        let mut tasks = Vec::new();
        for _ in 0..32 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.allocate_chunk("/a").await.unwrap().handle
            }));
        }

        let mut handles = HashSet::new();
        for task in tasks {
            handles.insert(task.await.unwrap());
        }
        assert_eq!(handles.len(), 32);
        assert_eq!(store.chunk_locations("/a").await.unwrap().len(), 32);

        let status = store.status().await;
        assert_eq!(status.files, 1);
        assert_eq!(status.chunks, 32);
    }
}
