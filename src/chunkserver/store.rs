//! Chunk storage: in-memory cache backed by one file per chunk
//!
//! Layout: `<data_dir>/<encoded handle>`, raw bytes, no framing.
//!
//! Stores and retrieves for the same handle are serialised through a
//! per-handle lock so the cache and the file never race each other. Different
//! handles proceed independently. Lock entries for handles that failed to
//! load are dropped again, so the lock table only tracks stored chunks.

use crate::common::{encode_key, format_bytes, ChunkHandle, Result};
use bytes::Bytes;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Chunk store statistics
#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    pub cached_chunks: usize,
    pub cached_bytes: u64,
}

pub struct ChunkStore {
    data_dir: PathBuf,
    cache: RwLock<HashMap<ChunkHandle, Bytes>>,
    locks: Mutex<HashMap<ChunkHandle, Arc<Mutex<()>>>>,
}

impl ChunkStore {
    /// Open or create a chunk store rooted at `data_dir`
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir).await?;
        tracing::info!("Chunk store at {}", data_dir.display());

        Ok(Self {
            data_dir,
            cache: RwLock::new(HashMap::new()),
            locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn chunk_path(&self, handle: &ChunkHandle) -> PathBuf {
        self.data_dir.join(encode_key(handle.as_str()))
    }

    async fn handle_lock(&self, handle: &ChunkHandle) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .await
            .entry(handle.clone())
            .or_default()
            .clone()
    }

    /// Drop the lock entry for `handle` unless another task still holds it.
    async fn release_handle_lock(&self, handle: &ChunkHandle, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        // One reference in the table, one in `lock`
        if Arc::strong_count(&lock) == 2 {
            locks.remove(handle);
        }
    }

    /// Store a chunk, replacing any previous content.
    ///
    /// The in-memory copy always succeeds. Returns whether the disk copy was
    /// written too; a failed disk write is logged and the cache keeps the new
    /// data, so a restart loses it.
    pub async fn store(&self, handle: &ChunkHandle, data: Bytes) -> bool {
        let lock = self.handle_lock(handle).await;
        let _guard = lock.lock().await;

        let len = data.len() as u64;
        self.cache.write().await.insert(handle.clone(), data.clone());

        match tokio::fs::write(self.chunk_path(handle), &data).await {
            Ok(()) => {
                tracing::info!("Stored chunk {} ({})", handle, format_bytes(len));
                true
            }
            Err(e) => {
                tracing::error!("Failed to persist chunk {}: {}", handle, e);
                false
            }
        }
    }

    /// Fetch a chunk from memory, falling back to disk.
    ///
    /// A disk hit is copied back into the cache.
    pub async fn retrieve(&self, handle: &ChunkHandle) -> Result<Bytes> {
        let lock = self.handle_lock(handle).await;
        let result = {
            let _guard = lock.lock().await;
            self.load(handle).await
        };

        if result.is_err() {
            self.release_handle_lock(handle, lock).await;
        }
        result
    }

    async fn load(&self, handle: &ChunkHandle) -> Result<Bytes> {
        if let Some(data) = self.cache.read().await.get(handle) {
            return Ok(data.clone());
        }

        match tokio::fs::read(self.chunk_path(handle)).await {
            Ok(data) => {
                let data = Bytes::from(data);
                self.cache.write().await.insert(handle.clone(), data.clone());
                tracing::debug!("Loaded chunk {} from disk", handle);
                Ok(data)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(crate::Error::ChunkNotFound(handle.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn stats(&self) -> StoreStats {
        let cache = self.cache.read().await;
        StoreStats {
            cached_chunks: cache.len(),
            cached_bytes: cache.values().map(|d| d.len() as u64).sum(),
        }
    }
}
