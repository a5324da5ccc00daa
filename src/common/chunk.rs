//! Shared data model: chunk handles, chunk records and file records
//!
//! These types travel on the wire as JSON between the master, chunk servers
//! and clients. The master owns the authoritative copies; everyone else only
//! sees clones in responses.

use crate::common::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Nominal chunk size (64 MB). Writes are not split on it; it bounds the
/// body a chunk server accepts on `/write`.
pub const CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// Target number of replicas per chunk
pub const DEFAULT_REPLICATION_FACTOR: usize = 3;

/// Lease length attached to every newly allocated chunk
pub const DEFAULT_LEASE_SECS: u64 = 60;

/// Longest lease the master will hand out (one year)
pub const MAX_LEASE_SECS: u64 = 365 * 24 * 60 * 60;

/// Opaque, globally unique chunk identifier minted by the master.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkHandle(String);

impl ChunkHandle {
    /// Handle for the n-th chunk the master allocated.
    pub fn from_seq(seq: u64) -> Self {
        Self(format!("chunk_{}", seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ChunkHandle {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ChunkHandle {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for ChunkHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Chunk metadata as held by the master and returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub handle: ChunkHandle,
    /// Replica addresses; the first one is the primary.
    pub servers: Vec<String>,
    pub version: u64,
    pub size: u64,
    pub primary: String,
    pub lease_end: DateTime<Utc>,
}

impl ChunkRecord {
    /// Build a fresh record at version 1 with the lease starting now.
    ///
    /// `servers` must be non-empty; the master checks this before calling.
    pub fn new(handle: ChunkHandle, servers: Vec<String>, lease: Duration) -> Result<Self> {
        let lease_end = Utc::now().checked_add_signed(lease).ok_or_else(|| {
            crate::Error::Internal(format!("lease of {}s overflows the clock", lease.num_seconds()))
        })?;
        let primary = servers.first().cloned().unwrap_or_default();
        Ok(Self {
            handle,
            servers,
            version: 1,
            size: 0,
            primary,
            lease_end,
        })
    }
}

/// Namespace entry for one file path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: String,
    pub chunks: Vec<ChunkHandle>,
    pub size: u64,
}

impl FileRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chunks: Vec::new(),
            size: 0,
        }
    }
}
