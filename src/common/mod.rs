//! Common utilities and types shared across minigfs

pub mod chunk;
pub mod config;
pub mod error;
pub mod tracing_middleware;
pub mod utils;

pub use chunk::{
    ChunkHandle, ChunkRecord, FileRecord, CHUNK_SIZE, DEFAULT_LEASE_SECS,
    DEFAULT_REPLICATION_FACTOR, MAX_LEASE_SECS,
};
pub use config::{ChunkServerConfig, ClientConfig, Config, CoordinatorConfig};
pub use error::{Error, Result};
pub use utils::{encode_key, format_bytes, retry_with_delay, validate_path};
