//! Chunk server implementation
//!
//! Holds chunk bytes for the handles clients push to it:
//! - In-memory cache in front of one file per chunk
//! - Disk fallback with cache backfill on reads
//! - Self-registration with the master at startup

pub mod http;
pub mod server;
pub mod store;

pub use server::ChunkServer;
pub use store::ChunkStore;
