//! # minigfs
//!
//! A small GFS-style distributed file store:
//! - One master holding the namespace and chunk metadata
//! - Chunk servers holding chunk bytes in memory and on disk
//! - Clients that push data to every replica themselves
//!
//! ## Architecture
//!
//! ```text
//!                ┌──────────────────────────┐
//!                │          Master          │
//!                │ files → chunks → replicas│
//!                └───▲──────────────▲───────┘
//!        metadata    │              │ register
//!   ┌────────────────┴───┐          │
//!   │       Client       │   ┌──────┴───────┬──────────────┐
//!   └─────────┬──────────┘   │              │              │
//!             │ chunk data ┌─┴──────────┐ ┌─┴──────────┐ ┌─┴──────────┐
//!             └───────────►│ Chunksrv 1 │ │ Chunksrv 2 │ │ Chunksrv 3 │
//!                          └────────────┘ └────────────┘ └────────────┘
//! ```
//!
//! Every write allocates one chunk, replicated on the first
//! `replication_factor` registered chunk servers. The first replica is named
//! primary but writes are not routed through it.
//!
//! ## Usage
//!
//! ### Start a master
//! ```bash
//! minigfs master --port 8080
//! ```
//!
//! ### Start chunk servers
//! ```bash
//! minigfs storageserver --port 8081 --master localhost:8080
//! minigfs storageserver --port 8082 --master localhost:8080
//! ```
//!
//! ### Use the client
//! ```bash
//! minigfs client --master localhost:8080 write --file /notes.txt --data "hello"
//! minigfs client --master localhost:8080 read --file /notes.txt
//! ```

pub mod chunkserver;
pub mod client;
pub mod common;
pub mod coordinator;

// Re-export commonly used types
pub use chunkserver::ChunkServer;
pub use client::GfsClient;
pub use common::{Config, Error, Result};
pub use coordinator::Coordinator;

/// Current version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
