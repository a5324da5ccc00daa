//! Clients for the master and chunk servers
//!
//! - `MasterClient`: metadata calls (register, create, allocate, locate)
//! - `ChunkServerClient`: raw chunk transfer to and from one replica
//! - `GfsClient`: whole-file read/write built from the two

pub mod chunk_client;
pub mod gfs;
pub mod master_client;

pub use chunk_client::ChunkServerClient;
pub use gfs::GfsClient;
pub use master_client::{cluster_http_client, MasterClient};
