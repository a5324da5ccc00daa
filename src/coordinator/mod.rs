//! Master (coordinator) implementation
//!
//! The master is responsible for:
//! - The file namespace (path → ordered chunk handles)
//! - Chunk metadata (replicas, version, primary, lease)
//! - The registry of chunk servers
//! - Placement of new chunks
//!
//! It never sees file bytes.

pub mod http;
pub mod metadata;
pub mod placement;
pub mod server;

pub use metadata::{MetadataStatus, MetadataStore};
pub use placement::PlacementManager;
pub use server::Coordinator;
