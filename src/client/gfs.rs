//! File-level client: metadata from the master, bytes from chunk servers
//!
//! Writes fan out to every replica directly from the client. The recorded
//! primary is not used to order writes, and replica failures are only
//! logged: a write reports success once the master has allocated the chunk,
//! however many replicas actually stored it.

use crate::client::chunk_client::ChunkServerClient;
use crate::client::master_client::{cluster_http_client, MasterClient};
use crate::common::{format_bytes, ChunkRecord, Result};
use bytes::Bytes;
use futures_util::future::join_all;

#[derive(Debug, Clone)]
pub struct GfsClient {
    master: MasterClient,
    chunks: ChunkServerClient,
}

impl GfsClient {
    pub fn new(master_addr: &str) -> Self {
        Self::with_client(cluster_http_client(), master_addr)
    }

    pub fn with_client(http: reqwest::Client, master_addr: &str) -> Self {
        Self {
            master: MasterClient::with_client(http.clone(), master_addr),
            chunks: ChunkServerClient::new(http),
        }
    }

    pub fn master(&self) -> &MasterClient {
        &self.master
    }

    /// Write `data` as a new chunk of `path`, creating the file if needed.
    ///
    /// Every call allocates exactly one chunk, whatever the payload size.
    /// Returns the allocated chunk record.
    pub async fn write_file(&self, path: &str, data: impl Into<Bytes>) -> Result<ChunkRecord> {
        let data = data.into();

        match self.master.create_file(path).await {
            Ok(()) | Err(crate::Error::AlreadyExists(_)) => {}
            Err(e) => return Err(e),
        }

        let chunk = self.master.allocate_chunk(path).await?;

        let pushes = chunk.servers.iter().map(|server| {
            let data = data.clone();
            let chunk = &chunk;
            async move {
                match self.chunks.store(server, &chunk.handle, data).await {
                    Ok(()) => true,
                    Err(e) => {
                        tracing::warn!("Failed to write to server {}: {}", server, e);
                        false
                    }
                }
            }
        });
        let stored = join_all(pushes).await.into_iter().filter(|ok| *ok).count();

        tracing::info!(
            "Wrote file {} ({}) as {} on {}/{} replicas",
            path,
            format_bytes(data.len() as u64),
            chunk.handle,
            stored,
            chunk.servers.len()
        );
        Ok(chunk)
    }

    /// Read `path`.
    ///
    /// Only the first chunk is returned, fetched from the first server of its
    /// replica list. A file without chunks reads as empty.
    ///
    /// Other replicas are never tried. An unreachable replica surfaces as
    /// `Error::Transport`; a reachable one that lacks the chunk surfaces as
    /// `Error::ChunkNotFound`.
    pub async fn read_file(&self, path: &str) -> Result<Bytes> {
        let chunks = self.master.chunk_locations(path).await?;

        let Some(chunk) = chunks.first() else {
            return Ok(Bytes::new());
        };
        let server = chunk
            .servers
            .first()
            .ok_or(crate::Error::NoServersAvailable)?;

        self.chunks.retrieve(server, &chunk.handle).await
    }
}
