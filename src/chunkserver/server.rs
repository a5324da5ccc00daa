//! Chunk server

use crate::chunkserver::http::{create_router, ChunkServerState};
use crate::chunkserver::store::ChunkStore;
use crate::client::MasterClient;
use crate::common::{retry_with_delay, ChunkServerConfig, Result, CHUNK_SIZE};
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ChunkServer {
    config: ChunkServerConfig,
    store: Arc<ChunkStore>,
    master: MasterClient,
}

impl ChunkServer {
    /// Open the chunk store under the configured data directory.
    pub async fn open(config: ChunkServerConfig) -> Result<Self> {
        let store = Arc::new(ChunkStore::open(config.data_dir()).await?);
        let master = MasterClient::new(&config.master);
        Ok(Self {
            config,
            store,
            master,
        })
    }

    pub fn store(&self) -> Arc<ChunkStore> {
        self.store.clone()
    }

    /// Announce this server to the master.
    ///
    /// Retries transport failures and 5xx answers with a fixed delay; gives up
    /// after the configured number of attempts or on a rejected request. Failure is not fatal: an unregistered server still answers
    /// reads and writes, it just never gets picked for new chunks.
    pub async fn register_with_master(&self) -> bool {
        let address = self.config.advertise_addr.as_str();
        let result = retry_with_delay(
            || self.master.register(address),
            self.config.register_attempts,
            self.config.register_delay(),
        )
        .await;

        match result {
            Ok(()) => {
                tracing::info!("Registered with master at {}", self.config.master);
                true
            }
            Err(e) => {
                tracing::warn!(
                    "Giving up on registration with master at {}: {}",
                    self.config.master,
                    e
                );
                false
            }
        }
    }

    /// Bind the configured address, register, and serve.
    pub async fn serve(self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve_with_listener(listener).await
    }

    /// Serve on an already-bound listener. Registration runs in the
    /// background once the router is up, so requests are answered while the
    /// master is still unreachable.
    pub async fn serve_with_listener(self, listener: TcpListener) -> Result<()> {
        tracing::info!("Starting chunkserver: {}", self.config.advertise_addr);
        tracing::info!("  HTTP API: {}", listener.local_addr()?);
        tracing::info!("  Master: {}", self.config.master);
        tracing::info!("  Data path: {}", self.store.data_dir().display());

        let router = create_router(
            ChunkServerState {
                store: self.store.clone(),
                address: self.config.advertise_addr.clone(),
            },
            CHUNK_SIZE,
        );

        let server = Arc::new(self);
        tokio::spawn(async move {
            server.register_with_master().await;
        });

        tracing::info!("✓ Chunkserver ready");

        axum::serve(listener, router).await?;
        Ok(())
    }
}
