//! Master server

use crate::common::{CoordinatorConfig, Result};
use crate::coordinator::http::{create_router, CoordState};
use crate::coordinator::metadata::MetadataStore;
use crate::coordinator::placement::PlacementManager;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct Coordinator {
    config: CoordinatorConfig,
    metadata: Arc<MetadataStore>,
}

impl Coordinator {
    /// Build a master from `config`; an invalid config is rejected here.
    pub fn new(config: CoordinatorConfig) -> Result<Self> {
        config.validate()?;
        let metadata = Arc::new(MetadataStore::new(
            PlacementManager::new(config.replication_factor),
            config.lease()?,
        ));
        Ok(Self { config, metadata })
    }

    /// Bind the configured address and serve until the server stops.
    pub async fn serve(self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve_with_listener(listener).await
    }

    /// Serve on an already-bound listener.
    pub async fn serve_with_listener(self, listener: TcpListener) -> Result<()> {
        tracing::info!("Starting master");
        tracing::info!("  HTTP API: {}", listener.local_addr()?);
        tracing::info!("  Replication factor: {}", self.config.replication_factor);
        tracing::info!("  Lease: {}s", self.config.lease_secs);

        let router = create_router(CoordState {
            metadata: self.metadata.clone(),
        });

        tracing::info!("✓ Master ready");

        axum::serve(listener, router).await?;
        Ok(())
    }
}
