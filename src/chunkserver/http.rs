//! HTTP API for chunk servers
//!
//! Chunk servers know nothing about files; everything is addressed by handle.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::{header, StatusCode},
    middleware,
    response::IntoResponse,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;

use crate::chunkserver::store::ChunkStore;
use crate::common::tracing_middleware::request_tracing_middleware;
use crate::common::{ChunkHandle, Result};

/// Shared chunk server state for HTTP handlers.
#[derive(Clone)]
pub struct ChunkServerState {
    pub store: Arc<ChunkStore>,
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct ChunkParams {
    chunk: Option<String>,
}

impl ChunkParams {
    fn handle(self) -> Result<ChunkHandle> {
        self.chunk
            .filter(|c| !c.is_empty())
            .map(ChunkHandle::from)
            .ok_or(crate::Error::MissingParam("chunk"))
    }
}

/// Creates the HTTP router. Write bodies above `max_chunk_bytes` get a 413.
pub fn create_router(state: ChunkServerState, max_chunk_bytes: usize) -> Router {
    Router::new()
        .route("/write", axum::routing::post(write_chunk))
        .route("/read", axum::routing::get(read_chunk))
        .route("/health", axum::routing::get(health))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_chunk_bytes))
        .layer(middleware::from_fn(request_tracing_middleware))
        .with_state(state)
}

async fn write_chunk(
    State(state): State<ChunkServerState>,
    Query(params): Query<ChunkParams>,
    body: Bytes,
) -> Result<StatusCode> {
    let handle = params.handle()?;
    // A failed disk write is already logged; the cached copy still serves reads.
    state.store.store(&handle, body).await;
    Ok(StatusCode::OK)
}

async fn read_chunk(
    State(state): State<ChunkServerState>,
    Query(params): Query<ChunkParams>,
) -> Result<impl IntoResponse> {
    let handle = params.handle()?;
    let data = state.store.retrieve(&handle).await?;
    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        data,
    ))
}

async fn health(State(state): State<ChunkServerState>) -> impl IntoResponse {
    let stats = state.store.stats().await;
    Json(json!({
        "status": "healthy",
        "role": "chunkserver",
        "address": state.address,
        "cached_chunks": stats.cached_chunks,
        "cached_bytes": stats.cached_bytes,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
