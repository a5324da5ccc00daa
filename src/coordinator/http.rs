//! HTTP API for the master
//!
//! Metadata only: no file bytes ever pass through these handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::common::tracing_middleware::request_tracing_middleware;
use crate::common::{validate_path, ChunkRecord, Result};
use crate::coordinator::metadata::MetadataStore;

/// Shared master state for HTTP handlers.
#[derive(Clone)]
pub struct CoordState {
    pub metadata: Arc<MetadataStore>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterParams {
    server: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FileParams {
    file: Option<String>,
}

impl FileParams {
    fn path(&self) -> Result<&str> {
        let path = self.file.as_deref().unwrap_or_default();
        validate_path(path)?;
        Ok(path)
    }
}

/// Creates the HTTP router with all master endpoints.
pub fn create_router(state: CoordState) -> Router {
    Router::new()
        .route("/register", axum::routing::post(register_server))
        .route("/create", axum::routing::post(create_file))
        .route("/allocate", axum::routing::post(allocate_chunk))
        .route("/chunks", axum::routing::get(get_chunks))
        .route("/health", axum::routing::get(health))
        .route("/admin/status", axum::routing::get(admin_status))
        .layer(middleware::from_fn(request_tracing_middleware))
        .with_state(state)
}

async fn register_server(
    State(state): State<CoordState>,
    Query(params): Query<RegisterParams>,
) -> Result<StatusCode> {
    let server = params
        .server
        .filter(|s| !s.is_empty())
        .ok_or(crate::Error::MissingParam("server"))?;

    state.metadata.register_server(&server).await;
    Ok(StatusCode::OK)
}

async fn create_file(
    State(state): State<CoordState>,
    Query(params): Query<FileParams>,
) -> Result<StatusCode> {
    state.metadata.create_file(params.path()?).await?;
    Ok(StatusCode::OK)
}

async fn allocate_chunk(
    State(state): State<CoordState>,
    Query(params): Query<FileParams>,
) -> Result<Json<ChunkRecord>> {
    let chunk = state.metadata.allocate_chunk(params.path()?).await?;
    Ok(Json(chunk))
}

async fn get_chunks(
    State(state): State<CoordState>,
    Query(params): Query<FileParams>,
) -> Result<Json<Vec<ChunkRecord>>> {
    let chunks = state.metadata.chunk_locations(params.path()?).await?;
    Ok(Json(chunks))
}

/// Liveness check
async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "role": "master",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Table sizes and registered servers
async fn admin_status(State(state): State<CoordState>) -> impl IntoResponse {
    Json(state.metadata.status().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::placement::PlacementManager;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn router() -> Router {
        create_router(CoordState {
            metadata: Arc::new(MetadataStore::new(
                PlacementManager::new(3),
                chrono::Duration::seconds(60),
            )),
        })
    }

    async fn call(router: &Router, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
        let resp = router
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_missing_params() {
        let router = router();
        assert_eq!(call(&router, "POST", "/register").await.0, StatusCode::BAD_REQUEST);
        assert_eq!(call(&router, "POST", "/create").await.0, StatusCode::BAD_REQUEST);
        assert_eq!(call(&router, "POST", "/create?file=").await.0, StatusCode::BAD_REQUEST);
        assert_eq!(call(&router, "POST", "/allocate").await.0, StatusCode::BAD_REQUEST);
        assert_eq!(call(&router, "GET", "/chunks").await.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_conflict() {
        let router = router();
        assert_eq!(call(&router, "POST", "/create?file=a.txt").await.0, StatusCode::OK);
        assert_eq!(
            call(&router, "POST", "/create?file=a.txt").await.0,
            StatusCode::CONFLICT
        );
    }

    #[tokio::test]
    async fn test_not_found_and_unavailable() {
        let router = router();
        assert_eq!(
            call(&router, "GET", "/chunks?file=nope").await.0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            call(&router, "POST", "/allocate?file=nope").await.0,
            StatusCode::NOT_FOUND
        );

        call(&router, "POST", "/create?file=a.txt").await;
        assert_eq!(
            call(&router, "POST", "/allocate?file=a.txt").await.0,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn test_allocate_and_list() {
        let router = router();
        call(&router, "POST", "/register?server=localhost:9001").await;
        call(&router, "POST", "/register?server=localhost:9002").await;
        call(&router, "POST", "/create?file=a.txt").await;

        let (status, body) = call(&router, "POST", "/allocate?file=a.txt").await;
        assert_eq!(status, StatusCode::OK);
        let chunk: ChunkRecord = serde_json::from_slice(&body).unwrap();
        assert_eq!(chunk.servers, vec!["localhost:9001", "localhost:9002"]);
        assert_eq!(chunk.primary, "localhost:9001");

        let (status, body) = call(&router, "GET", "/chunks?file=a.txt").await;
        assert_eq!(status, StatusCode::OK);
        let chunks: Vec<ChunkRecord> = serde_json::from_slice(&body).unwrap();
        assert_eq!(chunks, vec![chunk]);
    }

    #[tokio::test]
    async fn test_wrong_method() {
        let router = router();
        assert_eq!(
            call(&router, "GET", "/create?file=a.txt").await.0,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[tokio::test]
    async fn test_status() {
        let router = router();
        call(&router, "POST", "/register?server=localhost:9001").await;
        call(&router, "POST", "/create?file=a.txt").await;

        let (status, body) = call(&router, "GET", "/admin/status").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["files"], 1);
        assert_eq!(json["chunks"], 0);
        assert_eq!(json["servers"][0], "localhost:9001");
    }
}
