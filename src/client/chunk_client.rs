//! HTTP client for chunk server data transfer

use crate::client::master_client::base_url;
use crate::common::{ChunkHandle, Result};
use bytes::Bytes;
use reqwest::StatusCode;

#[derive(Debug, Clone)]
pub struct ChunkServerClient {
    http: reqwest::Client,
}

impl ChunkServerClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Push chunk bytes to one replica
    pub async fn store(&self, server: &str, handle: &ChunkHandle, data: Bytes) -> Result<()> {
        let resp = self
            .http
            .post(format!("{}/write", base_url(server)))
            .query(&[("chunk", handle.as_str())])
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(data)
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK => Ok(()),
            status => Err(crate::Error::Http(format!(
                "write of {} to {} returned {}",
                handle, server, status
            ))),
        }
    }

    /// Fetch chunk bytes from one replica
    pub async fn retrieve(&self, server: &str, handle: &ChunkHandle) -> Result<Bytes> {
        let resp = self
            .http
            .get(format!("{}/read", base_url(server)))
            .query(&[("chunk", handle.as_str())])
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK => Ok(resp.bytes().await?),
            StatusCode::NOT_FOUND => Err(crate::Error::ChunkNotFound(handle.clone())),
            status => Err(crate::Error::Http(format!(
                "read of {} from {} returned {}",
                handle, server, status
            ))),
        }
    }
}
