//! HTTP client for the master's metadata API

use crate::common::{ChunkRecord, Result};
use crate::coordinator::MetadataStatus;
use reqwest::{Response, StatusCode};

/// Prefix `http://` unless the address already carries a scheme
pub(crate) fn base_url(addr: &str) -> String {
    if addr.starts_with("http://") || addr.starts_with("https://") {
        addr.trim_end_matches('/').to_string()
    } else {
        format!("http://{}", addr.trim_end_matches('/'))
    }
}

/// HTTP client for intra-cluster calls. Cluster traffic goes direct; system
/// proxy settings are ignored.
pub fn cluster_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct MasterClient {
    http: reqwest::Client,
    base: String,
}

impl MasterClient {
    pub fn new(addr: &str) -> Self {
        Self::with_client(cluster_http_client(), addr)
    }

    pub fn with_client(http: reqwest::Client, addr: &str) -> Self {
        Self {
            http,
            base: base_url(addr),
        }
    }

    /// Register a chunk server address
    pub async fn register(&self, server: &str) -> Result<()> {
        let resp = self
            .http
            .post(format!("{}/register", self.base))
            .query(&[("server", server)])
            .send()
            .await?;
        check(resp, server).await?;
        Ok(())
    }

    /// Create an empty file; `AlreadyExists` if the path is taken
    pub async fn create_file(&self, path: &str) -> Result<()> {
        let resp = self
            .http
            .post(format!("{}/create", self.base))
            .query(&[("file", path)])
            .send()
            .await?;
        check(resp, path).await?;
        Ok(())
    }

    /// Allocate a new chunk at the end of `path`
    pub async fn allocate_chunk(&self, path: &str) -> Result<ChunkRecord> {
        let resp = self
            .http
            .post(format!("{}/allocate", self.base))
            .query(&[("file", path)])
            .send()
            .await?;
        Ok(check(resp, path).await?.json().await?)
    }

    /// Chunk records of `path` in file order
    pub async fn chunk_locations(&self, path: &str) -> Result<Vec<ChunkRecord>> {
        let resp = self
            .http
            .get(format!("{}/chunks", self.base))
            .query(&[("file", path)])
            .send()
            .await?;
        Ok(check(resp, path).await?.json().await?)
    }

    pub async fn status(&self) -> Result<MetadataStatus> {
        let resp = self
            .http
            .get(format!("{}/admin/status", self.base))
            .send()
            .await?;
        Ok(check(resp, "").await?.json().await?)
    }
}

/// Turn a non-200 master response back into the error the master raised
async fn check(resp: Response, subject: &str) -> Result<Response> {
    match resp.status() {
        StatusCode::OK => Ok(resp),
        StatusCode::NOT_FOUND => Err(crate::Error::FileNotFound(subject.to_string())),
        StatusCode::CONFLICT => Err(crate::Error::AlreadyExists(subject.to_string())),
        StatusCode::SERVICE_UNAVAILABLE => Err(crate::Error::NoServersAvailable),
        StatusCode::BAD_REQUEST => {
            let msg = resp.text().await.unwrap_or_default();
            Err(crate::Error::BadRequest(msg))
        }
        status => Err(crate::Error::Http(format!(
            "{} returned {}",
            resp.url().path(),
            status
        ))),
    }
}
