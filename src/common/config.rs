//! Configuration for minigfs components
//!
//! Values come from (lowest to highest priority): built-in defaults, an
//! optional TOML file named by `MINIGFS_CONFIG`, `MINIGFS_*` environment
//! variables (`MINIGFS_COORDINATOR__REPLICATION_FACTOR=2`), and finally CLI
//! flags applied by the binary.

use crate::common::chunk::{DEFAULT_LEASE_SECS, DEFAULT_REPLICATION_FACTOR, MAX_LEASE_SECS};
use crate::common::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable pointing at an optional config file
pub const CONFIG_ENV: &str = "MINIGFS_CONFIG";

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging level, used when `RUST_LOG` is unset
    pub log_level: String,

    /// Master-specific config
    pub coordinator: CoordinatorConfig,

    /// Chunk server-specific config
    pub chunkserver: ChunkServerConfig,

    /// Client-specific config
    pub client: ClientConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            coordinator: CoordinatorConfig::default(),
            chunkserver: ChunkServerConfig::default(),
            client: ClientConfig::default(),
        }
    }
}

/// Master configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Bind address for the HTTP API
    pub bind_addr: SocketAddr,

    /// Target replicas per chunk
    pub replication_factor: usize,

    /// Lease length for new chunks, in seconds
    pub lease_secs: u64,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            replication_factor: DEFAULT_REPLICATION_FACTOR,
            lease_secs: DEFAULT_LEASE_SECS,
        }
    }
}

impl CoordinatorConfig {
    pub fn lease(&self) -> Result<chrono::Duration> {
        if self.lease_secs > MAX_LEASE_SECS {
            return Err(crate::Error::InvalidConfig(format!(
                "lease_secs must be at most {}, got {}",
                MAX_LEASE_SECS, self.lease_secs
            )));
        }
        i64::try_from(self.lease_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| {
                crate::Error::InvalidConfig(format!("lease_secs out of range: {}", self.lease_secs))
            })
    }

    pub fn validate(&self) -> Result<()> {
        if self.replication_factor == 0 {
            return Err(crate::Error::InvalidConfig(
                "replication_factor must be at least 1".into(),
            ));
        }
        self.lease().map(|_| ())
    }
}

/// Chunk server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkServerConfig {
    /// Bind address for the HTTP API
    pub bind_addr: SocketAddr,

    /// Address announced to the master (`host:port`); also names the data dir
    pub advertise_addr: String,

    /// Master address (`host:port`)
    pub master: String,

    /// Directory under which the per-server data dir is created
    pub data_root: PathBuf,

    /// Registration attempts before giving up
    pub register_attempts: usize,

    /// Fixed delay between registration attempts
    pub register_delay_ms: u64,
}

impl Default for ChunkServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8081)),
            advertise_addr: "localhost:8081".to_string(),
            master: "localhost:8080".to_string(),
            data_root: PathBuf::from("."),
            register_attempts: 5,
            register_delay_ms: 2000,
        }
    }
}

impl ChunkServerConfig {
    pub fn register_delay(&self) -> Duration {
        Duration::from_millis(self.register_delay_ms)
    }

    /// `chunkserver_<host>_<port>` under the data root
    pub fn data_dir(&self) -> PathBuf {
        self.data_root
            .join(format!("chunkserver_{}", self.advertise_addr.replace(':', "_")))
    }
}

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Master address (`host:port`)
    pub master: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            master: "localhost:8080".to_string(),
        }
    }
}

impl Config {
    /// Load config from the file named by `MINIGFS_CONFIG` (if any) and
    /// `MINIGFS_*` environment overrides.
    pub fn load() -> Result<Self> {
        let mut builder = ::config::Config::builder();
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            builder = builder.add_source(::config::File::with_name(&path));
        }
        let config: Config = builder
            .add_source(
                ::config::Environment::with_prefix("MINIGFS")
                    .prefix_separator("_")
                    .try_parsing(true)
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.coordinator.validate()?;
        if self.chunkserver.register_attempts == 0 {
            return Err(crate::Error::InvalidConfig(
                "register_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
