//! minigfs binary: master, chunk server or client, picked by subcommand

use anyhow::Context;
use clap::{Parser, Subcommand};
use minigfs::common::Config;
use minigfs::{ChunkServer, Coordinator, GfsClient};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "minigfs")]
#[command(about = "minigfs: a small GFS-style distributed file store")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG wins if set
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Run the master
    Master {
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,

        /// Replication factor
        #[arg(long)]
        replicas: Option<usize>,

        /// Lease length for new chunks, in seconds
        #[arg(long)]
        lease_secs: Option<u64>,
    },

    /// Run a chunk server
    #[command(name = "storageserver", alias = "chunkserver")]
    StorageServer {
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,

        /// Host name announced to the master
        #[arg(long)]
        host: Option<String>,

        /// Master address
        #[arg(long)]
        master: Option<String>,

        /// Directory holding the per-server data directory
        #[arg(long)]
        data_root: Option<PathBuf>,
    },

    /// Run a client operation
    Client {
        /// Master address
        #[arg(long)]
        master: Option<String>,

        #[command(subcommand)]
        op: ClientOp,
    },
}

#[derive(Subcommand)]
enum ClientOp {
    /// Write data to a file (one new chunk)
    Write {
        /// File path
        #[arg(long)]
        file: String,

        /// Data to write
        #[arg(long)]
        data: String,
    },

    /// Read a file (first chunk only)
    Read {
        /// File path
        #[arg(long)]
        file: String,
    },

    /// Show master table sizes and registered servers
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config from file/env, then override with CLI arguments
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.mode {
        Mode::Master {
            port,
            replicas,
            lease_secs,
        } => {
            let mut coord_config = config.coordinator;
            if let Some(port) = port {
                coord_config.bind_addr.set_port(port);
            }
            if let Some(replicas) = replicas {
                coord_config.replication_factor = replicas;
            }
            if let Some(lease_secs) = lease_secs {
                coord_config.lease_secs = lease_secs;
            }
            Coordinator::new(coord_config)
                .context("Invalid master configuration")?
                .serve()
                .await?;
        }

        Mode::StorageServer {
            port,
            host,
            master,
            data_root,
        } => {
            let mut cs_config = config.chunkserver;
            if port.is_some() || host.is_some() {
                let port = port.unwrap_or(cs_config.bind_addr.port());
                let host = host.unwrap_or_else(|| {
                    cs_config
                        .advertise_addr
                        .rsplit_once(':')
                        .map(|(h, _)| h.to_string())
                        .unwrap_or_else(|| "localhost".to_string())
                });
                cs_config.bind_addr = SocketAddr::new(cs_config.bind_addr.ip(), port);
                cs_config.advertise_addr = format!("{}:{}", host, port);
            }
            if let Some(master) = master {
                cs_config.master = master;
            }
            if let Some(data_root) = data_root {
                cs_config.data_root = data_root;
            }

            ChunkServer::open(cs_config).await?.serve().await?;
        }

        Mode::Client { master, op } => {
            let master = master.unwrap_or(config.client.master);
            let client = GfsClient::new(&master);

            match op {
                ClientOp::Write { file, data } => {
                    client
                        .write_file(&file, data.into_bytes())
                        .await
                        .context("Write failed")?;
                    println!("Successfully wrote to {}", file);
                }

                ClientOp::Read { file } => {
                    let content = client.read_file(&file).await.context("Read failed")?;
                    println!(
                        "Content of {}: {}",
                        file,
                        String::from_utf8_lossy(&content)
                    );
                }

                ClientOp::Status => {
                    let status = client
                        .master()
                        .status()
                        .await
                        .context("Status failed")?;
                    println!("Master status:");
                    println!("  Files: {}", status.files);
                    println!("  Chunks: {}", status.chunks);
                    println!("  Replication factor: {}", status.replication_factor);
                    println!("  Servers: {}", status.servers.len());
                    for server in &status.servers {
                        println!("    {}", server);
                    }
                }
            }
        }
    }

    Ok(())
}
