//! In-process cluster helpers for integration tests

#![allow(dead_code)]

use minigfs::client::{cluster_http_client, MasterClient};
use minigfs::common::{ChunkServerConfig, CoordinatorConfig};
use minigfs::{ChunkServer, Coordinator};
use std::path::Path;
use std::time::Duration;
use tokio::net::TcpListener;

async fn bind_local() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    (listener, addr)
}

/// An address nothing listens on
pub async fn dead_address() -> String {
    let (listener, addr) = bind_local().await;
    drop(listener);
    addr
}

/// Start a master; returns its `host:port`
pub async fn start_master(replicas: usize) -> String {
    let (listener, addr) = bind_local().await;
    let config = CoordinatorConfig {
        replication_factor: replicas,
        ..Default::default()
    };
    let coordinator = Coordinator::new(config).unwrap();
    tokio::spawn(coordinator.serve_with_listener(listener));
    addr
}

pub fn chunkserver_config(addr: &str, master: &str, data_root: &Path) -> ChunkServerConfig {
    ChunkServerConfig {
        advertise_addr: addr.to_string(),
        master: master.to_string(),
        data_root: data_root.to_path_buf(),
        register_attempts: 5,
        register_delay_ms: 20,
        ..Default::default()
    }
}

/// Start a chunk server and wait until the master lists it
pub async fn start_chunkserver(master: &str, data_root: &Path) -> String {
    let (listener, addr) = bind_local().await;
    let server = ChunkServer::open(chunkserver_config(&addr, master, data_root))
        .await
        .unwrap();
    tokio::spawn(server.serve_with_listener(listener));
    wait_registered(master, &addr).await;
    addr
}

pub async fn wait_registered(master: &str, server: &str) {
    let client = MasterClient::new(master);
    for _ in 0..200 {
        if let Ok(status) = client.status().await {
            if status.servers.iter().any(|s| s == server) {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("chunkserver {} never registered with {}", server, master);
}

pub fn http() -> reqwest::Client {
    cluster_http_client()
}
