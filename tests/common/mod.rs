//! Shared utilities for integration tests.

use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use site_tracker::admin::run_admin;
use site_tracker::config::TrackerConfig;
use site_tracker::http::AppState;
use site_tracker::lifecycle::startup::build_service;
use site_tracker::registry::SiteRegistry;
use site_tracker::{HttpServer, Shutdown};

/// A running tracker bound to an ephemeral loopback port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    pub shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the tracking server in front of `registry`.
pub async fn start_server(config: TrackerConfig, registry: Arc<dyn SiteRegistry>) -> TestServer {
    let tracking = build_service(&config, registry);
    let server = HttpServer::new(config, tracking);
    let state = server.state().clone();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let (_, config_updates) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer { addr, state, shutdown }
}

/// Start the admin endpoints sharing `server`'s state.
#[allow(dead_code)]
pub async fn start_admin(server: &TestServer) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = server.state.clone();
    let shutdown = server.shutdown.subscribe();

    tokio::spawn(async move {
        let _ = run_admin(state, listener, shutdown).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    addr
}

/// Write a registry TOML file to a temporary location.
#[allow(dead_code)]
pub fn registry_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
