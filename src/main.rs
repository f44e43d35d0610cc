//! Site tracker service.
//!
//! # Architecture Overview
//!
//! ```text
//!   GET /tracking-script?location=...
//!          │
//!          ▼
//!   ┌─────────────┐    ┌──────────────────┐  miss  ┌──────────────┐
//!   │ http server │───▶│ resolution cache │───────▶│ site registry│
//!   └─────────────┘    └────────┬─────────┘        └──────┬───────┘
//!          ▲                    │ site id                 │ candidates
//!          │                    ▼                         ▼
//!   ┌─────────────┐    ┌──────────────────┐        ┌──────────────┐
//!   │   snippet   │◀───│ tracking service │◀───────│   matcher    │
//!   └─────────────┘    └──────────────────┘        └──────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use site_tracker::admin::run_admin;
use site_tracker::config::{load_config, ConfigWatcher, TrackerConfig};
use site_tracker::lifecycle::startup::{build_service, file_registry};
use site_tracker::observability::{logging, metrics};
use site_tracker::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "site-tracker")]
#[command(about = "Serves analytics tracking snippets for multi-site deployments", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => TrackerConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!("site-tracker v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        registry = %config.registry.path,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Watchers stop when their handles drop; keep them for the whole run.
    let registry = Arc::new(file_registry(&config));
    let _registry_watcher = if config.registry.watch {
        match registry.watch() {
            Ok(w) => Some(w),
            Err(e) => {
                tracing::warn!(error = %e, "Registry watcher not started");
                None
            }
        }
    } else {
        None
    };

    let tracking = build_service(&config, registry);

    let (_config_watcher, config_updates) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config.clone(), tracking);

    if config.admin.enabled {
        let admin_listener = TcpListener::bind(&config.admin.bind_address).await?;
        let state = server.state().clone();
        let admin_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            if let Err(e) = run_admin(state, admin_listener, admin_shutdown).await {
                tracing::error!(error = %e, "Admin server failed");
            }
        });
    }

    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
