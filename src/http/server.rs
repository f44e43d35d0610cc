//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the tracking handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Apply configuration reloads while serving
//! - Stop gracefully on shutdown

use axum::{
    http::StatusCode,
    response::Response,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::TrackerConfig;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::response::plain_text;
use crate::http::track::tracking_script;
use crate::tracking::TrackingService;

/// Application state injected into handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub tracking: Arc<TrackingService>,
}

/// HTTP server for the tracking endpoint.
pub struct HttpServer {
    router: Router,
    config: TrackerConfig,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server around an already built tracking service.
    pub fn new(config: TrackerConfig, tracking: Arc<TrackingService>) -> Self {
        let state = AppState { tracking };
        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            config,
            state,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &TrackerConfig, state: AppState) -> Router {
        Router::new()
            .route("/tracking-script", get(tracking_script))
            .route("/health", get(health))
            .fallback(not_found)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(propagate_request_id_layer())
                    .layer(TraceLayer::new_for_http())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Reloaded configurations arriving on `config_updates` are applied to the
    /// tracking service; the server stops when `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<TrackerConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        let tracking = self.state.tracking.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                tracking.apply_config(&config);
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Shared handler state, also used by the admin router.
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn not_found() -> Response {
    plain_text(StatusCode::NOT_FOUND, "Not found")
}
