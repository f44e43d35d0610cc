//! Admin endpoints: status, cache inspection and invalidation.
//!
//! Unauthenticated; bind them to loopback only.

pub mod handlers;

use axum::{
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use crate::http::server::AppState;
use self::handlers::*;

pub fn setup_admin_router(state: AppState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/cache", get(get_cache).delete(clear_cache))
        .route("/admin/resolve", get(resolve))
        .with_state(state)
}

/// Serve the admin router until `shutdown` fires.
pub async fn run_admin(
    state: AppState,
    listener: TcpListener,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    tracing::info!(address = %listener.local_addr()?, "Admin server starting");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await
}
