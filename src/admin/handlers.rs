use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::http::request::query_param;
use crate::http::server::AppState;
use crate::registry::SiteId;
use crate::resolver::CacheStats;

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub catch_all_site_id: SiteId,
    pub registry_generation: u64,
}

#[derive(Serialize)]
pub struct ClearResult {
    pub cleared: bool,
}

#[derive(Serialize)]
pub struct Resolution {
    pub location: String,
    pub site_id: Option<SiteId>,
}

pub async fn get_status(
    State(state): State<AppState>,
) -> Json<SystemStatus> {
    let cache = state.tracking.cache();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        catch_all_site_id: cache.catch_all(),
        registry_generation: cache.registry().generation(),
    })
}

pub async fn get_cache(
    State(state): State<AppState>,
) -> Json<CacheStats> {
    Json(state.tracking.cache().stats())
}

pub async fn clear_cache(
    State(state): State<AppState>,
) -> Response {
    match state.tracking.cache().clear() {
        Ok(cleared) => Json(ClearResult { cleared }).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to clear resolution cache");
            error_json(StatusCode::SERVICE_UNAVAILABLE, e.to_string())
        }
    }
}

/// Resolve a location through the cache, for debugging site URLs.
pub async fn resolve(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Response {
    let location = match query_param(query.as_deref(), "location") {
        Some(l) if !l.is_empty() => l,
        _ => return error_json(StatusCode::BAD_REQUEST, "missing 'location' parameter".to_string()),
    };

    let cache = state.tracking.cache().clone();
    let lookup = location.clone();
    match tokio::task::spawn_blocking(move || cache.get_or_compute(&lookup)).await {
        Ok(Ok(site_id)) => Json(Resolution { location, site_id }).into_response(),
        Ok(Err(e)) => error_json(StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
        Err(e) => error_json(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

fn error_json(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
