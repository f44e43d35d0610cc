//! `GET /tracking-script?location=<url>`

use axum::{
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::time::Instant;

use crate::http::request::{base_url_from_headers, query_param, request_id};
use crate::http::response::{plain_text, status_for};
use crate::http::server::AppState;
use crate::observability::metrics;

pub async fn tracking_script(
    State(state): State<AppState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> Response {
    let start = Instant::now();
    let request_id = request_id(&headers);
    let request_base = base_url_from_headers(&headers);
    let location = query_param(query.as_deref(), "location");

    tracing::debug!(
        request_id = %request_id,
        location = ?location,
        "Tracking script requested"
    );

    // A cache miss reads the registry; keep that off the async workers.
    let service = state.tracking.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        service.track(location.as_deref(), request_base.as_deref())
    })
    .await;

    let response = match outcome {
        Ok(Ok(result)) => {
            tracing::debug!(
                request_id = %request_id,
                site_id = ?result.matched_site_id,
                "Tracking script generated"
            );
            plain_text(StatusCode::OK, result.render())
        }
        Ok(Err(e)) => {
            let status = status_for(&e);
            if status.is_server_error() {
                tracing::error!(request_id = %request_id, error = %e, "Tracking request failed");
            } else {
                tracing::debug!(request_id = %request_id, error = %e, "Tracking request rejected");
            }
            e.into_response()
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Resolution task failed");
            plain_text(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    };

    metrics::record_request(response.status().as_u16(), start);
    response
}
