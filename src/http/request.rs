//! Request handling.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4) when the client sent none
//! - Derive the tracker base URL from the request (scheme + host)
//! - Read query parameters; a repeated parameter takes its last value
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - TLS terminates in front of the service, so the scheme comes from
//!   `X-Forwarded-Proto`; anything but `https` is treated as `http`

use axum::http::{header, uri::Authority, HeaderMap};
use std::str::FromStr;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Layer assigning a UUID request ID to requests that lack one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

/// Layer copying the request ID onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Read the request ID for logging.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Value of query parameter `name`, percent-decoded. The last occurrence wins.
pub fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .filter(|(key, _)| key == name)
        .last()
        .map(|(_, value)| value.into_owned())
}

/// Base URL the request was addressed to, e.g. `https://stats.example.com`.
///
/// Returns `None` when the Host header is missing or not a valid authority.
pub fn base_url_from_headers(headers: &HeaderMap) -> Option<String> {
    let host = headers.get(header::HOST)?.to_str().ok()?;
    let authority = Authority::from_str(host).ok()?;
    if authority.as_str().contains('@') {
        return None;
    }

    let scheme = match headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_ascii_lowercase())
    {
        Some(proto) if proto == "https" => "https",
        _ => "http",
    };

    Some(format!("{}://{}", scheme, authority))
}
