//! Response building.
//!
//! # Responsibilities
//! - Every body is plain text (`text/plain; charset=utf-8`)
//! - Map tracking errors to HTTP status codes
//!
//! # Design Decisions
//! - Missing input is a client error (400)
//! - Registry failures are 503, never a snippet without the matched site

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::tracking::TrackError;

/// Content type of every tracking response.
pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

/// A plain-text response with the given status.
pub fn plain_text(status: StatusCode, body: impl Into<String>) -> Response {
    (status, [(header::CONTENT_TYPE, TEXT_PLAIN_UTF8)], body.into()).into_response()
}

/// Status code for a tracking error.
pub fn status_for(error: &TrackError) -> StatusCode {
    match error {
        TrackError::MissingInput | TrackError::MissingHost => StatusCode::BAD_REQUEST,
        TrackError::Resolve(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for TrackError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let body = match &self {
            TrackError::Resolve(_) => "Site registry unavailable, please retry later".to_string(),
            other => other.to_string(),
        };
        plain_text(status, body)
    }
}
