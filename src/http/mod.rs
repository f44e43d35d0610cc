//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, base URL from Host / X-Forwarded-Proto)
//!     → track.rs (location → TrackingService)
//!     → response.rs (plain text body, status mapping)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod track;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
