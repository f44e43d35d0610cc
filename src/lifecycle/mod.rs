//! Process lifecycle.
//!
//! ```text
//! startup.rs:   config → registry → cache store → resolution cache → service
//! signals.rs:   SIGINT / SIGTERM
//! shutdown.rs:  broadcast to the public and admin servers, which drain and stop
//! ```
//!
//! A configuration error at startup is fatal; a missing registry file is not.

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
