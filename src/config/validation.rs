//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, TTL > 0)
//! - Check addresses and URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: TrackerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::TrackerConfig;

/// Longest accepted cache lifetime: one year.
pub const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{field}: '{value}' is not an http(s) URL")]
    InvalidBaseUrl { field: &'static str, value: String },

    #[error("{field}: path '{value}' must start with '/'")]
    InvalidPath { field: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field} must be at most {max}, got {value}")]
    TooLarge { field: &'static str, value: u64, max: u64 },
}

/// Validate a parsed configuration, collecting every error found.
pub fn validate_config(config: &TrackerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.admin.enabled {
        check_address(&mut errors, "admin.bind_address", &config.admin.bind_address);
    }
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.cache.ttl_secs == 0 {
        errors.push(ValidationError::Zero("cache.ttl_secs"));
    } else if config.cache.ttl_secs > MAX_CACHE_TTL_SECS {
        errors.push(ValidationError::TooLarge {
            field: "cache.ttl_secs",
            value: config.cache.ttl_secs,
            max: MAX_CACHE_TTL_SECS,
        });
    }

    if let Some(base_url) = &config.tracker.base_url {
        let valid = url::Url::parse(base_url)
            .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
            .unwrap_or(false);
        if !valid {
            errors.push(ValidationError::InvalidBaseUrl {
                field: "tracker.base_url",
                value: base_url.clone(),
            });
        }
    }

    check_path(&mut errors, "tracker.tracker_path", &config.tracker.tracker_path);
    check_path(&mut errors, "tracker.script_path", &config.tracker.script_path);

    if config.registry.path.trim().is_empty() {
        errors.push(ValidationError::Empty("registry.path"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_path(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if !value.starts_with('/') {
        errors.push(ValidationError::InvalidPath {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&TrackerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = TrackerConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.cache.ttl_secs = 0;
        config.tracker.base_url = Some("ftp://stats.example.com".into());
        config.tracker.script_path = "matomo.js".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::Zero("cache.ttl_secs")));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidBaseUrl { .. })));
    }

    #[test]
    fn test_ttl_upper_bound() {
        let mut config = TrackerConfig::default();
        config.cache.ttl_secs = MAX_CACHE_TTL_SECS;
        assert!(validate_config(&config).is_ok());

        config.cache.ttl_secs = i64::MAX as u64;
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::TooLarge { field: "cache.ttl_secs", .. }]
        ));
    }

    #[test]
    fn test_disabled_admin_address_not_checked() {
        let mut config = TrackerConfig::default();
        config.admin.enabled = false;
        config.admin.bind_address = String::new();
        assert!(validate_config(&config).is_ok());
    }
}
