//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check the upstream URL and route shapes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream.base_url {0:?} is not a valid URL")]
    UpstreamUrl(String),

    #[error("upstream.base_url must use plain http, got {0:?}")]
    UpstreamScheme(String),

    #[error("upstream.base_url must not carry a query or fragment")]
    UpstreamQuery,

    #[error("{field} must start with '/' and not end with '/', got {value:?}")]
    RoutePath { field: &'static str, value: String },

    #[error("verify.route {0:?} collides with upstream.path_prefix")]
    RouteConflict(String),

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },

    #[error("{field} {value:?} is not a socket address")]
    Address { field: &'static str, value: String },

    #[error("listener.tls requires both cert_path and key_path")]
    TlsPaths,

    #[error("security.max_body_size and security.max_response_size must be greater than zero")]
    BodyLimit,
}

/// Validate a loaded configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.upstream.base_url) {
        Ok(url) => {
            if url.scheme() != "http" {
                errors.push(ValidationError::UpstreamScheme(url.scheme().to_string()));
            }
            if url.query().is_some() || url.fragment().is_some() {
                errors.push(ValidationError::UpstreamQuery);
            }
        }
        Err(_) => errors.push(ValidationError::UpstreamUrl(config.upstream.base_url.clone())),
    }

    check_route(&mut errors, "upstream.path_prefix", &config.upstream.path_prefix);
    if config.verify.enabled {
        check_route(&mut errors, "verify.route", &config.verify.route);
        check_route(&mut errors, "verify.upstream_path", &config.verify.upstream_path);
        if config.verify.route == config.upstream.path_prefix {
            errors.push(ValidationError::RouteConflict(config.verify.route.clone()));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "timeouts.request_secs" });
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "timeouts.connect_secs" });
    }

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(&mut errors, "observability.metrics_address", &config.observability.metrics_address);
    }

    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.trim().is_empty() || tls.key_path.trim().is_empty() {
            errors.push(ValidationError::TlsPaths);
        }
    }

    if config.security.max_body_size == 0 || config.security.max_response_size == 0 {
        errors.push(ValidationError::BodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_route(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    let valid = value.starts_with('/') && (value.len() == 1 || !value.ends_with('/'));
    if !valid {
        errors.push(ValidationError::RoutePath {
            field,
            value: value.to_string(),
        });
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::Address {
            field,
            value: value.to_string(),
        });
    }
}
