//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::cookies::EnvironmentMode;

/// Root configuration for the auth relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// The upstream API this relay forwards to.
    pub upstream: UpstreamConfig,

    /// Deployment mode driving the cookie policy.
    pub environment: EnvironmentMode,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Magic-link verification endpoint.
    pub verify: VerifyConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:3000").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Upstream API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the upstream API (e.g., "http://127.0.0.1:8000").
    pub base_url: String,

    /// Inbound path prefix relayed to the upstream.
    pub path_prefix: String,

    /// Remove `path_prefix` before forwarding.
    pub strip_prefix: bool,

    /// Stamp X-Forwarded-For/Host/Proto on forwarded requests.
    pub forwarded_headers: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            path_prefix: "/api".to_string(),
            strip_prefix: false,
            forwarded_headers: true,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Deadline for reading the request body and receiving the full upstream
    /// response, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 2,
            request_secs: 5,
        }
    }
}

/// Magic-link verification endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VerifyConfig {
    pub enabled: bool,

    /// Route served by the relay (e.g., "/verify").
    pub route: String,

    /// Upstream path called with `?token=...`.
    pub upstream_path: String,

    /// Redirect target once the upstream accepted the token.
    pub success_redirect: String,

    /// Redirect target when the upstream rejected the token.
    pub failure_redirect: String,

    /// Redirect target when no token was supplied.
    pub missing_token_redirect: String,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            route: "/verify".to_string(),
            upstream_path: "/api/user/verify".to_string(),
            success_redirect: "/loading".to_string(),
            failure_redirect: "/?error=invalid-token".to_string(),
            missing_token_redirect: "/?error=missing-token".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON in production, pretty in development.
    #[default]
    Auto,
    Json,
    Pretty,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Auto,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,

    /// Maximum upstream response body size in bytes.
    pub max_response_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
            max_response_size: 16 * 1024 * 1024, // 16MB
        }
    }
}
