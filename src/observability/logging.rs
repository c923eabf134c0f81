//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - Log level from config unless `RUST_LOG` is set

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::{LogFormat, ObservabilityConfig};
use crate::cookies::EnvironmentMode;

/// Default filter directive for a configured level.
pub fn default_directive(level: &str) -> String {
    format!("auth_relay={level},tower_http={level}")
}

/// Resolve `auto` against the environment mode.
pub fn resolve_format(format: LogFormat, mode: EnvironmentMode) -> LogFormat {
    match (format, mode) {
        (LogFormat::Auto, EnvironmentMode::Production) => LogFormat::Json,
        (LogFormat::Auto, EnvironmentMode::Development) => LogFormat::Pretty,
        (explicit, _) => explicit,
    }
}

/// Initialize the global tracing subscriber. Call once, at startup.
pub fn init(config: &ObservabilityConfig, mode: EnvironmentMode) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&config.log_level)));
    let registry = tracing_subscriber::registry().with(filter);

    match resolve_format(config.log_format, mode) {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        _ => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
