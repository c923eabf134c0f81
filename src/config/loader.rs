//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::config::schema::RelayConfig;
use crate::config::validation::ValidationError;

pub const ENV_UPSTREAM_URL: &str = "RELAY_UPSTREAM_URL";
pub const ENV_ENVIRONMENT: &str = "RELAY_ENVIRONMENT";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "RELAY_REQUEST_TIMEOUT_SECS";
pub const ENV_BIND_ADDRESS: &str = "RELAY_BIND_ADDRESS";
pub const ENV_PATH_PREFIX: &str = "RELAY_PATH_PREFIX";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {reason}")]
    Env { var: &'static str, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse configuration from TOML text.
pub fn from_toml(content: &str) -> Result<RelayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Load configuration: the TOML file when given, defaults otherwise, then
/// `RELAY_*` environment overrides. Not yet validated.
pub fn load(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => from_toml(&fs::read_to_string(path)?)?,
        None => RelayConfig::default(),
    };
    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    Ok(config)
}

/// Apply `RELAY_*` overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut RelayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_UPSTREAM_URL) {
        config.upstream.base_url = url;
    }
    if let Some(prefix) = lookup(ENV_PATH_PREFIX) {
        config.upstream.path_prefix = prefix;
    }
    if let Some(bind) = lookup(ENV_BIND_ADDRESS) {
        config.listener.bind_address = bind;
    }
    if let Some(mode) = lookup(ENV_ENVIRONMENT) {
        config.environment = mode.parse().map_err(|e: crate::cookies::policy::UnknownEnvironment| {
            ConfigError::Env {
                var: ENV_ENVIRONMENT,
                reason: e.to_string(),
            }
        })?;
    }
    if let Some(secs) = lookup(ENV_REQUEST_TIMEOUT_SECS) {
        config.timeouts.request_secs = secs.trim().parse().map_err(|e: std::num::ParseIntError| {
            ConfigError::Env {
                var: ENV_REQUEST_TIMEOUT_SECS,
                reason: e.to_string(),
            }
        })?;
    }
    Ok(())
}

impl RelayConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.request_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.connect_secs)
    }
}
