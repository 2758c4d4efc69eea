//! Configuration loading from disk and environment.
//!
//! Order: defaults → optional TOML file → environment variables → validation.
//! The result is immutable for the lifetime of the process.

use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::{LogFormat, RelayConfig};
use crate::config::validation::{validate_config, ValidationError};
use crate::routing::PathStrategy;
use crate::security::Secret;

pub const ENV_ORIGIN: &str = "API_URL";
pub const ENV_SECRET: &str = "BACKEND_SECRET_KEY";
pub const ENV_TIMEOUT: &str = "RELAY_TIMEOUT_SECS";
pub const ENV_CONNECT_TIMEOUT: &str = "RELAY_CONNECT_TIMEOUT_SECS";
pub const ENV_BIND: &str = "RELAY_BIND_ADDRESS";
pub const ENV_STRATEGY: &str = "RELAY_PATH_STRATEGY";
pub const ENV_PREFIX: &str = "RELAY_ROUTING_PREFIX";
pub const ENV_QUERY_PARAM: &str = "RELAY_QUERY_PARAM";
pub const ENV_SECRET_HEADER: &str = "RELAY_SECRET_HEADER";
pub const ENV_FORWARD_HEADERS: &str = "RELAY_FORWARD_HEADERS";
pub const ENV_MAX_BODY: &str = "RELAY_MAX_BODY_BYTES";
pub const ENV_LOG_LEVEL: &str = "RELAY_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "RELAY_LOG_FORMAT";
pub const ENV_METRICS: &str = "RELAY_METRICS_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable {name}: {reason}")]
    Env { name: &'static str, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Outbound client: {0}")]
    Client(#[source] reqwest::Error),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load from an optional file plus the process environment, then validate.
pub fn load_config(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    load_config_with(path, |key| std::env::var(key).ok())
}

/// Like [`load_config`], reading variables through `env`.
pub fn load_config_with<F>(path: Option<&Path>, env: F) -> Result<RelayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => RelayConfig::default(),
    };

    apply_env(&mut config, env)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables. Unset or blank variables are ignored.
pub fn apply_env<F>(config: &mut RelayConfig, env: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| env(name).filter(|v| !v.trim().is_empty());

    if let Some(v) = var(ENV_ORIGIN) {
        config.backend.origin = v.trim().to_string();
    }
    if let Some(v) = var(ENV_SECRET) {
        config.backend.secret = Secret::new(v);
    }
    if let Some(v) = var(ENV_SECRET_HEADER) {
        config.backend.secret_header = v.trim().to_string();
    }
    if let Some(v) = var(ENV_FORWARD_HEADERS) {
        config.backend.forward_headers = v
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(v) = var(ENV_TIMEOUT) {
        config.timeouts.request_secs = parse_var(ENV_TIMEOUT, &v)?;
    }
    if let Some(v) = var(ENV_CONNECT_TIMEOUT) {
        config.timeouts.connect_secs = parse_var(ENV_CONNECT_TIMEOUT, &v)?;
    }
    if let Some(v) = var(ENV_BIND) {
        config.listener.bind_address = v.trim().to_string();
    }
    if let Some(v) = var(ENV_STRATEGY) {
        config.path.strategy = parse_var::<PathStrategy>(ENV_STRATEGY, &v)?;
    }
    // Routing prefix may legitimately be set to empty, so read it unfiltered.
    if let Some(v) = env(ENV_PREFIX) {
        config.path.routing_prefix = v.trim().to_string();
    }
    if let Some(v) = var(ENV_QUERY_PARAM) {
        config.path.query_param = v.trim().to_string();
    }
    if let Some(v) = var(ENV_MAX_BODY) {
        config.security.max_body_size = parse_var(ENV_MAX_BODY, &v)?;
    }
    if let Some(v) = var(ENV_LOG_LEVEL) {
        config.observability.log_level = v.trim().to_string();
    }
    if let Some(v) = var(ENV_LOG_FORMAT) {
        config.observability.log_format = parse_var::<LogFormat>(ENV_LOG_FORMAT, &v)?;
    }
    if let Some(v) = var(ENV_METRICS) {
        config.observability.metrics_address = Some(v.trim().to_string());
    }

    Ok(())
}

fn parse_var<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    value.trim().parse::<T>().map_err(|e| ConfigError::Env {
        name,
        reason: e.to_string(),
    })
}
