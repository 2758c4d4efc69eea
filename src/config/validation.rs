//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject a missing backend origin or shared secret
//! - Validate header names against the forwarding deny-list
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Error messages never echo the secret value

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};
use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;
use crate::routing::PathStrategy;
use crate::security::headers::{is_denied, is_reserved};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("backend origin is not set (API_URL)")]
    MissingOrigin,

    #[error("backend origin is invalid: {0}")]
    InvalidOrigin(String),

    #[error("shared secret is not set (BACKEND_SECRET_KEY)")]
    MissingSecret,

    #[error("shared secret contains characters not allowed in a header value")]
    InvalidSecret,

    #[error("secret header '{0}' is not a usable header name")]
    InvalidSecretHeader(String),

    #[error("forwarded header '{0}' is invalid or never forwardable")]
    InvalidForwardHeader(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("routing prefix '{0}' must be empty or start with '/' and not end with '/'")]
    InvalidPrefix(String),

    #[error("query parameter name must not be empty for the query strategy")]
    EmptyQueryParam,

    #[error("{field} '{value}' is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("health path '{0}' must start with '/' and not be '/'")]
    InvalidHealthPath(String),
}

/// Validate a complete configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_origin(&config.backend.origin, &mut errors);

    if config.backend.secret.is_empty() {
        errors.push(ValidationError::MissingSecret);
    } else if HeaderValue::from_str(config.backend.secret.expose()).is_err() {
        errors.push(ValidationError::InvalidSecret);
    }

    let secret_header = &config.backend.secret_header;
    if HeaderName::from_bytes(secret_header.as_bytes()).is_err() || is_reserved(secret_header) {
        errors.push(ValidationError::InvalidSecretHeader(secret_header.clone()));
    }

    for name in &config.backend.forward_headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() || is_denied(name) {
            errors.push(ValidationError::InvalidForwardHeader(name.clone()));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.connect_secs"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroValue("security.max_body_size"));
    }

    let prefix = &config.path.routing_prefix;
    if !prefix.is_empty() && (!prefix.starts_with('/') || prefix.ends_with('/')) {
        errors.push(ValidationError::InvalidPrefix(prefix.clone()));
    }
    if config.path.strategy == PathStrategy::Query && config.path.query_param.trim().is_empty() {
        errors.push(ValidationError::EmptyQueryParam);
    }

    validate_address("listener.bind_address", &config.listener.bind_address, &mut errors);
    if let Some(addr) = &config.observability.metrics_address {
        validate_address("observability.metrics_address", addr, &mut errors);
    }

    let health = &config.observability.health_path;
    if !health.is_empty() && (!health.starts_with('/') || health == "/") {
        errors.push(ValidationError::InvalidHealthPath(health.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_origin(origin: &str, errors: &mut Vec<ValidationError>) {
    if origin.trim().is_empty() {
        errors.push(ValidationError::MissingOrigin);
        return;
    }

    match Url::parse(origin) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                errors.push(ValidationError::InvalidOrigin(format!(
                    "scheme '{}' is not http or https",
                    url.scheme()
                )));
            }
            if url.host_str().is_none() {
                errors.push(ValidationError::InvalidOrigin("no host".to_string()));
            }
            if url.query().is_some() || url.fragment().is_some() {
                errors.push(ValidationError::InvalidOrigin(
                    "query and fragment are not allowed".to_string(),
                ));
            }
        }
        Err(e) => errors.push(ValidationError::InvalidOrigin(e.to_string())),
    }
}

fn validate_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
