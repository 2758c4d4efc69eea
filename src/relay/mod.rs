//! Forwarding proxy handler.
//!
//! # Data Flow
//! ```text
//! RECEIVED
//!     → routing::PathResolver (backend-relative path + query)   PATH_RESOLVED
//!     → inbound body read under the size limit
//!     → security::HeaderPolicy (allow-list + shared secret)
//!     → forward.rs (one outbound call under the deadline)       OUTBOUND_SENT
//!     → http::response (status + JSON body back to the caller)  RELAYED | FAILED
//! ```
//!
//! # Design Decisions
//! - Exactly one outbound attempt; no stage is ever re-entered
//! - A backend error with a JSON body is relayed as-is; only bodiless or
//!   non-JSON error responses get the relay's own envelope
//! - Every failure is converted to a JSON response here; nothing escapes
//!   to the serving runtime

pub mod error;
pub mod forward;

use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, Method, Request};
use axum::response::{IntoResponse, Response};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use reqwest::Client;

use crate::config::{ConfigError, RelayConfig, ValidationError};
use crate::http::response::{json_relay, BodyShape};
use crate::http::X_REQUEST_ID;
use crate::observability::metrics;
use crate::routing::PathResolver;
use crate::security::HeaderPolicy;

pub use error::RelayError;
pub use forward::{build_client, Forwarder, UpstreamResponse};

/// Last stage a request reached, recorded on failure logs. The terminal
/// state is reported as an [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    PathResolved,
    OutboundSent,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::PathResolved => "path_resolved",
            Self::OutboundSent => "outbound_sent",
        }
    }
}

/// How a request ended, for metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Backend response relayed.
    Relayed,
    /// Backend error response with its own JSON body relayed.
    Passthrough,
    /// Transport failure or bodiless backend error.
    Failed,
    /// Rejected before any outbound call.
    Rejected,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relayed => "relayed",
            Self::Passthrough => "passthrough",
            Self::Failed => "failed",
            Self::Rejected => "rejected",
        }
    }
}

/// Stage reached plus the path resolved so far.
#[derive(Debug)]
struct Trail {
    stage: Stage,
    path: Option<String>,
}

/// The forwarding handler. Immutable; shared across requests via `Arc`.
#[derive(Debug)]
pub struct Relay {
    origin: String,
    resolver: PathResolver,
    headers: HeaderPolicy,
    forwarder: Forwarder,
    max_body_size: usize,
}

impl Relay {
    /// Build the relay and its outbound client from validated config.
    pub fn from_config(config: &RelayConfig) -> Result<Self, ConfigError> {
        let client = build_client(&config.timeouts).map_err(ConfigError::Client)?;
        Self::with_client(config, client)
    }

    /// Build the relay on an existing client.
    pub fn with_client(config: &RelayConfig, client: Client) -> Result<Self, ConfigError> {
        let backend = &config.backend;

        let secret_header = HeaderName::from_bytes(backend.secret_header.as_bytes()).map_err(|_| {
            ConfigError::Validation(vec![ValidationError::InvalidSecretHeader(
                backend.secret_header.clone(),
            )])
        })?;
        let extra = backend
            .forward_headers
            .iter()
            .filter_map(|name| HeaderName::from_bytes(name.as_bytes()).ok())
            .collect();
        let headers = HeaderPolicy::new(secret_header, &backend.secret, extra)
            .map_err(|_| ConfigError::Validation(vec![ValidationError::InvalidSecret]))?;

        let resolver = PathResolver::new(
            config.path.strategy,
            config.path.routing_prefix.clone(),
            config.path.query_param.clone(),
        );

        Ok(Self {
            origin: backend.origin.trim_end_matches('/').to_string(),
            resolver,
            headers,
            forwarder: Forwarder::new(client, config.timeouts.request()),
            max_body_size: config.security.max_body_size,
        })
    }

    /// Relay one inbound request. Never fails; errors become JSON responses.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let start = Instant::now();
        let method = request.method().clone();
        let request_id = request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();

        let mut trail = Trail {
            stage: Stage::Received,
            path: None,
        };
        let inbound_path = request.uri().path().to_string();

        match self.relay(request, &mut trail).await {
            Ok((response, outcome)) => {
                tracing::debug!(
                    request_id = %request_id,
                    method = %method,
                    path = trail.path.as_deref().unwrap_or("-"),
                    status = response.status().as_u16(),
                    outcome = outcome.as_str(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Relayed"
                );
                metrics::record_request(method.as_str(), response.status().as_u16(), outcome, start);
                response
            }
            Err(err) => {
                let reached = trail.stage;
                let path = trail.path.as_deref().unwrap_or(&inbound_path);
                let outcome = if err.is_rejection() {
                    tracing::warn!(
                        request_id = %request_id,
                        method = %method,
                        path = %path,
                        stage = reached.as_str(),
                        reason = %err,
                        "Request rejected"
                    );
                    Outcome::Rejected
                } else {
                    tracing::error!(
                        request_id = %request_id,
                        method = %method,
                        path = %path,
                        stage = reached.as_str(),
                        kind = err.kind(),
                        reason = %err,
                        "Relay failed"
                    );
                    Outcome::Failed
                };
                metrics::record_request(method.as_str(), err.status().as_u16(), outcome, start);
                err.into_response()
            }
        }
    }

    async fn relay(
        &self,
        request: Request<Body>,
        trail: &mut Trail,
    ) -> Result<(Response, Outcome), RelayError> {
        let resolved = self.resolver.resolve(request.uri())?;
        trail.path = Some(resolved.path.clone());
        trail.stage = Stage::PathResolved;

        let (parts, body) = request.into_parts();
        let body = self.read_body(&parts.method, &parts.headers, body).await?;
        let headers = self.headers.outbound_headers(&parts.headers, body.is_some());
        let url = resolved.target_url(&self.origin);

        trail.stage = Stage::OutboundSent;
        let UpstreamResponse { status, body } =
            self.forwarder.send(parts.method, &url, headers, body).await?;

        if status.is_client_error() || status.is_server_error() {
            return match BodyShape::of(&body) {
                BodyShape::Json => Ok((json_relay(status, body), Outcome::Passthrough)),
                _ => Err(RelayError::UpstreamStatus(status)),
            };
        }

        Ok((json_relay(status, body), Outcome::Relayed))
    }

    /// Buffer the inbound body. `None` for bodiless methods and empty bodies.
    async fn read_body(
        &self,
        method: &Method,
        headers: &HeaderMap,
        body: Body,
    ) -> Result<Option<Bytes>, RelayError> {
        if !carries_body(method) {
            return Ok(None);
        }

        let declared = headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        if declared.is_some_and(|len| len > self.max_body_size) {
            return Err(RelayError::BodyTooLarge {
                limit: self.max_body_size,
            });
        }

        let bytes = match Limited::new(body, self.max_body_size).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.is::<LengthLimitError>() => {
                return Err(RelayError::BodyTooLarge {
                    limit: self.max_body_size,
                })
            }
            Err(_) => return Err(RelayError::InvalidBody),
        };

        Ok(if bytes.is_empty() { None } else { Some(bytes) })
    }
}

/// Methods whose body is forwarded.
fn carries_body(method: &Method) -> bool {
    ![Method::GET, Method::HEAD, Method::OPTIONS, Method::TRACE].contains(method)
}
