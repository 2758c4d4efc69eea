//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems from validated configuration
//! - Start the optional metrics exporter
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - The listener binds last (traffic only when ready)

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::{ConfigError, RelayConfig};
use crate::http::RelayServer;
use crate::observability::metrics;

/// Fatal errors before or while serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid {field} '{value}'")]
    Address { field: &'static str, value: String },

    #[error("metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Start every subsystem and serve until shutdown.
pub async fn start(
    config: RelayConfig,
    shutdown: broadcast::Receiver<()>,
) -> Result<(), StartupError> {
    if let Some(addr) = &config.observability.metrics_address {
        metrics::init_metrics(parse_addr("observability.metrics_address", addr)?)?;
    }

    let bind = parse_addr("listener.bind_address", &config.listener.bind_address)?;
    let server = RelayServer::new(config)?;

    let listener = TcpListener::bind(bind)
        .await
        .map_err(|source| StartupError::Bind { addr: bind, source })?;

    server.run(listener, shutdown).await.map_err(StartupError::Serve)
}

fn parse_addr(field: &'static str, value: &str) -> Result<SocketAddr, StartupError> {
    value.parse().map_err(|_| StartupError::Address {
        field,
        value: value.to_string(),
    })
}
