//! Backend Relay
//!
//! Serverless-style reverse relay between a browser dashboard and a private
//! backend API.
//!
//! # Architecture Overview
//!
//! ```text
//!   Browser ──▶ /api/proxy/{path}?{query}
//!                    │
//!                    ▼
//!          ┌──────────────────────────────────────────────┐
//!          │  http::server   (request id, trace layer)    │
//!          │       │                                      │
//!          │       ▼                                      │
//!          │  relay::Relay                                │
//!          │    routing::PathResolver  → backend path     │
//!          │    security::HeaderPolicy → allow-list +     │
//!          │                             shared secret    │
//!          │    relay::forward         → one call, with   │
//!          │                             deadline         │
//!          │    http::response         → JSON relay /     │
//!          │                             error envelope   │
//!          └──────────────────────────────────────────────┘
//!                    │
//!                    ▼
//!          {API_URL}/{path}?{query}  + X-Internal-Secret
//! ```

use std::path::PathBuf;

use clap::Parser;

use backend_relay::config::{load_config, validate_config, ConfigError, ObservabilityConfig};
use backend_relay::lifecycle::{self, Shutdown};
use backend_relay::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "backend-relay")]
#[command(about = "Forward requests to a private backend API with a shared secret", long_about = None)]
#[command(version)]
struct Cli {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Load and validate configuration, then exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).and_then(|mut config| {
        if let Some(bind) = cli.bind {
            config.listener.bind_address = bind;
            validate_config(&config).map_err(ConfigError::Validation)?;
        }
        Ok(config)
    });

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            init_logging(&ObservabilityConfig::default());
            tracing::error!(error = %e, "Configuration rejected");
            return Err(e.into());
        }
    };

    init_logging(&config.observability);
    tracing::info!("backend-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        strategy = %config.path.strategy,
        routing_prefix = %config.path.routing_prefix,
        secret_header = %config.backend.secret_header,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if cli.check {
        tracing::info!("Configuration is valid");
        return Ok(());
    }

    let shutdown = Shutdown::new();
    lifecycle::start(config, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
