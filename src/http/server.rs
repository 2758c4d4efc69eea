//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the relay handler and the health endpoint
//! - Wire up middleware (request ID, tracing)
//! - Serve on a bound listener until shutdown

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{ConfigError, RelayConfig};
use crate::http::request::MakeRequestUuidV4;
use crate::lifecycle::signals::shutdown_signal;
use crate::relay::Relay;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

/// HTTP server for the relay.
pub struct RelayServer {
    router: Router,
    config: RelayConfig,
}

impl RelayServer {
    /// Create a server, building the relay and its outbound client.
    pub fn new(config: RelayConfig) -> Result<Self, ConfigError> {
        let relay = Relay::from_config(&config)?;
        Ok(Self::with_relay(config, relay))
    }

    /// Create a server around an already built relay.
    pub fn with_relay(config: RelayConfig, relay: Relay) -> Self {
        let state = AppState {
            relay: Arc::new(relay),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let mut router = Router::new();

        let health_path = config.observability.health_path.as_str();
        if !health_path.is_empty() {
            router = router.route(health_path, get(health_handler));
        }

        router
            .route("/", any(relay_handler))
            .route("/{*path}", any(relay_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The router, for in-process use (tests, embedding).
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until a signal arrives or `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            strategy = %self.config.path.strategy,
            timeout_secs = self.config.timeouts.request_secs,
            "HTTP server starting"
        );

        let stop = async move {
            tokio::select! {
                _ = shutdown_signal() => {}
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown requested");
                }
            }
        };

        axum::serve(listener, self.router)
            .with_graceful_shutdown(stop)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn relay_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    state.relay.handle(request).await
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
