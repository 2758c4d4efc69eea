//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Relay handler produces:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - JSON log output is selectable for machine parsing
//! - Request ID (x-request-id) recorded on every failure log
//! - Recording is a no-op until an exporter is installed

pub mod logging;
pub mod metrics;
