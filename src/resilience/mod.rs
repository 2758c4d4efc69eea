//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → timeouts.rs (one total deadline around send + body read)
//!     → On expiry: RelayError::Timeout, surfaced as a transport failure
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every outbound call has a deadline
//! - Exactly one attempt per inbound request; no retries, no circuit breaker

pub mod timeouts;
