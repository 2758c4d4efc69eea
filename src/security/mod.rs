//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request headers
//!     → headers.rs (allow-list, strip hop-by-hop, attach shared secret)
//!     → Outbound request to backend
//!
//! secret.rs holds the shared secret behind a redacting newtype.
//! ```
//!
//! # Design Decisions
//! - Allow-list, not passthrough: nothing crosses unless named
//! - The secret never appears in Debug, Serialize or log output

pub mod headers;
pub mod secret;

pub use headers::HeaderPolicy;
pub use secret::Secret;
