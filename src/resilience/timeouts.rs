//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap the backend call (send + body read) with one total deadline
//! - Turn an elapsed deadline into a distinct error
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; the inner future is dropped on expiry
//! - Timeout errors are distinct from other transport errors in logs, but
//!   callers see the same generic envelope

use std::future::Future;
use std::time::Duration;

use crate::relay::error::RelayError;

/// Run `fut` with a total deadline.
pub async fn with_deadline<F, T>(deadline: Duration, fut: F) -> Result<T, RelayError>
where
    F: Future<Output = Result<T, RelayError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(RelayError::Timeout(deadline)),
    }
}
