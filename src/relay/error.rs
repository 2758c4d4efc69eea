//! Per-request failure taxonomy.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::response::json_error;

/// Generic message for every transport-level failure.
pub const PROXY_ERROR: &str = "Proxy Error";

/// Failures the relay converts into a JSON error envelope.
///
/// `Display` is for logs only; callers see [`RelayError::public_message`].
#[derive(Debug, Error)]
pub enum RelayError {
    /// No backend-relative path could be resolved.
    #[error("Missing path parameter")]
    MissingPath,

    /// Resolved path contains a `.` or `..` segment.
    #[error("Invalid path parameter")]
    InvalidPath,

    /// Inbound body could not be read.
    #[error("Invalid request body")]
    InvalidBody,

    /// Inbound body exceeded the configured limit.
    #[error("Request body too large (limit {limit} bytes)")]
    BodyTooLarge { limit: usize },

    /// Connection, DNS, TLS or body-read failure talking to the backend.
    /// Built with [`RelayError::transport`], which strips the request URL.
    #[error("upstream transport failure: {0}")]
    Transport(#[source] reqwest::Error),

    /// Backend did not answer within the deadline.
    #[error("upstream timed out after {0:?}")]
    Timeout(Duration),

    /// Backend error status without a JSON body to pass through.
    #[error("Upstream responded with status {}", .0.as_u16())]
    UpstreamStatus(StatusCode),
}

impl RelayError {
    /// Wrap a client error without the outbound URL, which carries the
    /// origin and the caller's query string.
    pub fn transport(err: reqwest::Error) -> Self {
        Self::Transport(err.without_url())
    }

    /// Status code returned to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingPath | Self::InvalidPath | Self::InvalidBody => StatusCode::BAD_REQUEST,
            Self::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Transport(_) | Self::Timeout(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UpstreamStatus(status) => *status,
        }
    }

    /// Message placed in the `error` field. Never carries the origin or secret.
    pub fn public_message(&self) -> String {
        match self {
            Self::MissingPath | Self::InvalidPath | Self::InvalidBody => self.to_string(),
            Self::BodyTooLarge { .. } => "Request body too large".to_string(),
            Self::Transport(_) | Self::Timeout(_) => PROXY_ERROR.to_string(),
            Self::UpstreamStatus(_) => self.to_string(),
        }
    }

    /// True when the request never left the relay.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::MissingPath | Self::InvalidPath | Self::InvalidBody | Self::BodyTooLarge { .. }
        )
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingPath => "missing_path",
            Self::InvalidPath => "invalid_path",
            Self::InvalidBody => "invalid_body",
            Self::BodyTooLarge { .. } => "body_too_large",
            Self::Transport(_) => "transport",
            Self::Timeout(_) => "timeout",
            Self::UpstreamStatus(_) => "upstream_status",
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        json_error(self.status(), &self.public_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(RelayError::MissingPath.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            RelayError::BodyTooLarge { limit: 10 }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            RelayError::Timeout(Duration::from_secs(60)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            RelayError::UpstreamStatus(StatusCode::BAD_GATEWAY).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_public_messages() {
        assert_eq!(RelayError::MissingPath.public_message(), "Missing path parameter");
        assert_eq!(RelayError::InvalidPath.public_message(), "Invalid path parameter");
        assert_eq!(RelayError::Timeout(Duration::from_secs(1)).public_message(), "Proxy Error");
        assert_eq!(
            RelayError::UpstreamStatus(StatusCode::SERVICE_UNAVAILABLE).public_message(),
            "Upstream responded with status 503"
        );
        assert_eq!(
            RelayError::BodyTooLarge { limit: 1024 }.public_message(),
            "Request body too large"
        );
    }

    #[test]
    fn test_rejections_never_reach_backend() {
        assert!(RelayError::MissingPath.is_rejection());
        assert!(RelayError::InvalidBody.is_rejection());
        assert!(RelayError::InvalidPath.is_rejection());
        assert!(!RelayError::Timeout(Duration::from_secs(1)).is_rejection());
    }
}
