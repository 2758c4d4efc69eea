//! Outbound HTTP client.
//!
//! One pooled `reqwest` client per process. Redirects are not followed and
//! environment proxies are ignored, so each inbound request produces exactly
//! one request to the configured origin.

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use reqwest::redirect::Policy;
use reqwest::Client;

use crate::config::TimeoutConfig;
use crate::relay::error::RelayError;
use crate::resilience::timeouts::with_deadline;

/// Status and fully read body of a backend response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Build the outbound client from the timeout settings.
pub fn build_client(timeouts: &TimeoutConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .redirect(Policy::none())
        .no_proxy()
        .build()
}

/// Sends one request to the backend under a total deadline.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client,
    deadline: Duration,
}

impl Forwarder {
    pub fn new(client: Client, deadline: Duration) -> Self {
        Self { client, deadline }
    }

    pub async fn send(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<UpstreamResponse, RelayError> {
        let mut request = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        with_deadline(self.deadline, async move {
            let response = request.send().await.map_err(RelayError::transport)?;
            let status = response.status();
            let body = response.bytes().await.map_err(RelayError::transport)?;
            Ok(UpstreamResponse { status, body })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_transport_error_omits_url() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead = listener.local_addr().unwrap();
        drop(listener);

        let client = build_client(&TimeoutConfig::default()).unwrap();
        let forwarder = Forwarder::new(client, Duration::from_secs(5));
        let url = format!("http://{}/api/chats?token=abc", dead);

        let err = forwarder
            .send(Method::GET, &url, HeaderMap::new(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Transport(_)));
        let reason = err.to_string();
        assert!(!reason.contains(&dead.to_string()), "{}", reason);
        assert!(!reason.contains("127.0.0.1"), "{}", reason);
        assert!(!reason.contains("token=abc"), "{}", reason);
        assert!(!reason.contains("/api/chats"), "{}", reason);
    }
}
