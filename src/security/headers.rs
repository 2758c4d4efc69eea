//! Outbound header policy.
//!
//! # Responsibilities
//! - Build the header set for the backend request from an explicit allow-list
//! - Attach the shared-secret header on every outbound request
//! - Strip hop-by-hop, cookie and host headers
//!
//! # Design Decisions
//! - Minimal forwarding: only `Authorization`, `Content-Type` and any
//!   operator-listed extras cross the relay
//! - The inbound `Host` never crosses; the outbound client derives it from
//!   the backend origin
//! - The secret value is marked sensitive so `Debug` output hides it

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::security::secret::Secret;

/// Default content type for bodies that arrive without one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Headers that never cross the relay, whatever the allow-list says.
const DENIED: &[&str] = &[
    "connection",
    "keep-alive",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "cookie",
    "set-cookie",
    "host",
    "content-length",
];

/// Returns true for hop-by-hop, proxy-internal and cookie headers.
pub fn is_denied(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.starts_with("proxy-") || DENIED.contains(&name.as_str())
}

/// Header names the secret header must not shadow.
pub fn is_reserved(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name == header::AUTHORIZATION.as_str() || name == header::CONTENT_TYPE.as_str() || is_denied(&name)
}

/// Allow-list applied to every inbound request before it is forwarded.
#[derive(Debug, Clone)]
pub struct HeaderPolicy {
    secret_header: HeaderName,
    secret_value: HeaderValue,
    allowed: Vec<HeaderName>,
}

impl HeaderPolicy {
    /// Build the policy. `extra` names are appended to the base allow-list.
    pub fn new(
        secret_header: HeaderName,
        secret: &Secret,
        extra: Vec<HeaderName>,
    ) -> Result<Self, header::InvalidHeaderValue> {
        let mut secret_value = HeaderValue::from_str(secret.expose())?;
        secret_value.set_sensitive(true);

        let mut allowed = vec![header::AUTHORIZATION, header::CONTENT_TYPE];
        for name in extra {
            if !allowed.contains(&name) && !is_denied(name.as_str()) && name != secret_header {
                allowed.push(name);
            }
        }

        Ok(Self {
            secret_header,
            secret_value,
            allowed,
        })
    }

    /// Headers for the outbound request.
    pub fn outbound_headers(&self, inbound: &HeaderMap, has_body: bool) -> HeaderMap {
        let mut headers = HeaderMap::new();

        for name in &self.allowed {
            for value in inbound.get_all(name) {
                headers.append(name.clone(), value.clone());
            }
        }

        if has_body && !headers.contains_key(header::CONTENT_TYPE) {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(DEFAULT_CONTENT_TYPE),
            );
        }

        headers.insert(self.secret_header.clone(), self.secret_value.clone());
        headers
    }
}
