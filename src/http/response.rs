//! Response handling and transformation.
//!
//! # Responsibilities
//! - Build the caller-facing response from the backend's status and body
//! - Emit every response, errors included, as `application/json`
//! - Provide the `{"error": ...}` envelope for relay-side failures
//!
//! # Design Decisions
//! - Backend headers are not relayed; only status and body cross back
//! - JSON bodies are relayed byte-for-byte, never re-serialized
//! - Non-JSON text is re-emitted as a JSON string

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::de::IgnoredAny;
use serde_json::json;

const APPLICATION_JSON: &str = "application/json";

/// Shape of a backend response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyShape {
    Empty,
    Json,
    Text,
}

impl BodyShape {
    pub fn of(body: &[u8]) -> Self {
        if body.iter().all(u8::is_ascii_whitespace) {
            Self::Empty
        } else if serde_json::from_slice::<IgnoredAny>(body).is_ok() {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// `{"error": message}` with the given status.
pub fn json_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(json!({ "error": message }))).into_response()
}

/// Relay a backend body with `status`, normalized to JSON.
pub fn json_relay(status: StatusCode, body: Bytes) -> Response {
    let body = match BodyShape::of(&body) {
        BodyShape::Empty => Body::empty(),
        BodyShape::Json => Body::from(body),
        BodyShape::Text => {
            let text = String::from_utf8_lossy(&body);
            Body::from(serde_json::Value::String(text.into_owned()).to_string())
        }
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(APPLICATION_JSON),
    );
    response
}
