//! Error types for the gateway core.
//!
//! Every failure the provisioning pipeline or the forwarding layer can hit
//! is a [`GatewayError`] variant, and each variant maps to exactly one HTTP
//! response. The handler writes that response once and performs no further
//! work, so a double response is impossible by construction.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;

use crate::headers;

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Unified error type for credential provisioning and forwarding.
///
/// Variants carrying a [`Value`] hold the upstream error payload verbatim;
/// it is passed through to the caller unmodified.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Developer portal credentials are not configured.
    #[error("email and password are required")]
    MissingCredentials,

    /// The developer portal rejected the login.
    #[error("login rejected by the developer portal")]
    Auth(Value),

    /// Listing the registered API keys failed.
    #[error("listing API keys failed")]
    KeyList(Value),

    /// The developer portal rejected the key creation.
    #[error("creating an API key failed")]
    KeyCreate(Value),

    /// Revoking an API key failed.
    #[error("revoking an API key failed")]
    KeyRevoke(Value),

    /// An outbound call could not reach its target at all.
    #[error("network error: {0}")]
    Network(String),
}

impl GatewayError {
    /// The HTTP status this error surfaces as.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MissingCredentials | GatewayError::Network(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::Auth(_) => StatusCode::UNAUTHORIZED,
            GatewayError::KeyList(_) | GatewayError::KeyCreate(_) | GatewayError::KeyRevoke(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Consumes the error and produces the single HTTP response it maps to.
    ///
    /// Upstream payloads are forwarded verbatim; errors without one get a
    /// JSON body with a `reason` field. Raw errors never leak as bodyless
    /// 500s.
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let status = self.status();
        let body = match self {
            GatewayError::MissingCredentials => {
                json!({ "reason": "email and password are required" })
            }
            GatewayError::Auth(payload)
            | GatewayError::KeyList(payload)
            | GatewayError::KeyCreate(payload)
            | GatewayError::KeyRevoke(payload) => payload,
            GatewayError::Network(_) => {
                json!({ "reason": "Unable to reach upstream service" })
            }
        };
        json_response(status, &body)
    }
}

/// Builds a JSON response with the given status and body.
pub fn json_response(status: StatusCode, body: &Value) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header(headers::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}
