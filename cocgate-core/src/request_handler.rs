//! HTTP request handling and forwarding.
//!
//! The request flow:
//! 1. `GET <prefix>` answers the health check, no auth required
//! 2. `<prefix>/*` validates the shared secret against the `Authorization`
//!    header
//! 3. The credential provisioner supplies an API key for the current IP
//! 4. The request is relayed to the resource API with a bearer token and
//!    the upstream response is mirrored back verbatim
//!
//! The handler always resolves to a response; errors from provisioning are
//! mapped to exactly one HTTP response and no upstream call is attempted
//! without a credential.

use http_body_util::{BodyExt, Full};
use hyper::{Request, Response, StatusCode};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, error};

use crate::error::json_response;
use crate::headers;
use crate::provisioner;
use crate::types::GatewayContext;

/// Handles an incoming HTTP request through the gateway pipeline.
///
/// Generic over the request body so the binary crate can pass hyper's
/// `Incoming` while tests construct requests with in-memory bodies.
pub async fn handle_request<B>(
    req: Request<B>,
    ctx: Arc<GatewayContext>,
) -> Result<Response<Full<bytes::Bytes>>, Infallible>
where
    B: hyper::body::Body,
{
    let prefix = ctx.config.prefix.as_str();
    let path = req.uri().path();

    if path == prefix && req.method() == hyper::Method::GET {
        return Ok(json_response(
            StatusCode::OK,
            &json!({ "application": "Clash Of Clans API Gateway", "status": "ok" }),
        ));
    }

    if !path.starts_with(&format!("{prefix}/")) {
        return Ok(json_response(
            StatusCode::NOT_FOUND,
            &json!({ "reason": "Not found" }),
        ));
    }

    // Exact match against the configured secret, not a bearer scheme. An
    // unconfigured secret rejects every proxied request.
    let secret_ok = match (&ctx.config.secret, req.headers().get(headers::AUTHORIZATION)) {
        (Some(secret), Some(value)) => value.to_str().map(|v| v == secret).unwrap_or(false),
        _ => false,
    };
    if !secret_ok {
        return Ok(json_response(
            StatusCode::UNAUTHORIZED,
            &json!({ "reason": "Invalid secret sent to the gateway" }),
        ));
    }

    // Upstream-relative path: strip the gateway prefix, keep the query.
    let stripped = req
        .uri()
        .path_and_query()
        .map_or("", |pq| pq.as_str())
        .strip_prefix(prefix)
        .unwrap_or("")
        .to_string();
    let method = req.method().clone();

    let body_bytes = match req.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => {
            return Ok(json_response(
                StatusCode::BAD_REQUEST,
                &json!({ "reason": "Failed to read request body" }),
            ));
        }
    };

    let token = match provisioner::provision(&ctx).await {
        Ok(token) => token,
        Err(err) => {
            error!(error = %err, "provisioning failed");
            return Ok(err.into_response());
        }
    };

    forward_request(&ctx, method, &stripped, body_bytes, &token).await
}

/// Relays the request to the resource API and mirrors the response.
async fn forward_request(
    ctx: &GatewayContext,
    method: hyper::Method,
    stripped_path: &str,
    body_bytes: bytes::Bytes,
    token: &str,
) -> Result<Response<Full<bytes::Bytes>>, Infallible> {
    let destination = format!(
        "{}{}",
        ctx.config.api_url.trim_end_matches('/'),
        stripped_path
    );
    debug!(method = %method, destination = %destination, "forwarding request upstream");

    let reqwest_method = match reqwest::Method::from_bytes(method.as_str().as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            return Ok(json_response(
                StatusCode::METHOD_NOT_ALLOWED,
                &json!({ "reason": "HTTP method not supported" }),
            ));
        }
    };

    let mut req_builder = ctx
        .client
        .request(reqwest_method, &destination)
        .header(headers::AUTHORIZATION, format!("Bearer {token}"));

    if !body_bytes.is_empty() {
        req_builder = req_builder.body(body_bytes.to_vec());
    }

    match req_builder.send().await {
        Ok(response) => Ok(mirror_response(response).await),
        Err(err) => {
            error!(error = %err, "upstream call failed without a response");
            Ok(json_response(
                StatusCode::BAD_REQUEST,
                &json!({ "reason": "Unknown error durring COC API call" }),
            ))
        }
    }
}

/// Mirrors the upstream status and body back to the caller verbatim.
///
/// Non-2xx upstream responses are passed through unmasked; they are the
/// upstream's verdict, not a gateway fault.
async fn mirror_response(response: reqwest::Response) -> Response<Full<bytes::Bytes>> {
    let status = response.status().as_u16();
    let content_type = response.headers().get(headers::CONTENT_TYPE).cloned();

    let body = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(err) => {
            error!(error = %err, "failed to read upstream response body");
            return json_response(
                StatusCode::BAD_REQUEST,
                &json!({ "reason": "Unknown error durring COC API call" }),
            );
        }
    };

    let mut builder = Response::builder().status(status);
    if let Some(value) = content_type {
        if let Ok(header_value) = hyper::header::HeaderValue::from_bytes(value.as_bytes()) {
            builder = builder.header(headers::CONTENT_TYPE, header_value);
        }
    }
    builder.body(Full::new(body)).unwrap()
}
