//! Developer portal key registry client.
//!
//! Lists, creates and revokes API keys under an authenticated [`Session`].
//! Each operation is a single POST with the session's composite cookie
//! header; any non-success upstream response becomes a registry error
//! wrapping the portal's payload, and nothing retries internally.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{GatewayError, Result};
use crate::headers;
use crate::session::Session;

/// One upstream-registered API key.
///
/// `cidr_ranges` is the ordered set of source addresses the key is
/// authorized for; list order is the portal's insertion order, which the
/// provisioner relies on for oldest-first eviction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: String,
    /// The secret bearer value used against the resource API.
    pub key: String,
    #[serde(rename = "cidrRanges", default)]
    pub cidr_ranges: Vec<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct KeyListBody {
    #[serde(default)]
    keys: Vec<ApiKey>,
}

#[derive(Debug, Deserialize)]
struct CreatedKeyBody {
    key: ApiKey,
}

/// Queries all keys currently registered under the account.
pub async fn list_keys(
    client: &reqwest::Client,
    portal_url: &str,
    session: &Session,
) -> Result<Vec<ApiKey>> {
    let response = client
        .post(format!("{portal_url}/apikey/list"))
        .header(headers::COOKIE, session.cookie_header())
        .json(&json!({}))
        .send()
        .await
        .map_err(|err| GatewayError::Network(format!("key list request failed: {err}")))?;

    if !response.status().is_success() {
        return Err(GatewayError::KeyList(error_payload(response).await));
    }

    let body: KeyListBody = response.json().await.map_err(|err| {
        GatewayError::KeyList(json!({ "error": format!("malformed key list response: {err}") }))
    })?;

    debug!(count = body.keys.len(), "listed registered API keys");
    Ok(body.keys)
}

/// Requests a new key scoped to the given IP set.
///
/// The generated name carries a creation timestamp so keys can be told
/// apart on the portal side.
pub async fn create_key(
    client: &reqwest::Client,
    portal_url: &str,
    session: &Session,
    ips: Vec<String>,
) -> Result<ApiKey> {
    let payload = json!({
        "cidrRanges": ips,
        "name": format!("Key generated at {}", chrono::Utc::now().to_rfc3339()),
        "description": "Key for non-commercial use",
    });

    let response = client
        .post(format!("{portal_url}/apikey/create"))
        .header(headers::COOKIE, session.cookie_header())
        .json(&payload)
        .send()
        .await
        .map_err(|err| GatewayError::Network(format!("key create request failed: {err}")))?;

    if !response.status().is_success() {
        return Err(GatewayError::KeyCreate(error_payload(response).await));
    }

    let body: CreatedKeyBody = response.json().await.map_err(|err| {
        GatewayError::KeyCreate(json!({ "error": format!("malformed key create response: {err}") }))
    })?;

    debug!(id = %body.key.id, "created API key");
    Ok(body.key)
}

/// Deletes a key by identifier.
pub async fn revoke_key(
    client: &reqwest::Client,
    portal_url: &str,
    session: &Session,
    key: &ApiKey,
) -> Result<()> {
    let response = client
        .post(format!("{portal_url}/apikey/revoke"))
        .header(headers::COOKIE, session.cookie_header())
        .json(&json!({ "id": key.id }))
        .send()
        .await
        .map_err(|err| GatewayError::Network(format!("key revoke request failed: {err}")))?;

    if !response.status().is_success() {
        return Err(GatewayError::KeyRevoke(error_payload(response).await));
    }

    debug!(id = %key.id, "revoked API key");
    Ok(())
}

/// Captures a non-success response body verbatim, falling back to a
/// structured reason when the body is not JSON.
async fn error_payload(response: reqwest::Response) -> Value {
    let status = response.status();
    response
        .json()
        .await
        .unwrap_or_else(|_| json!({ "reason": format!("upstream returned status {status}") }))
}
