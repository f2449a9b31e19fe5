//! Egress IP discovery.
//!
//! The gateway's outbound address can change between requests on ephemeral
//! hosting, so the IP is re-resolved on every provisioning cycle and never
//! cached.

use tracing::debug;

use crate::error::{GatewayError, Result};

/// Resolves the gateway's current public IP via a plain-text echo service.
///
/// One outbound GET per invocation. Any transport failure or non-success
/// status is fatal to the current provisioning attempt; there is no retry.
pub async fn resolve_current_ip(client: &reqwest::Client, echo_url: &str) -> Result<String> {
    let response = client
        .get(echo_url)
        .send()
        .await
        .map_err(|err| GatewayError::Network(format!("IP lookup failed: {err}")))?;

    if !response.status().is_success() {
        return Err(GatewayError::Network(format!(
            "IP lookup returned status {}",
            response.status()
        )));
    }

    let ip = response
        .text()
        .await
        .map_err(|err| GatewayError::Network(format!("IP lookup body unreadable: {err}")))?
        .trim()
        .to_string();

    if ip.is_empty() {
        return Err(GatewayError::Network("IP lookup returned an empty body".to_string()));
    }

    debug!(ip = %ip, "resolved current egress IP");
    Ok(ip)
}
