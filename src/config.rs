//! Configuration management for cocgate.
//!
//! The [`GatewayConfig`] is built exactly once at startup from environment
//! variables and handed to the core crate by value; core logic never does
//! ambient environment lookups. Missing developer credentials are a handled
//! runtime error (a 400 on provisioning), never a startup crash.

use std::env;

use tracing::warn;

use cocgate_core::GatewayConfig;

use crate::env_vars;

// ============================================================================
// Default Values
// ============================================================================

const DEFAULT_DEV_PORTAL_URL: &str = "https://developer.clashofclans.com/api";
const DEFAULT_COC_API_URL: &str = "https://api.clashofclans.com";
const DEFAULT_IP_ECHO_URL: &str = "https://api.ipify.org/";
const DEFAULT_GATEWAY_PREFIX: &str = "/cocapi";

/// Loads the gateway configuration from the process environment.
pub fn load_from_env() -> GatewayConfig {
    load_with(|key| env::var(key))
}

/// Builds the configuration through an injectable environment lookup,
/// keeping the parsing logic testable without mutating process state.
fn load_with<F>(env_var: F) -> GatewayConfig
where
    F: Fn(&str) -> Result<String, env::VarError>,
{
    let secret = non_empty(env_var(env_vars::SECRET).ok());
    let dev_email = non_empty(env_var(env_vars::DEV_EMAIL).ok());
    let dev_password = non_empty(env_var(env_vars::DEV_PASSWORD).ok());

    let portal_url = url_or_default(
        env_var(env_vars::DEV_PORTAL_URL).ok(),
        DEFAULT_DEV_PORTAL_URL,
    );
    let api_url = url_or_default(env_var(env_vars::COC_API_URL).ok(), DEFAULT_COC_API_URL);
    let ip_echo_url = match non_empty(env_var(env_vars::IP_ECHO_URL).ok()) {
        Some(url) => url,
        None => DEFAULT_IP_ECHO_URL.to_string(),
    };

    let prefix = match non_empty(env_var(env_vars::GATEWAY_PREFIX).ok()) {
        Some(value) if value.starts_with('/') => value.trim_end_matches('/').to_string(),
        Some(value) => {
            warn!(value = %value, "gateway prefix must start with '/', using default");
            DEFAULT_GATEWAY_PREFIX.to_string()
        }
        None => DEFAULT_GATEWAY_PREFIX.to_string(),
    };

    GatewayConfig {
        secret,
        dev_email,
        dev_password,
        portal_url,
        api_url,
        ip_echo_url,
        prefix,
    }
}

/// Treats empty or whitespace-only values as unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Base URLs are stored without a trailing slash so paths join cleanly.
fn url_or_default(value: Option<String>, default: &str) -> String {
    match non_empty(value) {
        Some(url) => url.trim_end_matches('/').to_string(),
        None => default.to_string(),
    }
}
