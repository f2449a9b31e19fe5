//! Configuration and shared state for the gateway.
//!
//! [`GatewayConfig`] is built once at startup (the binary crate reads it
//! from the process environment) and passed by `Arc` into the request
//! handler; core logic never looks at ambient environment variables.

use tokio::sync::Mutex;

/// Gateway configuration, constructed once at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Shared secret inbound callers must present in the `Authorization`
    /// header. `None` rejects every proxied request.
    pub secret: Option<String>,
    /// Developer portal account email.
    pub dev_email: Option<String>,
    /// Developer portal account password.
    pub dev_password: Option<String>,
    /// Base URL of the developer portal (login and key management).
    pub portal_url: String,
    /// Base URL of the resource API requests are forwarded to.
    pub api_url: String,
    /// URL of the plain-text IP echo service.
    pub ip_echo_url: String,
    /// Path prefix the gateway serves under, e.g. `/cocapi`.
    pub prefix: String,
}

impl GatewayConfig {
    /// Returns the portal credentials when both parts are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.dev_email.as_deref(), self.dev_password.as_deref()) {
            (Some(email), Some(password)) => Some((email, password)),
            _ => None,
        }
    }

    /// Check if the configuration is structurally valid.
    pub fn is_valid(&self) -> bool {
        self.prefix.starts_with('/')
            && !self.portal_url.is_empty()
            && !self.api_url.is_empty()
            && !self.ip_echo_url.is_empty()
    }
}

/// Per-process state shared by every request task.
///
/// The `reqwest::Client` gives all outbound calls connection pooling; the
/// provisioning lock serializes the list/evict/create sequence so two
/// concurrent requests cannot race past the key cap.
pub struct GatewayContext {
    pub config: GatewayConfig,
    pub client: reqwest::Client,
    pub provision_lock: Mutex<()>,
}

impl GatewayContext {
    /// Creates the context with a fresh pooled HTTP client.
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            provision_lock: Mutex::new(()),
        }
    }
}
