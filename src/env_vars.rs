//! Environment variable names used throughout cocgate configuration

/// Inbound authentication
pub const SECRET: &str = "SECRET";

/// Developer portal account credentials
pub const DEV_EMAIL: &str = "SC_DEV_EMAIL";
pub const DEV_PASSWORD: &str = "SC_DEV_PASSWORD";

/// Upstream endpoint overrides (defaults target the real services)
pub const DEV_PORTAL_URL: &str = "DEV_PORTAL_URL";
pub const COC_API_URL: &str = "COC_API_URL";
pub const IP_ECHO_URL: &str = "IP_ECHO_URL";

/// Inbound routing
pub const GATEWAY_PREFIX: &str = "GATEWAY_PREFIX";

/// Get all environment variable names for documentation/validation
pub fn all_env_vars() -> &'static [&'static str] {
    &[
        SECRET,
        DEV_EMAIL,
        DEV_PASSWORD,
        DEV_PORTAL_URL,
        COC_API_URL,
        IP_ECHO_URL,
        GATEWAY_PREFIX,
    ]
}
