//! Command line argument parsing for cocgate.
//!
//! This module defines the CLI interface using [`clap`] for argument parsing.
//! Network endpoints, credentials and the shared secret come from the
//! environment (see [`crate::env_vars`]); the CLI only controls where the
//! gateway listens and how chatty it is.

use clap::Parser;

/// Command line arguments for cocgate.
#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"))]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    long_about = "A gateway for the Clash of Clans API that provisions IP-scoped developer keys on the fly\n\nExample usage:\n  cocgate --listen 8080\n  cocgate -l 8080 --verbose"
)]
#[command(
    after_help = "Environment variables:\n  SECRET            Shared secret required on proxied requests\n  SC_DEV_EMAIL      Developer portal account email\n  SC_DEV_PASSWORD   Developer portal account password\n  DEV_PORTAL_URL    Developer portal base URL (default: https://developer.clashofclans.com/api)\n  COC_API_URL       Resource API base URL (default: https://api.clashofclans.com)\n  IP_ECHO_URL       Plain-text IP echo service (default: https://api.ipify.org/)\n  GATEWAY_PREFIX    Inbound path prefix (default: /cocapi)"
)]
pub struct Args {
    /// Address to bind to
    #[arg(
        long,
        short = 'b',
        help = "Bind address for incoming connections",
        value_name = "ADDRESS",
        default_value = "0.0.0.0"
    )]
    pub bind: String,

    /// Port to listen on for incoming requests
    #[arg(
        long,
        short = 'l',
        help = "Listen port for incoming connections",
        value_name = "PORT",
        default_value = "8080"
    )]
    pub listen: u16,

    /// Enable verbose output
    #[arg(
        long,
        short = 'v',
        help = "Show detailed configuration and startup information"
    )]
    pub verbose: bool,

    /// Enable quiet mode (minimal output)
    #[arg(
        long,
        short = 'q',
        help = "Suppress configuration output, show only essential messages",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Args {
    /// Validates the parsed command line arguments.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If all arguments are valid
    /// * `Err(String)` - A descriptive error message if validation fails
    pub fn validate(&self) -> Result<(), String> {
        if self.listen == 0 {
            return Err("Listen port must be greater than 0".to_string());
        }

        if self.bind.parse::<std::net::IpAddr>().is_err() {
            return Err(format!("Invalid bind address: '{}'", self.bind));
        }

        Ok(())
    }
}
