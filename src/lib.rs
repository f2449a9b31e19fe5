//! cocgate - a Clash of Clans API gateway
//!
//! The Clash of Clans API ties access tokens to fixed source IPs, which
//! breaks on ephemeral hosting where the gateway's egress IP changes.
//! cocgate sits in front of the API, and before forwarding each inbound
//! request it discovers its current public IP and reuses or provisions a
//! developer key authorized for that IP.
//!
//! This crate is the binary shell: CLI parsing, environment configuration
//! and the accept loop. All decision logic lives in `cocgate-core`.
//!
//! # Modules
//!
//! - [`args`] - command line argument parsing
//! - [`config`] - configuration loading from environment variables
//! - [`env_vars`] - environment variable constants
//! - [`server`] - startup banner and configuration display
//!
//! # Re-exports from cocgate-core
//!
//! - [`identity`] - egress IP discovery
//! - [`session`] - developer portal login
//! - [`registry`] - API key list/create/revoke
//! - [`provisioner`] - credential provisioning
//! - [`request_handler`] - the inbound HTTP pipeline

#![forbid(unsafe_code)]

pub mod args;
pub mod config;
pub mod env_vars;
pub mod server;

// Re-export cocgate-core modules
pub use cocgate_core::identity;
pub use cocgate_core::provisioner;
pub use cocgate_core::registry;
pub use cocgate_core::request_handler;
pub use cocgate_core::session;

// Re-export commonly used items at crate root
pub use cocgate_core::{ApiKey, GatewayConfig, GatewayContext, GatewayError, Result, Session};
