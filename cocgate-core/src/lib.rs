//! cocgate-core - credential provisioning and forwarding for the gateway
//!
//! The Clash of Clans API ties every access token to a fixed set of source
//! IPs, while the gateway's own egress IP may change between requests. This
//! crate holds the two pieces with real decision logic:
//!
//! - the credential lifecycle: discover the current egress IP, log in to
//!   the developer portal, and reuse or mint a key authorized for that IP
//!   under the portal's hard cap of 10 keys
//! - the forwarding layer: validate the shared secret, strip the gateway
//!   prefix, relay the request with a bearer token, and mirror the upstream
//!   response back verbatim
//!
//! # Modules
//!
//! - [`identity`] - egress IP discovery via an IP echo service
//! - [`session`] - developer portal login and session handling
//! - [`registry`] - key list/create/revoke client
//! - [`provisioner`] - the provisioning algorithm tying the above together
//! - [`request_handler`] - the inbound HTTP pipeline
//! - [`error`] - the error taxonomy and its HTTP response mapping
//! - [`types`] - configuration and shared per-process state

#![forbid(unsafe_code)]

pub mod error;
pub mod headers;
pub mod identity;
pub mod provisioner;
pub mod registry;
pub mod request_handler;
pub mod session;
pub mod types;

pub use error::{GatewayError, Result};
pub use registry::ApiKey;
pub use session::Session;
pub use types::{GatewayConfig, GatewayContext};
