//! HTTP header constants used throughout the gateway.
//!
//! Centralizing header names avoids magic strings and keeps the handler,
//! the registry client and the tests in sync.

/// Authorization header - carries the shared secret inbound and the
/// bearer token outbound.
pub const AUTHORIZATION: &str = "authorization";

/// Cookie header - carries the developer portal session on key calls.
pub const COOKIE: &str = "cookie";

/// Set-Cookie header - where the portal returns the session on login.
pub const SET_COOKIE: &str = "set-cookie";

/// Content-Type header.
pub const CONTENT_TYPE: &str = "content-type";
