//! Credential provisioning.
//!
//! The single entry point used by the forwarding layer: given the gateway's
//! configuration, return a key secret that is valid for the gateway's
//! current egress IP, minting one if necessary while keeping the account
//! under the portal's key cap.

use tracing::{debug, warn};

use crate::error::{GatewayError, Result};
use crate::registry::{self, ApiKey};
use crate::types::GatewayContext;
use crate::{identity, session};

/// Hard cap on concurrently existing keys, enforced by the portal.
pub const KEY_CAP: usize = 10;

/// Maximum number of IPs bundled into a freshly created key.
pub const MAX_KEY_IPS: usize = 5;

/// Returns an API key secret authorized for the gateway's current IP.
///
/// Steps run strictly in order: credentials check, login, key listing, IP
/// resolution, then reuse / evict-and-create. The whole network sequence
/// holds the context's provisioning lock so concurrent requests cannot both
/// decide to evict and overshoot the cap. Any failure aborts the cycle; the
/// caller maps the error to exactly one HTTP response.
pub async fn provision(ctx: &GatewayContext) -> Result<String> {
    let (email, password) = ctx
        .config
        .credentials()
        .ok_or(GatewayError::MissingCredentials)?;

    let _guard = ctx.provision_lock.lock().await;

    let session = session::authenticate(&ctx.client, &ctx.config.portal_url, email, password).await?;
    let keys = registry::list_keys(&ctx.client, &ctx.config.portal_url, &session).await?;
    let ip = identity::resolve_current_ip(&ctx.client, &ctx.config.ip_echo_url).await?;

    // Exact string membership, not a CIDR intersection test.
    if let Some(key) = keys
        .iter()
        .find(|key| key.cidr_ranges.iter().any(|range| range == &ip))
    {
        debug!(id = %key.id, ip = %ip, "reusing existing key for current IP");
        return Ok(key.key.clone());
    }

    if keys.len() == KEY_CAP {
        let oldest = &keys[0];
        warn!(id = %oldest.id, "key cap reached, revoking oldest key");
        registry::revoke_key(&ctx.client, &ctx.config.portal_url, &session, oldest).await?;
    }

    let ips = bundle_ips(&ip, &keys);
    let created = registry::create_key(&ctx.client, &ctx.config.portal_url, &session, ips).await?;
    debug!(id = %created.id, ip = %ip, "provisioned new key");
    Ok(created.key)
}

/// Bundles the current IP with IPs inherited from existing keys.
///
/// Walks the key list in order, skipping the last entry, and collects
/// authorized IPs until [`MAX_KEY_IPS`] are gathered or candidates run out.
/// Best effort only: a short list never blocks key creation.
fn bundle_ips(current_ip: &str, keys: &[ApiKey]) -> Vec<String> {
    let mut ips = vec![current_ip.to_string()];
    for key in keys.iter().take(keys.len().saturating_sub(1)) {
        for range in &key.cidr_ranges {
            if ips.len() >= MAX_KEY_IPS {
                return ips;
            }
            ips.push(range.clone());
        }
    }
    ips
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GatewayConfig;
    use httpmock::MockServer;
    use serde_json::json;

    fn key(id: &str, secret: &str, ranges: &[&str]) -> ApiKey {
        ApiKey {
            id: id.to_string(),
            key: secret.to_string(),
            cidr_ranges: ranges.iter().map(|r| r.to_string()).collect(),
            name: None,
            description: None,
        }
    }

    fn key_json(id: &str, secret: &str, ranges: &[&str]) -> serde_json::Value {
        json!({ "id": id, "key": secret, "cidrRanges": ranges })
    }

    fn test_ctx(portal: &MockServer, echo: &MockServer) -> GatewayContext {
        GatewayContext::new(GatewayConfig {
            secret: Some("s3cret".to_string()),
            dev_email: Some("dev@example.com".to_string()),
            dev_password: Some("hunter2".to_string()),
            portal_url: portal.base_url(),
            api_url: "http://unused.invalid".to_string(),
            ip_echo_url: echo.url("/"),
            prefix: "/cocapi".to_string(),
        })
    }

    async fn mock_login(portal: &MockServer) -> httpmock::Mock<'_> {
        portal
            .mock_async(|when, then| {
                when.method(httpmock::Method::POST).path("/login");
                then.status(200)
                    .header("set-cookie", "session=abc")
                    .json_body(json!({
                        "swaggerUrl": "https://api.clashofclans.com",
                        "temporaryAPIToken": "tmp-token"
                    }));
            })
            .await
    }

    async fn mock_key_list(
        portal: &MockServer,
        keys: Vec<serde_json::Value>,
    ) -> httpmock::Mock<'_> {
        portal
            .mock_async(|when, then| {
                when.method(httpmock::Method::POST).path("/apikey/list");
                then.status(200).json_body(json!({ "keys": keys }));
            })
            .await
    }

    async fn mock_ip<'a>(echo: &'a MockServer, ip: &str) -> httpmock::Mock<'a> {
        let ip = ip.to_string();
        echo.mock_async(move |when, then| {
            when.method(httpmock::Method::GET).path("/");
            then.status(200).body(ip);
        })
        .await
    }

    // --- bundle_ips -------------------------------------------------------

    #[test]
    fn bundle_with_no_existing_keys_is_just_the_current_ip() {
        assert_eq!(bundle_ips("203.0.113.7", &[]), vec!["203.0.113.7"]);
    }

    #[test]
    fn bundle_excludes_the_last_listed_key() {
        let keys = vec![
            key("k1", "s1", &["198.51.100.1"]),
            key("k2", "s2", &["198.51.100.2"]),
        ];
        assert_eq!(
            bundle_ips("203.0.113.7", &keys),
            vec!["203.0.113.7", "198.51.100.1"]
        );
    }

    #[test]
    fn bundle_stops_at_five_ips() {
        let keys = vec![
            key("k1", "s1", &["10.0.0.1", "10.0.0.2", "10.0.0.3"]),
            key("k2", "s2", &["10.0.0.4", "10.0.0.5", "10.0.0.6"]),
            key("k3", "s3", &["10.0.0.7"]),
        ];
        let ips = bundle_ips("203.0.113.7", &keys);
        assert_eq!(ips.len(), MAX_KEY_IPS);
        assert_eq!(
            ips,
            vec!["203.0.113.7", "10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.4"]
        );
    }

    #[test]
    fn bundle_with_a_single_key_inherits_nothing() {
        let keys = vec![key("k1", "s1", &["198.51.100.1"])];
        assert_eq!(bundle_ips("203.0.113.7", &keys), vec!["203.0.113.7"]);
    }

    // --- provision --------------------------------------------------------

    #[tokio::test]
    async fn missing_credentials_fail_before_any_network_call() {
        let portal = MockServer::start_async().await;
        let echo = MockServer::start_async().await;
        let login = mock_login(&portal).await;

        let mut ctx = test_ctx(&portal, &echo);
        ctx.config.dev_password = None;

        let err = provision(&ctx).await.unwrap_err();
        assert!(matches!(err, GatewayError::MissingCredentials));
        assert_eq!(login.hits_async().await, 0);
    }

    #[tokio::test]
    async fn rejected_login_short_circuits_the_cycle() {
        let portal = MockServer::start_async().await;
        let echo = MockServer::start_async().await;
        portal
            .mock_async(|when, then| {
                when.method(httpmock::Method::POST).path("/login");
                then.status(403).json_body(json!({ "error": "bad credentials" }));
            })
            .await;
        let list = mock_key_list(&portal, vec![]).await;
        let ip = mock_ip(&echo, "203.0.113.7").await;

        let ctx = test_ctx(&portal, &echo);
        let err = provision(&ctx).await.unwrap_err();

        match err {
            GatewayError::Auth(payload) => {
                assert_eq!(payload, json!({ "error": "bad credentials" }));
            }
            other => panic!("expected Auth error, got {other:?}"),
        }
        assert_eq!(list.hits_async().await, 0);
        assert_eq!(ip.hits_async().await, 0);
    }

    #[tokio::test]
    async fn matching_key_is_reused_without_create_or_revoke() {
        let portal = MockServer::start_async().await;
        let echo = MockServer::start_async().await;
        mock_login(&portal).await;
        mock_key_list(
            &portal,
            vec![
                key_json("k1", "secret-1", &["198.51.100.1"]),
                key_json("k2", "secret-2", &["198.51.100.2", "203.0.113.7"]),
            ],
        )
        .await;
        mock_ip(&echo, "203.0.113.7").await;
        let create = portal
            .mock_async(|when, then| {
                when.method(httpmock::Method::POST).path("/apikey/create");
                then.status(200);
            })
            .await;
        let revoke = portal
            .mock_async(|when, then| {
                when.method(httpmock::Method::POST).path("/apikey/revoke");
                then.status(200);
            })
            .await;

        let ctx = test_ctx(&portal, &echo);

        // Idempotent: repeated cycles against unchanged upstream state
        // return the same key.
        for _ in 0..2 {
            let token = provision(&ctx).await.unwrap();
            assert_eq!(token, "secret-2");
        }
        assert_eq!(create.hits_async().await, 0);
        assert_eq!(revoke.hits_async().await, 0);
    }

    #[tokio::test]
    async fn below_cap_creates_without_revoking() {
        let portal = MockServer::start_async().await;
        let echo = MockServer::start_async().await;
        mock_login(&portal).await;
        mock_key_list(
            &portal,
            vec![
                key_json("k1", "secret-1", &["198.51.100.1"]),
                key_json("k2", "secret-2", &["198.51.100.2"]),
            ],
        )
        .await;
        mock_ip(&echo, "203.0.113.7").await;
        let create = portal
            .mock_async(|when, then| {
                when.method(httpmock::Method::POST)
                    .path("/apikey/create")
                    .json_body_partial(
                        json!({ "cidrRanges": ["203.0.113.7", "198.51.100.1"] }).to_string(),
                    );
                then.status(200).json_body(json!({
                    "key": key_json("k3", "fresh-secret", &["203.0.113.7", "198.51.100.1"])
                }));
            })
            .await;
        let revoke = portal
            .mock_async(|when, then| {
                when.method(httpmock::Method::POST).path("/apikey/revoke");
                then.status(200);
            })
            .await;

        let ctx = test_ctx(&portal, &echo);
        let token = provision(&ctx).await.unwrap();

        assert_eq!(token, "fresh-secret");
        create.assert_async().await;
        assert_eq!(revoke.hits_async().await, 0);
    }

    #[tokio::test]
    async fn at_cap_revokes_the_oldest_key_then_creates() {
        let portal = MockServer::start_async().await;
        let echo = MockServer::start_async().await;
        mock_login(&portal).await;

        let keys: Vec<serde_json::Value> = (1..=KEY_CAP)
            .map(|i| {
                json!({
                    "id": format!("k{i}"),
                    "key": format!("secret-{i}"),
                    "cidrRanges": [format!("10.0.0.{i}")]
                })
            })
            .collect();
        mock_key_list(&portal, keys).await;
        mock_ip(&echo, "203.0.113.7").await;

        let revoke = portal
            .mock_async(|when, then| {
                when.method(httpmock::Method::POST)
                    .path("/apikey/revoke")
                    .json_body(json!({ "id": "k1" }));
                then.status(200);
            })
            .await;
        let create = portal
            .mock_async(|when, then| {
                when.method(httpmock::Method::POST).path("/apikey/create");
                then.status(200).json_body(json!({
                    "key": key_json("k11", "fresh-secret", &["203.0.113.7"])
                }));
            })
            .await;

        let ctx = test_ctx(&portal, &echo);
        let token = provision(&ctx).await.unwrap();

        assert_eq!(token, "fresh-secret");
        revoke.assert_async().await;
        create.assert_async().await;
    }

    #[tokio::test]
    async fn create_rejection_carries_the_portal_payload() {
        let portal = MockServer::start_async().await;
        let echo = MockServer::start_async().await;
        mock_login(&portal).await;
        mock_key_list(&portal, vec![]).await;
        mock_ip(&echo, "203.0.113.7").await;
        portal
            .mock_async(|when, then| {
                when.method(httpmock::Method::POST).path("/apikey/create");
                then.status(403).json_body(json!({ "error": "ip limit exceeded" }));
            })
            .await;

        let ctx = test_ctx(&portal, &echo);
        let err = provision(&ctx).await.unwrap_err();

        match err {
            GatewayError::KeyCreate(payload) => {
                assert_eq!(payload, json!({ "error": "ip limit exceeded" }));
            }
            other => panic!("expected KeyCreate error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_ip_echo_aborts_the_cycle() {
        let portal = MockServer::start_async().await;
        let echo = MockServer::start_async().await;
        mock_login(&portal).await;
        mock_key_list(&portal, vec![]).await;
        let create = portal
            .mock_async(|when, then| {
                when.method(httpmock::Method::POST).path("/apikey/create");
                then.status(200);
            })
            .await;

        let mut ctx = test_ctx(&portal, &echo);
        ctx.config.ip_echo_url = "http://127.0.0.1:1/".to_string();

        let err = provision(&ctx).await.unwrap_err();
        assert!(matches!(err, GatewayError::Network(_)));
        assert_eq!(create.hits_async().await, 0);
    }
}
