//! Developer portal authentication.
//!
//! A login yields three values that must travel together: the session
//! cookie from the `Set-Cookie` header, and the transient API base URL and
//! temporary bearer token from the response body. [`Session`] bundles them
//! as one structured record instead of a pre-formatted cookie string, and
//! renders the composite cookie the portal expects only at the call site.

use serde::Deserialize;
use serde_json::json;

use crate::error::{GatewayError, Result};
use crate::headers;

/// Short-lived authenticated context for key-management calls.
///
/// Created fresh per provisioning cycle and discarded when it returns;
/// never persisted.
#[derive(Debug, Clone)]
pub struct Session {
    cookie: String,
    api_url: String,
    api_token: String,
}

impl Session {
    #[cfg(test)]
    pub(crate) fn for_tests(cookie: &str, api_url: &str, api_token: &str) -> Self {
        Self {
            cookie: cookie.to_string(),
            api_url: api_url.to_string(),
            api_token: api_token.to_string(),
        }
    }

    /// Renders the composite cookie header the developer portal expects on
    /// every key-management call.
    pub fn cookie_header(&self) -> String {
        format!(
            "{}; game-api-url={};game-api-token={}",
            self.cookie, self.api_url, self.api_token
        )
    }
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    #[serde(rename = "swaggerUrl")]
    swagger_url: String,
    #[serde(rename = "temporaryAPIToken")]
    temporary_api_token: String,
}

/// Exchanges account credentials for a [`Session`].
///
/// POSTs `{email, password}` to `<portal_url>/login`. A rejected login
/// surfaces as [`GatewayError::Auth`] carrying the portal's error payload
/// verbatim, which short-circuits the rest of the provisioning cycle.
pub async fn authenticate(
    client: &reqwest::Client,
    portal_url: &str,
    email: &str,
    password: &str,
) -> Result<Session> {
    let url = format!("{portal_url}/login");
    let response = client
        .post(&url)
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .map_err(|err| GatewayError::Network(format!("login request failed: {err}")))?;

    if !response.status().is_success() {
        let payload = response
            .json()
            .await
            .unwrap_or_else(|_| json!({ "error": "login rejected" }));
        return Err(GatewayError::Auth(payload));
    }

    let cookie = response
        .headers()
        .get(headers::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| {
            GatewayError::Auth(json!({ "error": "login response missing session cookie" }))
        })?;

    let body: LoginBody = response.json().await.map_err(|err| {
        GatewayError::Auth(json!({ "error": format!("malformed login response: {err}") }))
    })?;

    Ok(Session {
        cookie,
        api_url: body.swagger_url,
        api_token: body.temporary_api_token,
    })
}
