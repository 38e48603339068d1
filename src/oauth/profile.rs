//! User profile retrieval

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::config::{ClientConfig, TokenPlacement};
use super::exchange::AccessToken;
use crate::{Error, Result};

/// Profile returned by the provider's user-info endpoint
///
/// Kept as the JSON object the provider sent, so values of any type
/// (including `null`) reach the caller unchanged. Accessors cover the
/// common Google fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(Map<String, Value>);

impl UserProfile {
    /// Decode a user-info response body
    ///
    /// Any JSON object is accepted; anything else is a decode failure.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| Error::ProfileDecodeFailed(e.to_string()))
    }

    /// Raw value for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Provider user id, whether sent as text or number
    #[must_use]
    pub fn id(&self) -> Option<String> {
        match self.get("id")? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }

    /// Email address, when sent as text
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.get("email").and_then(Value::as_str)
    }

    /// All fields
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Unwrap into the underlying JSON object
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

/// Fetch the profile of the user the access token belongs to
pub async fn fetch_profile(
    http_client: &Client,
    client: &ClientConfig,
    token: &AccessToken,
) -> Result<UserProfile> {
    let endpoint = &client.endpoint.userinfo_url;
    debug!(endpoint = %endpoint, placement = ?client.token_placement, "Fetching user info");

    let request = match client.token_placement {
        TokenPlacement::Query => http_client
            .get(endpoint)
            .query(&[("access_token", token.secret())]),
        TokenPlacement::Header => http_client.get(endpoint).bearer_auth(token.secret()),
    };

    let response = request
        .send()
        .await
        .map_err(|e| Error::ProfileFetchFailed(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::ProfileFetchFailed(format!("HTTP {status} - {body}")));
    }

    let content = response
        .bytes()
        .await
        .map_err(|e| Error::ProfileFetchFailed(format!("failed reading response body: {e}")))?;

    UserProfile::from_slice(&content)
}
