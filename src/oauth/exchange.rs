//! Authorization code exchange

use std::fmt;

use reqwest::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::{debug, warn};

use super::config::CallbackRedirectConfig;
use crate::{Error, Result};

/// Bearer credential returned by the token endpoint
///
/// Lives for a single invocation; never stored.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    secret: String,
    token_type: Option<String>,
}

impl AccessToken {
    /// Wrap a raw token value
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            token_type: None,
        }
    }

    /// Raw token value
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Token type as reported by the provider (usually `Bearer`)
    #[must_use]
    pub fn token_type(&self) -> Option<&str> {
        self.token_type.as_deref()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"[redacted]")
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// OAuth token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
    token_type: Option<String>,
}

/// Exchange an authorization code for an access token
///
/// The redirect URL sent here must be the one used to build the
/// authorization URL, or the provider rejects the code.
pub async fn exchange_code(
    http_client: &Client,
    config: &CallbackRedirectConfig<'_>,
    code: &str,
) -> Result<AccessToken> {
    let client = config.client();
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", config.redirect_url()),
        ("client_id", client.client_id.as_str()),
        ("client_secret", client.client_secret.as_str()),
    ];

    debug!(endpoint = %client.endpoint.token_url, "Exchanging authorization code");

    let response = http_client
        .post(&client.endpoint.token_url)
        .header(ACCEPT, "application/json")
        .form(&params)
        .send()
        .await
        .map_err(|e| Error::CodeExchangeFailed(format!("Token request failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, "Token endpoint rejected authorization code");
        return Err(Error::CodeExchangeFailed(format!("HTTP {status} - {body}")));
    }

    let token_response: TokenResponse = response
        .json()
        .await
        .map_err(|e| Error::CodeExchangeFailed(format!("Failed to parse token response: {e}")))?;

    if token_response.access_token.is_empty() {
        return Err(Error::CodeExchangeFailed(
            "server response missing access_token".to_string(),
        ));
    }

    Ok(AccessToken {
        secret: token_response.access_token,
        token_type: token_response.token_type,
    })
}
