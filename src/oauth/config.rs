//! OAuth client configuration
//!
//! [`ClientConfig`] is loaded once at startup and shared read-only.
//! [`CallbackRedirectConfig`] is the per-call view of it with the redirect
//! URL pointed at the caller's callback host.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Google authorization endpoint
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
/// Google token endpoint
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Google user-info endpoint
pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
/// State value embedded in every authorization URL unless configured otherwise
pub const DEFAULT_STATE: &str = "state";

/// Identity-provider client registration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Client identifier issued by the provider
    #[serde(alias = "ClientID")]
    pub client_id: String,

    /// Client secret issued by the provider
    #[serde(alias = "ClientSecret")]
    pub client_secret: String,

    /// Static redirect URL; replaced per call by [`CallbackRedirectConfig`]
    #[serde(alias = "RedirectURL", skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,

    /// Requested scopes
    #[serde(alias = "Scopes")]
    pub scopes: Vec<String>,

    /// Provider endpoints
    #[serde(alias = "Endpoint")]
    pub endpoint: Endpoint,

    /// Value sent as `state` and required back on the callback
    pub state: String,

    /// How the access token is presented to the user-info endpoint
    pub token_placement: TokenPlacement,
}

/// Provider endpoint URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoint {
    /// Authorization endpoint (user is redirected here)
    #[serde(alias = "AuthURL")]
    pub auth_url: String,
    /// Token endpoint (code exchange)
    #[serde(alias = "TokenURL")]
    pub token_url: String,
    /// User-info endpoint
    #[serde(alias = "UserInfoURL")]
    pub userinfo_url: String,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self {
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }
}

/// Where the access token goes on the user-info request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPlacement {
    /// `?access_token=...`
    #[default]
    Query,
    /// `Authorization: Bearer ...`
    Header,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_url: None,
            scopes: Vec::new(),
            endpoint: Endpoint::default(),
            state: DEFAULT_STATE.to_string(),
            token_placement: TokenPlacement::default(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("redirect_url", &self.redirect_url)
            .field("scopes", &self.scopes)
            .field("endpoint", &self.endpoint)
            .field("state", &self.state)
            .field("token_placement", &self.token_placement)
            .finish()
    }
}

impl ClientConfig {
    /// Check that the registration is usable
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(Error::Config("oauth.client_id must not be empty".to_string()));
        }
        if self.state.is_empty() {
            return Err(Error::Config("oauth.state must not be empty".to_string()));
        }
        for (name, value) in [
            ("auth_url", &self.endpoint.auth_url),
            ("token_url", &self.endpoint.token_url),
            ("userinfo_url", &self.endpoint.userinfo_url),
        ] {
            Url::parse(value)
                .map_err(|e| Error::Config(format!("oauth.endpoint.{name} is invalid: {e}")))?;
        }
        Ok(())
    }

    /// Derive the per-call redirect configuration for a callback host/path
    #[must_use]
    pub fn with_callback(&self, callback_host: &str, callback_end_point: &str) -> CallbackRedirectConfig<'_> {
        CallbackRedirectConfig {
            client: self,
            redirect_url: callback_redirect_url(callback_host, callback_end_point),
        }
    }
}

/// Redirect URL registered for a callback host/path pair
#[must_use]
pub fn callback_redirect_url(callback_host: &str, callback_end_point: &str) -> String {
    format!("{callback_host}{callback_end_point}?host={callback_host}")
}

/// Client configuration with the redirect URL overridden for one flow
///
/// Borrowing the shared [`ClientConfig`] keeps it untouched; the override
/// lives only in this value.
#[derive(Debug, Clone)]
pub struct CallbackRedirectConfig<'a> {
    client: &'a ClientConfig,
    redirect_url: String,
}

impl CallbackRedirectConfig<'_> {
    /// The underlying client registration
    #[must_use]
    pub fn client(&self) -> &ClientConfig {
        self.client
    }

    /// Redirect URL for this flow
    #[must_use]
    pub fn redirect_url(&self) -> &str {
        &self.redirect_url
    }
}
