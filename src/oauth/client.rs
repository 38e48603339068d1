//! OAuth Client
//!
//! Stateless authorization-code flow over a shared, immutable client
//! registration. Each call derives its own redirect configuration.

use std::sync::Arc;

use reqwest::Client;
use tracing::{debug, info};

use super::authorize::authorization_url;
use super::callback::parse_callback;
use super::config::{CallbackRedirectConfig, ClientConfig};
use super::exchange::{AccessToken, exchange_code};
use super::profile::{UserProfile, fetch_profile};
use crate::config::HttpConfig;
use crate::{Error, Result};

/// OAuth client for one provider registration
#[derive(Debug, Clone)]
pub struct OAuthClient {
    /// HTTP client for token and user-info requests
    http_client: Client,

    /// Shared client registration
    config: Arc<ClientConfig>,
}

impl OAuthClient {
    /// Create a new OAuth client
    #[must_use]
    pub fn new(http_client: Client, config: Arc<ClientConfig>) -> Self {
        Self {
            http_client,
            config,
        }
    }

    /// Create a client with an HTTP client built from `http`
    pub fn from_config(http: &HttpConfig, config: Arc<ClientConfig>) -> Result<Self> {
        Ok(Self::new(build_http_client(http)?, config))
    }

    /// Shared client registration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the authorization URL for a callback host/path
    pub fn construct_oauth_url(&self, callback_host: &str, callback_end_point: &str) -> Result<String> {
        let redirect = self.config.with_callback(callback_host, callback_end_point);
        let url = authorization_url(&redirect)?;
        debug!(redirect_uri = %redirect.redirect_url(), "Constructed authorization URL");
        Ok(url)
    }

    /// Validate a callback URL and exchange its code for an access token
    pub async fn exchange(&self, redirect: &CallbackRedirectConfig<'_>, callback_url: &str) -> Result<AccessToken> {
        let callback = parse_callback(callback_url, &redirect.client().state)?;
        exchange_code(&self.http_client, redirect, &callback.code).await
    }

    /// Fetch the profile for an access token
    pub async fn fetch_profile(&self, token: &AccessToken) -> Result<UserProfile> {
        fetch_profile(&self.http_client, &self.config, token).await
    }

    /// Turn a provider callback into the authenticated user's profile
    ///
    /// `callback_host` and `callback_end_point` must match the ones given to
    /// [`Self::construct_oauth_url`] for this flow.
    pub async fn get_user_info(
        &self,
        callback_host: &str,
        uri: &str,
        callback_end_point: &str,
    ) -> Result<UserProfile> {
        let redirect = self.config.with_callback(callback_host, callback_end_point);
        let token = self.exchange(&redirect, uri).await?;
        let profile = self.fetch_profile(&token).await?;
        info!(user_id = profile.id().as_deref().unwrap_or("-"), "Resolved user profile");
        Ok(profile)
    }
}

/// Build the outbound HTTP client with the configured timeouts
pub fn build_http_client(http: &HttpConfig) -> Result<Client> {
    Client::builder()
        .timeout(http.request_timeout)
        .connect_timeout(http.connect_timeout)
        .user_agent(&http.user_agent)
        .build()
        .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OAuthClient {
        let config = ClientConfig {
            client_id: "client-123".to_string(),
            client_secret: "secret".to_string(),
            scopes: vec!["email".to_string()],
            ..ClientConfig::default()
        };
        OAuthClient::new(Client::new(), Arc::new(config))
    }

    #[test]
    fn construct_url_embeds_redirect() {
        let url = client().construct_oauth_url("https://host", "/cb").unwrap();
        assert!(url.contains("state=state"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fhost%2Fcb%3Fhost%3Dhttps%3A%2F%2Fhost"));
    }

    #[test]
    fn shared_config_is_not_mutated_by_calls() {
        let oauth = client();
        oauth.construct_oauth_url("https://a", "/one").unwrap();
        oauth.construct_oauth_url("https://b", "/two").unwrap();
        assert!(oauth.config().redirect_url.is_none());
    }

    #[tokio::test]
    async fn bad_state_fails_before_any_request() {
        // Token endpoint is unroutable; reaching it would surface a transport error instead
        let mut config = client().config().clone();
        config.endpoint.token_url = "http://127.0.0.1:9/token".to_string();
        let oauth = OAuthClient::new(Client::new(), Arc::new(config));

        let err = oauth
            .get_user_info("https://host", "https://host/cb?state=wrong&code=ABC123", "/cb")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidState));
    }

    #[tokio::test]
    async fn malformed_callback_is_parse_error() {
        let err = client()
            .get_user_info("https://host", "not a url", "/cb")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UrlParse(_)));
    }

    #[test]
    fn http_client_builds_from_defaults() {
        assert!(build_http_client(&HttpConfig::default()).is_ok());
    }
}
