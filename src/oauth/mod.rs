//! OAuth 2.0 authorization-code exchange
//!
//! Implements the callback side of the authorization code flow:
//! - Authorization URL construction with a per-call redirect URL
//! - Callback URL parsing and state validation
//! - Code exchange at the token endpoint
//! - User profile retrieval from the user-info endpoint

mod authorize;
mod callback;
mod client;
mod config;
mod exchange;
mod profile;

pub use authorize::authorization_url;
pub use callback::{CallbackParams, CallbackResult, parse_callback};
pub use client::{OAuthClient, build_http_client};
pub use config::{
    CallbackRedirectConfig, ClientConfig, DEFAULT_STATE, Endpoint, GOOGLE_AUTH_URL,
    GOOGLE_TOKEN_URL, GOOGLE_USERINFO_URL, TokenPlacement, callback_redirect_url,
};
pub use exchange::{AccessToken, exchange_code};
pub use profile::{UserProfile, fetch_profile};
