//! OAuth callback parsing
//!
//! Turns the URL the provider redirected the user to into a validated
//! authorization code.

use subtle::ConstantTimeEq;
use tracing::{debug, warn};
use url::Url;

use crate::{Error, Result};

/// OAuth callback query parameters
#[derive(Debug, Default)]
pub struct CallbackParams {
    /// Authorization code
    pub code: Option<String>,

    /// State parameter (for CSRF protection)
    pub state: Option<String>,

    /// Error code
    pub error: Option<String>,

    /// Error description
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Extract the callback parameters from a URL query string
    ///
    /// When a key repeats, the first occurrence wins.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            let slot = match &*key {
                "code" => &mut params.code,
                "state" => &mut params.state,
                "error" => &mut params.error,
                "error_description" => &mut params.error_description,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }
}

/// OAuth callback result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackResult {
    /// Authorization code
    pub code: String,

    /// State parameter (already validated)
    pub state: String,
}

/// Parse a callback URL and validate its state against `expected_state`
///
/// State is checked before anything else so a forged callback never reaches
/// the token endpoint.
pub fn parse_callback(uri: &str, expected_state: &str) -> Result<CallbackResult> {
    let url = Url::parse(uri)?;
    let params = CallbackParams::from_url(&url);

    let state = params.state.unwrap_or_default();
    if !bool::from(state.as_bytes().ct_eq(expected_state.as_bytes())) {
        warn!(path = %url.path(), "OAuth callback state mismatch");
        return Err(Error::InvalidState);
    }

    if let Some(error) = params.error {
        let description = params
            .error_description
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(Error::AuthorizationDenied { error, description });
    }

    let code = match params.code {
        Some(c) if !c.is_empty() => c,
        _ => {
            return Err(Error::CodeExchangeFailed(
                "Missing authorization code".to_string(),
            ));
        }
    };

    debug!(path = %url.path(), "Received authorization code");
    Ok(CallbackResult { code, state })
}
