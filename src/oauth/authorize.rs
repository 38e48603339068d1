//! Authorization URL construction

use url::Url;

use super::config::CallbackRedirectConfig;
use crate::{Error, Result};

/// Build the provider authorization URL the end user is redirected to
///
/// Parameters are appended to whatever query the configured authorization
/// endpoint already carries.
pub fn authorization_url(config: &CallbackRedirectConfig<'_>) -> Result<String> {
    let client = config.client();
    let mut auth_url = Url::parse(&client.endpoint.auth_url)
        .map_err(|e| Error::Config(format!("Invalid auth endpoint: {e}")))?;

    {
        let mut params = auth_url.query_pairs_mut();
        params.append_pair("client_id", &client.client_id);
        params.append_pair("redirect_uri", config.redirect_url());
        params.append_pair("response_type", "code");
        if !client.scopes.is_empty() {
            params.append_pair("scope", &client.scopes.join(" "));
        }
        params.append_pair("state", &client.state);
    }

    Ok(auth_url.into())
}
