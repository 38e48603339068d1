//! The operations this worker exposes

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::args::{Args, Param, Signature};
use super::registry::Operation;
use crate::Result;
use crate::oauth::OAuthClient;

/// Identity reported by `getServiceType`
pub const SERVICE_TYPE: &str = "google_oauth_obrero";

/// `getServiceType()`
pub const GET_SERVICE_TYPE: Signature = Signature {
    name: "getServiceType",
    params: &[],
};

/// `constructOAuthUrl(callbackHost, callbackEndPoint)`
pub const CONSTRUCT_OAUTH_URL: Signature = Signature {
    name: "constructOAuthUrl",
    params: &[Param::text("callbackHost"), Param::text("callbackEndPoint")],
};

/// `getUserInfo(callbackHost, uri, callbackEndPoint)`
pub const GET_USER_INFO: Signature = Signature {
    name: "getUserInfo",
    params: &[
        Param::text("callbackHost"),
        Param::text("uri"),
        Param::text("callbackEndPoint"),
    ],
};

/// Callback host/path pair a caller wants a login URL for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationRequest<'a> {
    /// Scheme + host the provider redirects back to
    pub callback_host: &'a str,
    /// Path on that host
    pub callback_end_point: &'a str,
}

impl<'a> From<Args<'a>> for AuthorizationRequest<'a> {
    fn from(args: Args<'a>) -> Self {
        Self {
            callback_host: args.text(0),
            callback_end_point: args.text(1),
        }
    }
}

/// Callback received from the provider plus the host/path it was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserInfoRequest<'a> {
    /// Callback host used when building the authorization URL
    pub callback_host: &'a str,
    /// Full callback URL including `state` and `code`
    pub uri: &'a str,
    /// Callback path used when building the authorization URL
    pub callback_end_point: &'a str,
}

impl<'a> From<Args<'a>> for UserInfoRequest<'a> {
    fn from(args: Args<'a>) -> Self {
        Self {
            callback_host: args.text(0),
            uri: args.text(1),
            callback_end_point: args.text(2),
        }
    }
}

/// Fixed service identity
pub struct ServiceType;

#[async_trait]
impl Operation for ServiceType {
    fn signature(&self) -> &Signature {
        &GET_SERVICE_TYPE
    }

    async fn invoke(&self, _args: Args<'_>, _attachment: Option<&Value>) -> Result<Value> {
        Ok(Value::String(SERVICE_TYPE.to_string()))
    }
}

/// Builds the provider login URL
pub struct ConstructOAuthUrl {
    oauth: Arc<OAuthClient>,
}

impl ConstructOAuthUrl {
    /// Create the operation over a shared OAuth client
    #[must_use]
    pub fn new(oauth: Arc<OAuthClient>) -> Self {
        Self { oauth }
    }
}

#[async_trait]
impl Operation for ConstructOAuthUrl {
    fn signature(&self) -> &Signature {
        &CONSTRUCT_OAUTH_URL
    }

    async fn invoke(&self, args: Args<'_>, _attachment: Option<&Value>) -> Result<Value> {
        let request = AuthorizationRequest::from(args);
        let url = self
            .oauth
            .construct_oauth_url(request.callback_host, request.callback_end_point)?;
        Ok(Value::String(url))
    }
}

/// Exchanges a callback for the user's profile
pub struct GetUserInfo {
    oauth: Arc<OAuthClient>,
}

impl GetUserInfo {
    /// Create the operation over a shared OAuth client
    #[must_use]
    pub fn new(oauth: Arc<OAuthClient>) -> Self {
        Self { oauth }
    }
}

#[async_trait]
impl Operation for GetUserInfo {
    fn signature(&self) -> &Signature {
        &GET_USER_INFO
    }

    async fn invoke(&self, args: Args<'_>, _attachment: Option<&Value>) -> Result<Value> {
        let request = UserInfoRequest::from(args);
        let profile = self
            .oauth
            .get_user_info(request.callback_host, request.uri, request.callback_end_point)
            .await?;
        Ok(serde_json::to_value(profile)?)
    }
}
