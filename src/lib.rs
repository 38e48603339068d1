//! OAuth Exchange Worker Library
//!
//! Callback-driven OAuth2 authorization-code exchange: builds the login URL a
//! client should follow, and turns the provider's callback URL into the
//! authenticated user's profile.
//!
//! # Operations
//!
//! - `getServiceType()` - fixed service identity
//! - `constructOAuthUrl(callbackHost, callbackEndPoint)` - authorization URL
//! - `getUserInfo(callbackHost, uri, callbackEndPoint)` - state check, code
//!   exchange and user-info lookup
//!
//! Operations are exposed by name through [`operation::OperationRegistry`]
//! and served as JSON-RPC by [`worker::Worker`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod error;
pub mod oauth;
pub mod operation;
pub mod protocol;
pub mod worker;

pub use error::{Error, Result};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    let installed = match format {
        Some("json") => subscriber.with(fmt::layer().json()).try_init(),
        _ => subscriber.with(fmt::layer()).try_init(),
    };

    installed.map_err(|e| Error::Internal(format!("Failed to install tracing subscriber: {e}")))
}
