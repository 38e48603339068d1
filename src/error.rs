//! Error types for the OAuth exchange worker

use std::io;

use thiserror::Error;

/// Result type alias for the OAuth exchange worker
pub type Result<T> = std::result::Result<T, Error>;

/// OAuth exchange worker errors
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No operation registered under the requested name
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Fewer arguments than the operation declares
    #[error("missing {expected} parameter (expected: {signature})")]
    MissingArgument {
        /// Operation name
        operation: String,
        /// Names of the parameters the caller has to supply, e.g. `callbackHost or url`
        expected: String,
        /// Full call shape of the operation
        signature: String,
    },

    /// Argument present but of the wrong kind
    #[error("wrong type of {param} parameter: expected {expected}, got {actual} (expected: {signature})")]
    WrongArgumentType {
        /// Offending parameter name
        param: String,
        /// Declared parameter type
        expected: String,
        /// Type actually received
        actual: String,
        /// Full call shape of the operation
        signature: String,
    },

    /// Callback URL could not be parsed
    /// A text argument was present but empty
    #[error("empty {param} parameter (expected: {signature})")]
    EmptyArgument {
        /// Parameter name
        param: String,
        /// Expected call signature
        signature: String,
    },

    #[error("Invalid callback URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Callback `state` does not match the value sent with the authorization request
    #[error("Invalid OAuth state")]
    InvalidState,

    /// Provider redirected back with an `error` instead of a code
    #[error("Authorization denied: {error} - {description}")]
    AuthorizationDenied {
        /// OAuth error code (e.g. `access_denied`)
        error: String,
        /// Provider supplied description
        description: String,
    },

    /// Token endpoint rejected the code or returned an unusable response
    #[error("code exchange failed: {0}")]
    CodeExchangeFailed(String),

    /// User-info request failed (transport or non-success status)
    #[error("failed getting user info: {0}")]
    ProfileFetchFailed(String),

    /// User-info body was not a valid profile
    #[error("failed decoding user info: {0}")]
    ProfileDecodeFailed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the caller can fix this by correcting the call arguments
    #[must_use]
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            Self::MissingArgument { .. } | Self::WrongArgumentType { .. } | Self::EmptyArgument { .. }
        )
    }

    /// Stable variant name, reported as `data.kind` in JSON-RPC errors
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "Config",
            Self::UnknownOperation(_) => "UnknownOperation",
            Self::MissingArgument { .. } => "MissingArgument",
            Self::WrongArgumentType { .. } => "WrongArgumentType",
            Self::EmptyArgument { .. } => "EmptyArgument",
            Self::UrlParse(_) => "UrlParseError",
            Self::InvalidState => "InvalidState",
            Self::AuthorizationDenied { .. } => "AuthorizationDenied",
            Self::CodeExchangeFailed(_) => "CodeExchangeFailed",
            Self::ProfileFetchFailed(_) => "ProfileFetchFailed",
            Self::ProfileDecodeFailed(_) => "ProfileDecodeFailed",
            Self::Io(_) => "Io",
            Self::Json(_) => "Json",
            Self::Internal(_) => "Internal",
        }
    }

    /// Convert to JSON-RPC error code
    #[must_use]
    pub fn to_rpc_code(&self) -> i32 {
        match self {
            Self::UnknownOperation(_) => rpc_codes::METHOD_NOT_FOUND,
            Self::MissingArgument { .. }
            | Self::WrongArgumentType { .. }
            | Self::EmptyArgument { .. } => rpc_codes::INVALID_PARAMS,
            Self::Json(_) => rpc_codes::PARSE_ERROR,
            Self::UrlParse(_) => -32001,
            Self::InvalidState => -32002,
            Self::AuthorizationDenied { .. } => -32003,
            Self::CodeExchangeFailed(_) => -32004,
            Self::ProfileFetchFailed(_) => -32005,
            Self::ProfileDecodeFailed(_) => -32006,
            _ => rpc_codes::INTERNAL_ERROR,
        }
    }
}

/// Standard JSON-RPC error codes
pub mod rpc_codes {
    /// Parse error - Invalid JSON
    pub const PARSE_ERROR: i32 = -32700;
    /// Invalid Request - Not a valid Request object
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method not found
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid params
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error
    pub const INTERNAL_ERROR: i32 = -32603;
}
