//! Named operations exposed to callers
//!
//! Each operation has a fixed positional signature. The registry validates
//! arguments against it before anything runs, so malformed calls never
//! reach the provider.

mod args;
mod builtin;
mod registry;

pub use args::{Args, Param, Signature, TEXT_TYPE, value_type_name};
pub use builtin::{
    AuthorizationRequest, CONSTRUCT_OAUTH_URL, ConstructOAuthUrl, GET_SERVICE_TYPE, GET_USER_INFO,
    GetUserInfo, SERVICE_TYPE, ServiceType, UserInfoRequest,
};
pub use registry::{Operation, OperationRegistry};
