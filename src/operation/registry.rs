//! Operation registry and dispatch

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{Instrument, debug, info_span, warn};
use uuid::Uuid;

use super::args::{Args, Signature};
use super::builtin::{ConstructOAuthUrl, GetUserInfo, ServiceType};
use crate::oauth::OAuthClient;
use crate::{Error, Result};

/// A named operation callable with a positional argument list
#[async_trait]
pub trait Operation: Send + Sync {
    /// Name and declared parameters
    fn signature(&self) -> &Signature;

    /// Run the operation with already validated arguments
    ///
    /// `attachment` is whatever opaque value the caller sent along.
    async fn invoke(&self, args: Args<'_>, attachment: Option<&Value>) -> Result<Value>;
}

/// Static table of operations, fixed at startup
#[derive(Default)]
pub struct OperationRegistry {
    operations: HashMap<&'static str, Arc<dyn Operation>>,
}

impl OperationRegistry {
    /// Registry with `getServiceType`, `constructOAuthUrl` and `getUserInfo`
    #[must_use]
    pub fn with_defaults(oauth: Arc<OAuthClient>) -> Self {
        Self::default()
            .with(Arc::new(ServiceType))
            .with(Arc::new(ConstructOAuthUrl::new(Arc::clone(&oauth))))
            .with(Arc::new(GetUserInfo::new(oauth)))
    }

    /// Add an operation, replacing any previous one with the same name
    #[must_use]
    pub fn with(mut self, operation: Arc<dyn Operation>) -> Self {
        self.operations.insert(operation.signature().name, operation);
        self
    }

    /// Look up an operation by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Operation>> {
        self.operations.get(name)
    }

    /// All signatures, sorted by name
    #[must_use]
    pub fn signatures(&self) -> Vec<Signature> {
        let mut signatures: Vec<Signature> =
            self.operations.values().map(|op| *op.signature()).collect();
        signatures.sort_by_key(|s| s.name);
        signatures
    }

    /// Validate `args` against the named operation and invoke it
    pub async fn dispatch(&self, name: &str, args: &[Value], attachment: Option<&Value>) -> Result<Value> {
        let operation = self
            .get(name)
            .ok_or_else(|| Error::UnknownOperation(name.to_string()))?;

        let span = info_span!("operation", operation = %name, invocation_id = %Uuid::new_v4());
        async {
            let validated = operation.signature().validate(args)?;
            debug!(args = validated.len(), "Invoking operation");
            let result = operation.invoke(validated, attachment).await;
            if let Err(ref e) = result {
                warn!(kind = e.kind(), error = %e, "Operation failed");
            }
            result
        }
        .instrument(span)
        .await
    }
}
