//! HTTP router and handlers

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::debug;

use crate::Error;
use crate::error::rpc_codes;
use crate::operation::{OperationRegistry, SERVICE_TYPE};
use crate::protocol::{JsonRpcRequest, JsonRpcResponse};

/// Shared application state
pub struct AppState {
    /// Operation table
    pub registry: Arc<OperationRegistry>,
    /// Upper bound for a single operation call
    pub request_timeout: Duration,
}

/// Create the router
pub fn create_router(state: Arc<AppState>, max_body_size: usize) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/rpc", post(rpc_handler))
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "service": SERVICE_TYPE,
        "operations": state.registry.signatures(),
    }))
}

/// Operation call handler (POST /rpc)
async fn rpc_handler(State(state): State<Arc<AppState>>, body: Bytes) -> impl IntoResponse {
    Json(handle_rpc(&state, &body).await)
}

/// Decode a JSON-RPC request body, dispatch it and build the response
///
/// Every failure, including malformed bodies, comes back as a JSON-RPC
/// error object rather than an HTTP error.
pub async fn handle_rpc(state: &AppState, body: &[u8]) -> JsonRpcResponse {
    let value: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => {
            return JsonRpcResponse::error(None, rpc_codes::PARSE_ERROR, format!("Parse error: {e}"));
        }
    };

    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(r) => r,
        Err(e) => {
            return JsonRpcResponse::error(
                None,
                rpc_codes::INVALID_REQUEST,
                format!("Invalid request: {e}"),
            );
        }
    };

    let args: &[Value] = match &request.params {
        None | Some(Value::Null) => &[],
        Some(Value::Array(args)) => args,
        Some(other) => {
            return JsonRpcResponse::error(
                request.id,
                rpc_codes::INVALID_PARAMS,
                format!(
                    "params must be a positional array, got {}",
                    crate::operation::value_type_name(other)
                ),
            );
        }
    };

    debug!(method = %request.method, id = ?request.id, "Dispatching request");

    let dispatched = tokio::time::timeout(
        state.request_timeout,
        state
            .registry
            .dispatch(&request.method, args, request.attachment.as_ref()),
    )
    .await
    .unwrap_or_else(|_| {
        Err(Error::Internal(format!(
            "{} timed out after {:?}",
            request.method, state.request_timeout
        )))
    });

    match dispatched {
        Ok(result) => JsonRpcResponse::success(request.id, result),
        Err(e) => JsonRpcResponse::from_error(request.id, &e),
    }
}
