//! Worker HTTP surface
//!
//! Exposes the operation registry as JSON-RPC over `POST /rpc`.

mod router;
mod server;

pub use router::{AppState, create_router, handle_rpc};
pub use server::Worker;
