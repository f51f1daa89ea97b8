//! Proxy gateway for the backend of record
//!
//! Inbound requests arrive on resource-scoped routes, the caller's
//! credential is lifted off the request, and exactly one outbound call is
//! made. Success bodies are relayed untouched; failures leave as a uniform
//! `{ "error": "<message>" }` envelope.

pub mod client;
pub mod credentials;
pub mod error_response;
pub mod headers;
pub mod middleware;
pub mod middleware_stack;
pub mod routes;
pub mod types;


pub use client::BackendClient;
pub use middleware_stack::GatewayMiddlewareStack;
pub use routes::{gateway_router, GatewayState};
pub use types::{Artifact, BackendRequest, OutboundBody, ProxyError, ProxyResult};

use axum::Router;
use std::sync::Arc;

/// Gateway router with the full middleware stack applied
pub fn gateway(client: Arc<BackendClient>, max_request_bytes: usize) -> Router {
    GatewayMiddlewareStack::new(max_request_bytes)
        .apply_to_router(gateway_router(GatewayState::new(client)))
}
