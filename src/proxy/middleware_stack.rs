//! Middleware stack builder for clean composition

use crate::proxy::middleware::*;
use crate::proxy::types::DEFAULT_MAX_REQUEST_BYTES;
use axum::{extract::DefaultBodyLimit, middleware::from_fn, Router};
use tower_http::limit::RequestBodyLimitLayer;

/// Builder for composing the gateway middleware stack
#[derive(Clone, Debug)]
pub struct GatewayMiddlewareStack {
    max_request_bytes: usize,
}

impl Default for GatewayMiddlewareStack {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUEST_BYTES)
    }
}

impl GatewayMiddlewareStack {
    pub fn new(max_request_bytes: usize) -> Self {
        Self { max_request_bytes }
    }

    /// Apply the complete middleware stack to a router
    ///
    /// Outer to inner: request ID, logging, failure logging, body limit.
    /// The configured limit replaces axum's built-in extractor limit, so
    /// `Bytes` and `Multipart` bodies are bounded by `max_request_bytes` only.
    pub fn apply_to_router<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(self.max_request_bytes))
            .layer(from_fn(failure_logging_middleware))
            .layer(from_fn(logging_middleware))
            .layer(from_fn(request_id_middleware))
    }
}
