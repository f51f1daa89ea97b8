//! Middleware implementations for the gateway
//!
//! None of these inspect or validate the caller's credential; the backend
//! is the only authority on authentication.

use crate::proxy::error_response::extract_request_id;
use crate::proxy::headers::X_REQUEST_ID;
use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

const UNKNOWN_REQUEST_ID: &str = "unknown";

fn fresh_request_id() -> HeaderValue {
    HeaderValue::from_str(&Uuid::now_v7().to_string())
        .unwrap_or_else(|_| HeaderValue::from_static(UNKNOWN_REQUEST_ID))
}

/// Request ID middleware - ensures every request has a unique ID for tracing
///
/// An inbound `x-request-id` is kept when it is a valid UUID; otherwise a
/// fresh v7 UUID is generated. The ID is echoed on the response.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .and_then(|uuid| HeaderValue::from_str(&uuid.to_string()).ok())
        .unwrap_or_else(fresh_request_id);

    request
        .headers_mut()
        .insert(X_REQUEST_ID, request_id.clone());

    let mut response = next.run(request).await;
    response.headers_mut().insert(X_REQUEST_ID, request_id);
    response
}

/// Logging middleware - logs request/response details with timing
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id =
        extract_request_id(request.headers()).unwrap_or_else(|| UNKNOWN_REQUEST_ID.to_string());

    info!(
        request_id = request_id,
        method = %method,
        path = %path,
        "Incoming request"
    );

    let response = next.run(request).await;

    info!(
        request_id = request_id,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis(),
        "Request completed"
    );

    response
}

/// Logs every non-success response with its request ID
pub async fn failure_logging_middleware(request: Request, next: Next) -> Response {
    let request_id =
        extract_request_id(request.headers()).unwrap_or_else(|| UNKNOWN_REQUEST_ID.to_string());
    let path = request.uri().path().to_string();

    let response = next.run(request).await;
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        error!(
            request_id = request_id,
            path = %path,
            status = status.as_u16(),
            "Request failed"
        );
    }
    response
}
