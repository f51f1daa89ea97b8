//! Uniform error envelope for gateway responses
//!
//! Every failure leaves the gateway as `{ "error": "<message>" }` with the
//! status chosen by [`ProxyError::status_code`], so callers only ever branch
//! on the status and the envelope, never on transport-specific shapes.

use crate::proxy::headers::X_REQUEST_ID;
use crate::proxy::types::ProxyError;
use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error envelope returned by every gateway route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Human-readable error message
    pub error: String,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    /// Convert to HTTP response, echoing the request ID when known
    pub fn into_response_with_status(self, status: StatusCode, request_id: Option<&str>) -> Response {
        let mut response = (status, Json(self)).into_response();

        if let Some(id) = request_id {
            if let Ok(header_value) = HeaderValue::from_str(id) {
                response.headers_mut().insert(X_REQUEST_ID, header_value);
            }
        }

        response
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        ErrorEnvelope::new(self.message()).into_response_with_status(self.status_code(), None)
    }
}

/// Helper to extract request ID from headers
pub fn extract_request_id(headers: &http::HeaderMap) -> Option<String> {
    headers
        .get(X_REQUEST_ID)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}
