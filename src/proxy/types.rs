//! Type definitions for the proxy gateway

use crate::domain::types::Credential;
use bytes::Bytes;
use http::{Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Default per-call deadline for backend requests
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default maximum size for inbound request bodies in bytes
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 10 * 1024 * 1024;

/// Failure side of every gateway operation
///
/// Each variant carries the human-readable description of the operation
/// that failed; the rendered message never includes a backtrace.
#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Failed to {operation}: {reason}")]
    Transport {
        operation: &'static str,
        reason: String,
    },

    #[error("Failed to {operation}: backend did not respond within {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("Failed to {operation}: backend responded with {status}{}", detail_suffix(.detail))]
    Rejected {
        operation: &'static str,
        status: StatusCode,
        detail: Option<String>,
    },

    #[error("Failed to {operation}: malformed backend response ({reason})")]
    Malformed {
        operation: &'static str,
        reason: String,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

impl ProxyError {
    /// HTTP status surfaced to the caller
    ///
    /// Backend rejections keep the backend's own status; every other
    /// failure is reported as 500.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Rejected { status, .. } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Human-readable failure message
    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Result type for gateway operations
pub type ProxyResult<T> = Result<T, ProxyError>;

/// Body of an outbound backend call
#[derive(Debug, Default)]
pub enum OutboundBody {
    #[default]
    Empty,
    Json(Value),
    /// Multipart payload; the transport sets the content type and boundary
    Multipart(reqwest::multipart::Form),
}

impl OutboundBody {
    pub fn is_multipart(&self) -> bool {
        matches!(self, OutboundBody::Multipart(_))
    }
}

/// A single outbound call to the backend of record
#[derive(Debug)]
pub struct BackendRequest {
    pub method: Method,
    /// Path relative to the backend base URL
    pub path: String,
    /// Raw query string, without the leading `?`
    pub query: Option<String>,
    pub body: OutboundBody,
    pub credential: Option<Credential>,
    /// Human-readable description, e.g. `"fetch brands"`
    pub operation: &'static str,
}

impl BackendRequest {
    pub fn new(method: Method, path: impl Into<String>, operation: &'static str) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            body: OutboundBody::Empty,
            credential: None,
            operation,
        }
    }

    pub fn with_query(mut self, query: Option<String>) -> Self {
        self.query = query.filter(|q| !q.is_empty());
        self
    }

    pub fn with_body(mut self, body: OutboundBody) -> Self {
        self.body = body;
        self
    }

    pub fn with_credential(mut self, credential: Option<Credential>) -> Self {
        self.credential = credential;
        self
    }
}

/// A backend-generated downloadable file, relayed byte-for-byte
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub bytes: Bytes,
    pub content_type: String,
    pub file_name: String,
}

impl Artifact {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
