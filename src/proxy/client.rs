//! Outbound backend client
//!
//! Every public method issues exactly one call to the backend of record:
//! no retries, no alternate backend, no caching. Transport failures,
//! deadline expiry, non-2xx responses and unparsable bodies all come back
//! as a [`ProxyError`].

use crate::config::BackendSettings;
use crate::domain::types::BackendUrl;
use crate::proxy::credentials::forward_headers;
use crate::proxy::headers::{content_types, disposition_file_name, CONTENT_DISPOSITION, CONTENT_TYPE};
use crate::proxy::types::*;
use bytes::Bytes;
use http::{HeaderValue, Method};
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// Fallback stem for artifacts whose response names no file
const DEFAULT_ARTIFACT_STEM: &str = "report";

/// HTTP client bound to the backend base URL
#[derive(Clone, Debug)]
pub struct BackendClient {
    base_url: BackendUrl,
    request_timeout: Duration,
    http: reqwest::Client,
}

impl BackendClient {
    pub fn new(base_url: BackendUrl, request_timeout: Duration) -> ProxyResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| ProxyError::Transport {
                operation: "initialise backend client",
                reason: e.to_string(),
            })?;

        Ok(Self {
            base_url,
            request_timeout,
            http,
        })
    }

    /// Build a client from backend settings
    pub fn from_settings(settings: &BackendSettings) -> ProxyResult<Self> {
        let base_url = BackendUrl::try_new(settings.base_url.clone()).map_err(|e| {
            ProxyError::InvalidRequest(format!("Invalid backend URL '{}': {e}", settings.base_url))
        })?;
        Self::new(base_url, Duration::from_millis(settings.request_timeout_ms))
    }

    pub fn base_url(&self) -> &BackendUrl {
        &self.base_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Forward a call and return the backend's JSON body unmodified
    ///
    /// A `DELETE` answered with a 2xx status and no body yields an empty
    /// JSON object.
    pub async fn forward_json(&self, request: BackendRequest) -> ProxyResult<Value> {
        let operation = request.operation;
        let is_delete = request.method == Method::DELETE;
        let (_, bytes) = self.dispatch(request).await?;

        if bytes.iter().all(u8::is_ascii_whitespace) && is_delete {
            return Ok(Value::Object(serde_json::Map::new()));
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            let failure = ProxyError::Malformed {
                operation,
                reason: e.to_string(),
            };
            error!(operation, error = %failure, "Backend returned an unparsable body");
            failure
        })
    }

    /// Forward a call whose 2xx body is a downloadable file
    pub async fn fetch_artifact(
        &self,
        request: BackendRequest,
        fallback_extension: &str,
    ) -> ProxyResult<Artifact> {
        let (headers, bytes) = self.dispatch(request).await?;

        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(content_types::APPLICATION_OCTET_STREAM)
            .to_string();
        let file_name = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(disposition_file_name)
            .unwrap_or_else(|| format!("{DEFAULT_ARTIFACT_STEM}.{fallback_extension}"));

        Ok(Artifact {
            bytes,
            content_type,
            file_name,
        })
    }

    async fn dispatch(&self, request: BackendRequest) -> ProxyResult<(http::HeaderMap, Bytes)> {
        let BackendRequest {
            method,
            path,
            query,
            body,
            credential,
            operation,
        } = request;

        let mut url = self.base_url.join(&path);
        if let Some(query) = query {
            url.push('?');
            url.push_str(&query);
        }

        let mut headers = forward_headers(credential.as_ref());
        if !body.is_multipart() {
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static(content_types::APPLICATION_JSON),
            );
        }

        let builder = self.http.request(method.clone(), &url).headers(headers);
        let builder = match body {
            OutboundBody::Empty => builder,
            OutboundBody::Json(value) => builder.body(value.to_string()),
            OutboundBody::Multipart(form) => builder.multipart(form),
        };

        debug!(operation, method = %method, path = %path, "Forwarding request to backend");
        let start = Instant::now();

        let response = builder.send().await.map_err(|e| {
            let failure = if e.is_timeout() {
                ProxyError::Timeout {
                    operation,
                    timeout: self.request_timeout,
                }
            } else {
                ProxyError::Transport {
                    operation,
                    reason: e.without_url().to_string(),
                }
            };
            error!(operation, error = %failure, "Backend call failed");
            failure
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.bytes().await.map_err(|e| {
            let failure = if e.is_timeout() {
                ProxyError::Timeout {
                    operation,
                    timeout: self.request_timeout,
                }
            } else {
                ProxyError::Transport {
                    operation,
                    reason: e.without_url().to_string(),
                }
            };
            error!(operation, error = %failure, "Reading backend response failed");
            failure
        })?;

        debug!(
            operation,
            status = status.as_u16(),
            duration_ms = start.elapsed().as_millis(),
            "Backend responded"
        );

        if !status.is_success() {
            let failure = ProxyError::Rejected {
                operation,
                status,
                detail: rejection_detail(&bytes),
            };
            error!(operation, error = %failure, "Backend rejected request");
            return Err(failure);
        }

        Ok((headers, bytes))
    }
}

/// Pull a human-readable reason out of a rejection body, if it has one
fn rejection_detail(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    ["detail", "error", "message"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_string)
}
