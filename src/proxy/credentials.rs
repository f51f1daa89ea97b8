//! Credential forwarding
//!
//! The gateway never authenticates anyone itself. It lifts whatever bearer
//! credential arrived on the inbound request and attaches it, unchanged, to
//! the outbound call. A missing credential is not an error here: the call is
//! sent unauthenticated and the backend decides whether to reject it.

use crate::domain::types::Credential;
use crate::proxy::headers::AUTHORIZATION;
use http::{HeaderMap, HeaderValue};
use tracing::warn;

/// Read the inbound credential, if any
///
/// Empty or non-text `Authorization` values count as absent.
pub fn extract_credential(headers: &HeaderMap) -> Option<Credential> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Credential::try_new(value.to_string()).ok())
}

/// Header fragment to attach to an outbound call
///
/// `Some(credential)` yields exactly one `Authorization` header carrying the
/// credential verbatim; `None` yields an empty fragment.
pub fn forward_headers(credential: Option<&Credential>) -> HeaderMap {
    let mut fragment = HeaderMap::new();
    if let Some(credential) = credential {
        match HeaderValue::from_str(credential.as_ref()) {
            Ok(mut value) => {
                value.set_sensitive(true);
                fragment.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("Credential is not a valid header value; forwarding without it"),
        }
    }
    fragment
}
