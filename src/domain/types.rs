//! Validated value types shared by the gateway and the pipeline
//!
//! Raw strings and integers coming from inbound requests, configuration
//! and user-entered filters are wrapped here so that the rest of the crate
//! can rely on their invariants instead of re-checking them.

use nutype::nutype;
use std::fmt;

/// Opaque bearer credential forwarded to the backend
///
/// The value is carried exactly as received (including any `Bearer ` prefix);
/// it is never trimmed, inspected or refreshed. An empty header value is
/// treated as an absent credential.
#[nutype(
    validate(not_empty),
    derive(Clone, PartialEq, Eq, Hash, AsRef, Serialize, Deserialize)
)]
pub struct Credential(String);

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// A user-entered filter value that is non-blank after trimming
#[nutype(
    sanitize(trim),
    validate(not_empty),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        AsRef,
        Display,
        Serialize,
        Deserialize
    )
)]
pub struct FilterValue(String);

/// One-based page index
#[nutype(
    validate(greater_or_equal = 1),
    default = 1,
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        AsRef,
        Display,
        Default,
        Serialize,
        Deserialize
    )
)]
pub struct PageNumber(u32);

impl PageNumber {
    /// The first page
    pub fn first() -> Self {
        Self::default()
    }

    /// The page after this one
    pub fn successor(self) -> Option<Self> {
        self.into_inner()
            .checked_add(1)
            .and_then(|next| Self::try_new(next).ok())
    }

    /// The page before this one, if any
    pub fn predecessor(self) -> Option<Self> {
        Self::try_new(self.into_inner().saturating_sub(1)).ok()
    }
}

/// Number of records per page for a paginated resource
#[nutype(
    validate(greater_or_equal = 1),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        AsRef,
        Display,
        Serialize,
        Deserialize
    )
)]
pub struct PageSize(u32);

/// Base URL of the backend of record
#[nutype(
    sanitize(trim),
    validate(predicate = |s: &str| s.starts_with("http://") || s.starts_with("https://")),
    derive(Debug, Clone, PartialEq, Eq, AsRef, Display, Serialize, Deserialize)
)]
pub struct BackendUrl(String);

impl BackendUrl {
    /// Join a relative resource path onto the base URL
    pub fn join(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.as_ref().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Identifier taken from an `{id}` path segment
///
/// Restricted to characters that cannot escape the resource path.
#[nutype(
    validate(
        not_empty,
        len_char_max = 64,
        predicate = |s: &str| s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    ),
    derive(Debug, Clone, PartialEq, Eq, Hash, AsRef, Display, Serialize, Deserialize)
)]
pub struct RecordId(String);
