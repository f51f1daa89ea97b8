//! HTTP header constants and utilities for the gateway

/// Header name for request ID used for tracing and correlation
pub const X_REQUEST_ID: &str = "x-request-id";

/// Standard header re-exports for convenience
pub use http::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};

/// Well-known paths
pub mod paths {
    /// Health check endpoint path
    pub const HEALTH: &str = "/health";

    pub const BRANDS: &str = "/api/catalog/brands";
    pub const BRAND: &str = "/api/catalog/brands/{id}";
    pub const PRODUCTS: &str = "/api/catalog/products";
    pub const PRODUCT: &str = "/api/catalog/products/{id}";
    pub const SALES: &str = "/api/sales";
    pub const CUSTOMERS: &str = "/api/customers";
    pub const DASHBOARD: &str = "/api/dashboard";
    pub const REPORT_EXPORT: &str = "/api/reports/export";
}

/// Content types used by the gateway
pub mod content_types {
    pub const APPLICATION_JSON: &str = "application/json";
    pub const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";
}

/// Extract the `filename` parameter from a `Content-Disposition` value
pub fn disposition_file_name(value: &str) -> Option<String> {
    value
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

/// Build an attachment `Content-Disposition` value
pub fn attachment_disposition(file_name: &str) -> String {
    format!("attachment; filename=\"{}\"", file_name.replace('"', ""))
}
