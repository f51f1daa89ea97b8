//! Inbound gateway routes
//!
//! One handler per (resource path, HTTP verb). Each handler lifts the
//! caller's credential, forwards exactly one call to the backend and either
//! passes the backend's JSON through or renders the error envelope.

use crate::domain::resource::{ExportFormat, Resource, FORMAT_PARAM};
use crate::domain::types::RecordId;
use crate::proxy::client::BackendClient;
use crate::proxy::credentials::extract_credential;
use crate::proxy::headers::{attachment_disposition, paths, CONTENT_DISPOSITION, CONTENT_TYPE};
use crate::proxy::types::*;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, RawQuery, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use serde_json::Value;
use std::sync::Arc;

/// Shared state for gateway handlers
#[derive(Clone, Debug)]
pub struct GatewayState {
    pub client: Arc<BackendClient>,
}

impl GatewayState {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }
}

/// Build the gateway router (without the middleware stack)
pub fn gateway_router(state: GatewayState) -> Router {
    Router::new()
        .route(paths::HEALTH, get(health_handler))
        .route(paths::BRANDS, get(list_brands).post(create_brand))
        .route(
            paths::BRAND,
            get(get_brand)
                .put(replace_brand)
                .patch(patch_brand)
                .delete(delete_brand),
        )
        .route(paths::PRODUCTS, get(list_products).post(create_product))
        .route(
            paths::PRODUCT,
            get(get_product)
                .put(replace_product)
                .patch(patch_product)
                .delete(delete_product),
        )
        .route(paths::SALES, get(list_sales))
        .route(paths::CUSTOMERS, get(list_customers))
        .route(paths::DASHBOARD, get(dashboard))
        .route(paths::REPORT_EXPORT, get(export_report))
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "OK"
}

// ---------- shared plumbing ----------

async fn relay(
    state: &GatewayState,
    request: BackendRequest,
    success: StatusCode,
) -> ProxyResult<Response> {
    let value = state.client.forward_json(request).await?;
    Ok((success, Json(value)).into_response())
}

fn parse_json_body(body: &Bytes) -> ProxyResult<Value> {
    serde_json::from_slice(body)
        .map_err(|e| ProxyError::InvalidRequest(format!("request body is not valid JSON: {e}")))
}

fn parse_record_id(raw: String) -> ProxyResult<RecordId> {
    RecordId::try_new(raw.clone())
        .map_err(|_| ProxyError::InvalidRequest(format!("invalid record id '{raw}'")))
}

async fn list(
    state: &GatewayState,
    headers: &HeaderMap,
    query: Option<String>,
    resource: Resource,
    operation: &'static str,
) -> ProxyResult<Response> {
    let request = BackendRequest::new(Method::GET, resource.path(), operation)
        .with_query(query)
        .with_credential(extract_credential(headers));
    relay(state, request, StatusCode::OK).await
}

async fn create_json(
    state: &GatewayState,
    headers: &HeaderMap,
    body: &Bytes,
    resource: Resource,
    operation: &'static str,
) -> ProxyResult<Response> {
    let request = BackendRequest::new(Method::POST, resource.path(), operation)
        .with_body(OutboundBody::Json(parse_json_body(body)?))
        .with_credential(extract_credential(headers));
    relay(state, request, StatusCode::CREATED).await
}

async fn item(
    state: &GatewayState,
    headers: &HeaderMap,
    method: Method,
    resource: Resource,
    id: String,
    body: Option<&Bytes>,
    operation: &'static str,
) -> ProxyResult<Response> {
    let id = parse_record_id(id)?;
    let success = if method == Method::DELETE {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::OK
    };
    let body = match body {
        Some(bytes) => OutboundBody::Json(parse_json_body(bytes)?),
        None => OutboundBody::Empty,
    };
    let request = BackendRequest::new(method, resource.item_path(id.as_ref()), operation)
        .with_body(body)
        .with_credential(extract_credential(headers));
    relay(state, request, success).await
}

/// Re-encode an inbound multipart payload for the backend
///
/// The outbound content type (and boundary) is set by the transport.
async fn multipart_form(mut multipart: Multipart) -> ProxyResult<reqwest::multipart::Form> {
    let invalid = |e: &dyn std::fmt::Display| {
        ProxyError::InvalidRequest(format!("malformed multipart body: {e}"))
    };

    let mut form = reqwest::multipart::Form::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| invalid(&e))? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(|e| invalid(&e))?;

        let mut part = reqwest::multipart::Part::bytes(data.to_vec());
        if let Some(file_name) = file_name {
            part = part.file_name(file_name);
        }
        if let Some(content_type) = content_type {
            part = part.mime_str(&content_type).map_err(|e| invalid(&e))?;
        }
        form = form.part(name, part);
    }
    Ok(form)
}

fn export_format(query: Option<&str>) -> ProxyResult<ExportFormat> {
    let raw = query
        .unwrap_or_default()
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == FORMAT_PARAM)
        .map(|(_, value)| value)
        .ok_or_else(|| ProxyError::InvalidRequest("missing export format".to_string()))?;

    raw.parse()
        .map_err(|e: crate::domain::resource::UnknownExportFormat| {
            ProxyError::InvalidRequest(e.to_string())
        })
}

fn artifact_response(artifact: Artifact) -> Response {
    let mut response = (StatusCode::OK, artifact.bytes).into_response();
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&artifact.content_type) {
        headers.insert(CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&attachment_disposition(&artifact.file_name)) {
        headers.insert(CONTENT_DISPOSITION, value);
    }
    response
}

// ---------- brands ----------

async fn list_brands(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> ProxyResult<Response> {
    list(&state, &headers, query, Resource::Brands, "fetch brands").await
}

async fn create_brand(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> ProxyResult<Response> {
    create_json(&state, &headers, &body, Resource::Brands, "create brand").await
}

async fn get_brand(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ProxyResult<Response> {
    item(&state, &headers, Method::GET, Resource::Brands, id, None, "fetch brand").await
}

async fn replace_brand(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Bytes,
) -> ProxyResult<Response> {
    item(&state, &headers, Method::PUT, Resource::Brands, id, Some(&body), "update brand").await
}

async fn patch_brand(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Bytes,
) -> ProxyResult<Response> {
    item(&state, &headers, Method::PATCH, Resource::Brands, id, Some(&body), "patch brand").await
}

async fn delete_brand(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ProxyResult<Response> {
    item(&state, &headers, Method::DELETE, Resource::Brands, id, None, "delete brand").await
}

// ---------- products ----------

async fn list_products(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> ProxyResult<Response> {
    list(&state, &headers, query, Resource::Products, "fetch products").await
}

async fn create_product(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> ProxyResult<Response> {
    let multipart = multipart.map_err(|e| ProxyError::InvalidRequest(e.body_text()))?;
    let request = BackendRequest::new(Method::POST, Resource::Products.path(), "create product")
        .with_body(OutboundBody::Multipart(multipart_form(multipart).await?))
        .with_credential(extract_credential(&headers));
    relay(&state, request, StatusCode::CREATED).await
}

async fn get_product(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ProxyResult<Response> {
    item(&state, &headers, Method::GET, Resource::Products, id, None, "fetch product").await
}

async fn replace_product(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Bytes,
) -> ProxyResult<Response> {
    item(&state, &headers, Method::PUT, Resource::Products, id, Some(&body), "update product").await
}

async fn patch_product(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Bytes,
) -> ProxyResult<Response> {
    item(&state, &headers, Method::PATCH, Resource::Products, id, Some(&body), "patch product").await
}

async fn delete_product(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ProxyResult<Response> {
    item(&state, &headers, Method::DELETE, Resource::Products, id, None, "delete product").await
}

// ---------- collections, dashboard and export ----------

async fn list_sales(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> ProxyResult<Response> {
    list(&state, &headers, query, Resource::Sales, "fetch sales").await
}

async fn list_customers(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> ProxyResult<Response> {
    list(&state, &headers, query, Resource::Customers, "fetch customers").await
}

async fn dashboard(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> ProxyResult<Response> {
    list(&state, &headers, query, Resource::Dashboard, "fetch dashboard data").await
}

async fn export_report(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> ProxyResult<Response> {
    let format = export_format(query.as_deref())?;
    let request = BackendRequest::new(Method::GET, Resource::ReportExport.path(), "export report")
        .with_query(query)
        .with_credential(extract_credential(&headers));
    let artifact = state
        .client
        .fetch_artifact(request, format.extension())
        .await?;
    Ok(artifact_response(artifact))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_format_from_query() {
        assert_eq!(
            export_format(Some("client_search=ana&format=pdf")).unwrap(),
            ExportFormat::Pdf
        );
        assert!(export_format(Some("client_search=ana")).is_err());
        assert!(export_format(None).is_err());
        assert!(export_format(Some("format=xlsx")).is_err());
    }

    #[test]
    fn test_parse_record_id_rejects_traversal() {
        assert!(parse_record_id("12".to_string()).is_ok());
        let error = parse_record_id("..".to_string()).unwrap_err();
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_parse_json_body() {
        assert!(parse_json_body(&Bytes::from_static(b"{\"name\":\"Acme\"}")).is_ok());
        assert!(matches!(
            parse_json_body(&Bytes::from_static(b"not json")),
            Err(ProxyError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_artifact_response_headers() {
        let response = artifact_response(Artifact {
            bytes: Bytes::from_static(b"a,b\n"),
            content_type: "text/csv".to_string(),
            file_name: "ventas.csv".to_string(),
        });
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "text/csv");
        assert_eq!(
            response.headers().get(CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"ventas.csv\""
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"a,b\n");
    }
}
