//! Where pipeline views get their data from

use crate::domain::resource::{ExportFormat, Resource, FORMAT_PARAM};
use crate::domain::types::Credential;
use crate::proxy::client::BackendClient;
use crate::proxy::types::{Artifact, BackendRequest, ProxyResult};
use async_trait::async_trait;
use http::Method;
use serde_json::Value;
use std::sync::Arc;

/// A source of backend records and report artifacts
///
/// Every call is a single round trip; implementations must not retry or
/// cache.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// GET a resource collection with an already-composed query string
    async fn fetch(&self, resource: Resource, query: Option<String>) -> ProxyResult<Value>;

    /// Ask the backend to materialize a report artifact
    async fn export(&self, query: Option<String>, format: ExportFormat) -> ProxyResult<Artifact>;
}

#[async_trait]
impl<S: RecordSource + ?Sized> RecordSource for Arc<S> {
    async fn fetch(&self, resource: Resource, query: Option<String>) -> ProxyResult<Value> {
        (**self).fetch(resource, query).await
    }

    async fn export(&self, query: Option<String>, format: ExportFormat) -> ProxyResult<Artifact> {
        (**self).export(query, format).await
    }
}

/// Backend client bound to the credential of one console session
#[derive(Clone, Debug)]
pub struct GatewaySession {
    client: Arc<BackendClient>,
    credential: Option<Credential>,
}

impl GatewaySession {
    pub fn new(client: Arc<BackendClient>, credential: Option<Credential>) -> Self {
        Self { client, credential }
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }
}

fn fetch_operation(resource: Resource) -> &'static str {
    match resource {
        Resource::Brands => "fetch brands",
        Resource::Products => "fetch products",
        Resource::Sales => "fetch sales",
        Resource::Customers => "fetch customers",
        Resource::Dashboard => "fetch dashboard data",
        Resource::ReportExport => "fetch report",
    }
}

fn export_operation(format: ExportFormat) -> &'static str {
    match format {
        ExportFormat::Csv => "export CSV report",
        ExportFormat::Pdf => "export PDF report",
    }
}

/// Append the `format` parameter to a composed filter query
pub fn export_query(filters: Option<String>, format: ExportFormat) -> String {
    let format_pair = format!("{FORMAT_PARAM}={}", format.extension());
    match filters.filter(|q| !q.is_empty()) {
        Some(filters) => format!("{filters}&{format_pair}"),
        None => format_pair,
    }
}

#[async_trait]
impl RecordSource for GatewaySession {
    async fn fetch(&self, resource: Resource, query: Option<String>) -> ProxyResult<Value> {
        let request = BackendRequest::new(Method::GET, resource.path(), fetch_operation(resource))
            .with_query(query)
            .with_credential(self.credential.clone());
        self.client.forward_json(request).await
    }

    async fn export(&self, query: Option<String>, format: ExportFormat) -> ProxyResult<Artifact> {
        let request = BackendRequest::new(
            Method::GET,
            Resource::ReportExport.path(),
            export_operation(format),
        )
        .with_query(Some(export_query(query, format)))
        .with_credential(self.credential.clone());
        self.client
            .fetch_artifact(request, format.extension())
            .await
    }
}
