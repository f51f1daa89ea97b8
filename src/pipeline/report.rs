//! Report preview and dashboard loading

use crate::domain::dashboard::DashboardSummary;
use crate::domain::records::Sale;
use crate::domain::resource::Resource;
use crate::domain::types::{PageNumber, PageSize};
use crate::pipeline::filters::FilterSet;
use crate::pipeline::pagination::{Page, PageEnvelope};
use crate::pipeline::source::RecordSource;
use crate::proxy::types::ProxyError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

pub const NO_RESULTS_MESSAGE: &str = "No results found for these filters.";
pub const NO_DASHBOARD_DATA_MESSAGE: &str = "No data available. Check your connection.";

/// Result of previewing a filtered report
#[derive(Debug, Clone, PartialEq)]
pub enum Preview<T> {
    Ready(Page<T>),
    /// The filters matched nothing
    Empty(String),
    Failed(String),
}

/// Load the first page of sales matching `filters`
pub async fn preview<S>(source: &S, filters: &FilterSet) -> Preview<Sale>
where
    S: RecordSource + ?Sized,
{
    preview_records(source, Resource::Sales, filters).await
}

/// Load the first page of `resource` matching `filters`
pub async fn preview_records<T, S>(source: &S, resource: Resource, filters: &FilterSet) -> Preview<T>
where
    T: DeserializeOwned,
    S: RecordSource + ?Sized,
{
    let page = PageNumber::first();
    let query = filters.to_query(resource, Some(page));

    let parsed = source.fetch(resource, query).await.and_then(|value| {
        serde_json::from_value::<PageEnvelope<T>>(value).map_err(|e| ProxyError::Malformed {
            operation: "read report preview",
            reason: e.to_string(),
        })
    });

    match parsed {
        Ok(envelope) if envelope.results.is_empty() => Preview::Empty(NO_RESULTS_MESSAGE.to_string()),
        Ok(envelope) => {
            let page_size = resource
                .page_size()
                .or_else(|| {
                    u32::try_from(envelope.results.len())
                        .ok()
                        .and_then(|len| PageSize::try_new(len).ok())
                });
            match page_size {
                Some(size) => Preview::Ready(Page::from_envelope(envelope, page, size)),
                None => Preview::Empty(NO_RESULTS_MESSAGE.to_string()),
            }
        }
        Err(error) => {
            warn!(resource = %resource, error = %error, "Report preview failed");
            Preview::Failed(error.message())
        }
    }
}

/// State of the dashboard panel after a load
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    Ready(DashboardSummary),
    /// The backend answered but had neither history nor prediction
    NoData(String),
    Failed(String),
}

/// Sections that are missing or of the wrong shape count as empty
fn lenient_summary(value: Value) -> DashboardSummary {
    let historical = value
        .get("historical")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();
    let prediction = value
        .get("prediction")
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok());
    DashboardSummary {
        historical,
        prediction,
    }
}

/// Load the sales history and forecast shown on the dashboard
pub async fn load_dashboard<S>(source: &S) -> DashboardState
where
    S: RecordSource + ?Sized,
{
    match source.fetch(Resource::Dashboard, None).await {
        Ok(value) => {
            let summary = lenient_summary(value);
            if summary.is_empty() {
                DashboardState::NoData(NO_DASHBOARD_DATA_MESSAGE.to_string())
            } else {
                DashboardState::Ready(summary)
            }
        }
        Err(error) => {
            warn!(error = %error, "Dashboard load failed");
            DashboardState::Failed(error.message())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::resource::{ExportFormat, FilterField};
    use crate::proxy::types::{Artifact, ProxyResult};
    use async_trait::async_trait;
    use http::StatusCode;
    use serde_json::json;
    use std::sync::Mutex;

    struct OneShot {
        response: Mutex<Option<ProxyResult<Value>>>,
        seen: Mutex<Vec<(Resource, Option<String>)>>,
    }

    impl OneShot {
        fn new(response: ProxyResult<Value>) -> Self {
            Self {
                response: Mutex::new(Some(response)),
                seen: Mutex::default(),
            }
        }
    }

    #[async_trait]
    impl RecordSource for OneShot {
        async fn fetch(&self, resource: Resource, query: Option<String>) -> ProxyResult<Value> {
            self.seen.lock().unwrap().push((resource, query));
            self.response.lock().unwrap().take().expect("called twice")
        }

        async fn export(&self, _query: Option<String>, _format: ExportFormat) -> ProxyResult<Artifact> {
            unreachable!()
        }
    }

    fn sale(id: u64) -> Value {
        json!({
            "id": id,
            "user": {"id": 3, "email": "ana@example.com", "full_name": "Ana"},
            "total_amount": "150.00",
            "status": "COMPLETED",
            "created_at": "2024-05-01T10:00:00Z",
            "details": []
        })
    }

    #[tokio::test]
    async fn test_preview_ready() {
        let source = OneShot::new(Ok(json!({"count": 1, "results": [sale(1)]})));
        let filters = FilterSet::compose([(FilterField::ClientSearch, "ana")]);

        match preview(&source, &filters).await {
            Preview::Ready(page) => {
                assert_eq!(page.items().len(), 1);
                assert_eq!(page.items()[0].id, 1);
            }
            other => panic!("unexpected preview {other:?}"),
        }
        assert_eq!(
            source.seen.lock().unwrap()[0],
            (Resource::Sales, Some("page=1&client_search=ana".to_string()))
        );
    }

    #[tokio::test]
    async fn test_preview_empty() {
        let source = OneShot::new(Ok(json!({"count": 0, "results": []})));
        assert_eq!(
            preview(&source, &FilterSet::empty()).await,
            Preview::Empty(NO_RESULTS_MESSAGE.to_string())
        );
    }

    #[tokio::test]
    async fn test_preview_failure_carries_message() {
        let source = OneShot::new(Err(ProxyError::Rejected {
            operation: "fetch sales",
            status: StatusCode::BAD_REQUEST,
            detail: Some("fecha_inicio is invalid".to_string()),
        }));
        match preview(&source, &FilterSet::empty()).await {
            Preview::Failed(message) => assert!(message.contains("fecha_inicio is invalid")),
            other => panic!("unexpected preview {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dashboard_ready() {
        let source = OneShot::new(Ok(json!({
            "historical": [{"date": "2024-01-01", "month": "January", "year": 2024, "total_sales": 10.0}],
            "prediction": {"prediction_period": "2024-02", "predicted_sales_bob": 12.5}
        })));
        match load_dashboard(&source).await {
            DashboardState::Ready(summary) => {
                assert_eq!(summary.historical.len(), 1);
                assert_eq!(summary.prediction.unwrap().predicted_sales_bob, 12.5);
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dashboard_without_data() {
        let source = OneShot::new(Ok(json!({"historical": "n/a", "prediction": null})));
        assert_eq!(
            load_dashboard(&source).await,
            DashboardState::NoData(NO_DASHBOARD_DATA_MESSAGE.to_string())
        );
    }

    #[tokio::test]
    async fn test_dashboard_failure() {
        let source = OneShot::new(Err(ProxyError::Transport {
            operation: "fetch dashboard data",
            reason: "connection refused".to_string(),
        }));
        assert_eq!(
            load_dashboard(&source).await,
            DashboardState::Failed("Failed to fetch dashboard data: connection refused".to_string())
        );
    }
}
