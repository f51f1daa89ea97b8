//! Query and export pipeline
//!
//! User input is composed into a [`FilterSet`](filters::FilterSet), which
//! then drives either a [`PaginatedView`](fetcher::PaginatedView) or the
//! [`ExportDispatcher`](export::ExportDispatcher). Both reach the backend
//! through a [`RecordSource`](source::RecordSource).

pub mod export;
pub mod fetcher;
pub mod filters;
pub mod pagination;
pub mod report;
pub mod source;

pub use export::{DirectorySink, DownloadSink, ExportDispatcher, ExportFormat, ExportOutcome};
pub use fetcher::{LoadOutcome, PaginatedView, ViewStatus};
pub use filters::{FilterDraft, FilterField, FilterSet};
pub use pagination::{Page, PageEnvelope};
pub use report::{load_dashboard, preview, DashboardState, Preview};
pub use source::{GatewaySession, RecordSource};
