//! Report export dispatch
//!
//! Each export format has its own busy flag and its own sequence counter,
//! so a CSV export and a PDF export never wait on or interfere with each
//! other. Within one format, a completion whose ticket is not the most
//! recently issued one is discarded.

pub use crate::domain::resource::ExportFormat;
use crate::domain::resource::Resource;
use crate::error::{Error, Result};
use crate::pipeline::filters::FilterSet;
use crate::pipeline::source::RecordSource;
use crate::proxy::types::{Artifact, ProxyResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where delivered artifacts end up
#[async_trait]
pub trait DownloadSink: Send + Sync {
    async fn deliver(&self, artifact: &Artifact) -> Result<Download>;
}

/// A delivered artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub location: PathBuf,
    pub bytes: usize,
}

/// Writes artifacts into a directory, creating it on first use
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Reduce a backend-supplied file name to a single safe path component
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    cleaned.trim_start_matches('.').to_string()
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn deliver(&self, artifact: &Artifact) -> Result<Download> {
        let mut file_name = sanitize_file_name(&artifact.file_name);
        if file_name.is_empty() {
            file_name = "report".to_string();
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let location = self.dir.join(&file_name);
        tokio::fs::write(&location, &artifact.bytes).await?;

        info!(file = %location.display(), bytes = artifact.len(), "Report saved");
        Ok(Download {
            file_name,
            location,
            bytes: artifact.len(),
        })
    }
}

/// An issued, not yet completed, export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTicket {
    sequence: u64,
    format: ExportFormat,
    query: Option<String>,
}

impl ExportTicket {
    pub fn format(&self) -> ExportFormat {
        self.format
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Composed filter query, without the format parameter
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Ask the backend for the artifact
    pub async fn fetch<S>(&self, source: &S) -> ProxyResult<Artifact>
    where
        S: RecordSource + ?Sized,
    {
        source.export(self.query.clone(), self.format).await
    }
}

/// What a completed export did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Delivered(Download),
    Failed(String),
    /// A newer export of the same format was issued meanwhile
    Stale,
}

#[derive(Debug, Clone, Default)]
struct FormatSlot {
    busy: bool,
    issued: u64,
    error: Option<String>,
}

/// Busy state and errors for CSV and PDF exports
#[derive(Debug, Clone, Default)]
pub struct ExportDispatcher {
    csv: FormatSlot,
    pdf: FormatSlot,
}

impl ExportDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, format: ExportFormat) -> &FormatSlot {
        match format {
            ExportFormat::Csv => &self.csv,
            ExportFormat::Pdf => &self.pdf,
        }
    }

    fn slot_mut(&mut self, format: ExportFormat) -> &mut FormatSlot {
        match format {
            ExportFormat::Csv => &mut self.csv,
            ExportFormat::Pdf => &mut self.pdf,
        }
    }

    pub fn is_busy(&self, format: ExportFormat) -> bool {
        self.slot(format).busy
    }

    pub fn error(&self, format: ExportFormat) -> Option<&str> {
        self.slot(format).error.as_deref()
    }

    pub fn dismiss_error(&mut self, format: ExportFormat) {
        self.slot_mut(format).error = None;
    }

    /// Whether `ticket` is still the latest export issued for its format
    pub fn is_current(&self, ticket: &ExportTicket) -> bool {
        self.slot(ticket.format).issued == ticket.sequence
    }

    /// Mark the format busy and issue a ticket for the filters
    pub fn begin(&mut self, filters: &FilterSet, format: ExportFormat) -> ExportTicket {
        let query = filters.to_query(Resource::ReportExport, None);
        let slot = self.slot_mut(format);
        slot.issued += 1;
        slot.busy = true;
        slot.error = None;
        ExportTicket {
            sequence: slot.issued,
            format,
            query,
        }
    }

    /// Settle an export; only the format's own slot is touched
    pub fn complete(&mut self, ticket: &ExportTicket, result: Result<Download>) -> ExportOutcome {
        if !self.is_current(ticket) {
            debug!(format = %ticket.format, sequence = ticket.sequence, "Discarding stale export");
            return ExportOutcome::Stale;
        }

        let slot = self.slot_mut(ticket.format);
        slot.busy = false;
        match result {
            Ok(download) => {
                slot.error = None;
                ExportOutcome::Delivered(download)
            }
            Err(error) => {
                warn!(format = %ticket.format, error = %error, "Export failed");
                let message = error.to_string();
                slot.error = Some(message.clone());
                ExportOutcome::Failed(message)
            }
        }
    }

    /// Export the filtered result set and hand the artifact to `sink`
    ///
    /// The dispatcher stays mutably borrowed until the artifact is delivered,
    /// so one call runs one format at a time. To run CSV and PDF side by side,
    /// call [`begin`](Self::begin) for each format, await the tickets'
    /// [`fetch`](ExportTicket::fetch) concurrently, then settle each one
    /// with [`complete`](Self::complete).
    pub async fn export<S, K>(
        &mut self,
        source: &S,
        sink: &K,
        filters: &FilterSet,
        format: ExportFormat,
    ) -> ExportOutcome
    where
        S: RecordSource + ?Sized,
        K: DownloadSink + ?Sized,
    {
        let ticket = self.begin(filters, format);
        let fetched = ticket.fetch(source).await;
        let delivered = match fetched {
            Ok(artifact) => sink.deliver(&artifact).await,
            Err(error) => Err(Error::from(error)),
        };
        self.complete(&ticket, delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::resource::FilterField;
    use crate::proxy::types::ProxyError;
    use bytes::Bytes;
    use serde_json::Value;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubExports {
        fail_pdf: bool,
        queries: Mutex<Vec<(Option<String>, ExportFormat)>>,
    }

    #[async_trait]
    impl RecordSource for StubExports {
        async fn fetch(&self, _resource: Resource, _query: Option<String>) -> ProxyResult<Value> {
            unreachable!("exports never fetch pages")
        }

        async fn export(&self, query: Option<String>, format: ExportFormat) -> ProxyResult<Artifact> {
            self.queries.lock().unwrap().push((query, format));
            if self.fail_pdf && format == ExportFormat::Pdf {
                return Err(ProxyError::Transport {
                    operation: "export PDF report",
                    reason: "connection reset".to_string(),
                });
            }
            Ok(Artifact {
                bytes: Bytes::from_static(b"id,total\n"),
                content_type: "text/csv".to_string(),
                file_name: format!("ventas.{}", format.extension()),
            })
        }
    }

    #[test]
    fn test_busy_flags_are_independent() {
        let mut dispatcher = ExportDispatcher::new();
        let filters = FilterSet::empty();

        let csv = dispatcher.begin(&filters, ExportFormat::Csv);
        assert!(dispatcher.is_busy(ExportFormat::Csv));
        assert!(!dispatcher.is_busy(ExportFormat::Pdf));

        let pdf = dispatcher.begin(&filters, ExportFormat::Pdf);
        assert!(dispatcher.is_busy(ExportFormat::Csv));

        let outcome = dispatcher.complete(
            &pdf,
            Err(Error::from(ProxyError::InvalidRequest("boom".to_string()))),
        );
        assert!(matches!(outcome, ExportOutcome::Failed(_)));
        assert!(!dispatcher.is_busy(ExportFormat::Pdf));
        assert!(dispatcher.is_busy(ExportFormat::Csv));
        assert!(dispatcher.error(ExportFormat::Pdf).is_some());
        assert!(dispatcher.error(ExportFormat::Csv).is_none());

        let download = Download {
            file_name: "report.csv".to_string(),
            location: PathBuf::from("report.csv"),
            bytes: 3,
        };
        assert_eq!(
            dispatcher.complete(&csv, Ok(download.clone())),
            ExportOutcome::Delivered(download)
        );
        assert!(!dispatcher.is_busy(ExportFormat::Csv));
    }

    #[test]
    fn test_stale_export_is_discarded() {
        let mut dispatcher = ExportDispatcher::new();
        let filters = FilterSet::empty();
        let older = dispatcher.begin(&filters, ExportFormat::Csv);
        let newer = dispatcher.begin(&filters, ExportFormat::Csv);

        let outcome = dispatcher.complete(
            &older,
            Err(Error::from(ProxyError::InvalidRequest("late".to_string()))),
        );
        assert_eq!(outcome, ExportOutcome::Stale);
        assert!(dispatcher.is_busy(ExportFormat::Csv));
        assert!(dispatcher.error(ExportFormat::Csv).is_none());
        assert!(dispatcher.is_current(&newer));
    }

    #[test]
    fn test_ticket_query_has_no_page() {
        let mut dispatcher = ExportDispatcher::new();
        let filters = FilterSet::compose([
            (FilterField::AmountMin, "100"),
            (FilterField::ClientSearch, ""),
        ]);
        let ticket = dispatcher.begin(&filters, ExportFormat::Pdf);
        assert_eq!(ticket.query(), Some("monto_min=100"));
    }

    #[tokio::test]
    async fn test_export_writes_artifact_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("downloads"));
        let source = StubExports::default();
        let mut dispatcher = ExportDispatcher::new();

        let outcome = dispatcher
            .export(&source, &sink, &FilterSet::empty(), ExportFormat::Csv)
            .await;

        let download = match outcome {
            ExportOutcome::Delivered(download) => download,
            other => panic!("expected a delivered export, got {other:?}"),
        };
        assert_eq!(download.file_name, "ventas.csv");
        let written = tokio::fs::read(&download.location).await.unwrap();
        assert_eq!(written, b"id,total\n");
        assert!(!dispatcher.is_busy(ExportFormat::Csv));
    }

    #[tokio::test]
    async fn test_failed_format_does_not_touch_the_other() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let source = StubExports {
            fail_pdf: true,
            ..Default::default()
        };
        let mut dispatcher = ExportDispatcher::new();
        let filters = FilterSet::compose([(FilterField::ClientSearch, "ana")]);

        let pdf = dispatcher
            .export(&source, &sink, &filters, ExportFormat::Pdf)
            .await;
        assert_eq!(
            pdf,
            ExportOutcome::Failed("Failed to export PDF report: connection reset".to_string())
        );
        assert!(dispatcher.error(ExportFormat::Csv).is_none());

        let csv = dispatcher
            .export(&source, &sink, &filters, ExportFormat::Csv)
            .await;
        assert!(matches!(csv, ExportOutcome::Delivered(_)));
        assert_eq!(source.queries.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_split_api_runs_both_formats_together() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let source = StubExports::default();
        let mut dispatcher = ExportDispatcher::new();
        let filters = FilterSet::compose([(FilterField::DateFrom, "2024-01-01")]);

        let csv = dispatcher.begin(&filters, ExportFormat::Csv);
        let pdf = dispatcher.begin(&filters, ExportFormat::Pdf);
        assert!(dispatcher.is_busy(ExportFormat::Csv));
        assert!(dispatcher.is_busy(ExportFormat::Pdf));

        let (csv_artifact, pdf_artifact) = tokio::join!(csv.fetch(&source), pdf.fetch(&source));
        let pdf_delivered = sink.deliver(&pdf_artifact.unwrap()).await;
        let csv_delivered = sink.deliver(&csv_artifact.unwrap()).await;

        assert!(matches!(
            dispatcher.complete(&pdf, pdf_delivered),
            ExportOutcome::Delivered(_)
        ));
        assert!(dispatcher.is_busy(ExportFormat::Csv));
        assert!(matches!(
            dispatcher.complete(&csv, csv_delivered),
            ExportOutcome::Delivered(_)
        ));
        assert!(!dispatcher.is_busy(ExportFormat::Csv));
        assert!(!dispatcher.is_busy(ExportFormat::Pdf));
        assert_eq!(source.queries.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_directory_sink_sanitises_names() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let artifact = Artifact {
            bytes: Bytes::from_static(b"%PDF"),
            content_type: "application/pdf".to_string(),
            file_name: "../../etc/passwd".to_string(),
        };

        let download = sink.deliver(&artifact).await.unwrap();
        assert_eq!(download.file_name, "_.._etc_passwd");
        assert!(download.location.starts_with(dir.path()));
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("ventas 2024.csv"), "ventas_2024.csv");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name(""), "");
    }
}
