//! Page-by-page browsing of one backend collection
//!
//! A [`PaginatedView`] is the state of one table in the console: the filter
//! criteria, the last successfully loaded page, and the load status. Every
//! load is issued under a sequence number; only the completion carrying the
//! most recently issued number may touch the view, so an older response
//! that arrives late is discarded instead of overwriting newer data.

use crate::domain::resource::Resource;
use crate::domain::types::{PageNumber, PageSize};
use crate::pipeline::filters::FilterSet;
use crate::pipeline::pagination::{Page, PageEnvelope};
use crate::pipeline::source::RecordSource;
use crate::proxy::types::{ProxyError, ProxyResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Load status of a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// What a completed load did to the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The page was stored
    Applied,
    /// The error was recorded; the previous page is kept
    Failed,
    /// A newer load was issued meanwhile; nothing changed
    Stale,
}

/// An issued, not yet completed, page load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    sequence: u64,
    resource: Resource,
    page: PageNumber,
    query: Option<String>,
}

impl LoadTicket {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn page(&self) -> PageNumber {
        self.page
    }

    /// Composed query string sent with this load
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Perform the round trip for this ticket
    pub async fn fetch<S>(&self, source: &S) -> ProxyResult<Value>
    where
        S: RecordSource + ?Sized,
    {
        source.fetch(self.resource, self.query.clone()).await
    }
}

/// State of one paginated collection view
#[derive(Debug, Clone)]
pub struct PaginatedView<T> {
    resource: Resource,
    filters: FilterSet,
    page: Page<T>,
    status: ViewStatus,
    error: Option<String>,
    issued: u64,
}

impl<T: DeserializeOwned> PaginatedView<T> {
    pub fn new(resource: Resource, page_size: PageSize) -> Self {
        Self {
            resource,
            filters: FilterSet::empty(),
            page: Page::empty(page_size),
            status: ViewStatus::Idle,
            error: None,
            issued: 0,
        }
    }

    /// A view using the resource's own page size, if it is paginated
    pub fn for_resource(resource: Resource) -> Option<Self> {
        resource.page_size().map(|size| Self::new(resource, size))
    }

    /// Mark the view as loading and issue a ticket for `page`
    pub fn begin_load(&mut self, page: PageNumber) -> LoadTicket {
        self.issued += 1;
        self.status = ViewStatus::Loading;
        LoadTicket {
            sequence: self.issued,
            resource: self.resource,
            page,
            query: self.filters.to_query(self.resource, Some(page)),
        }
    }

    /// Apply the result of a ticket's round trip
    pub fn complete_load(&mut self, ticket: &LoadTicket, result: ProxyResult<Value>) -> LoadOutcome {
        if ticket.sequence != self.issued {
            debug!(
                resource = %self.resource,
                sequence = ticket.sequence,
                latest = self.issued,
                "Discarding stale page response"
            );
            return LoadOutcome::Stale;
        }

        let parsed = result.and_then(|value| {
            serde_json::from_value::<PageEnvelope<T>>(value).map_err(|e| ProxyError::Malformed {
                operation: "read page",
                reason: e.to_string(),
            })
        });

        match parsed {
            Ok(envelope) => {
                self.page = Page::from_envelope(envelope, ticket.page, self.page.page_size());
                self.status = ViewStatus::Loaded;
                self.error = None;
                LoadOutcome::Applied
            }
            Err(error) => {
                warn!(resource = %self.resource, page = %ticket.page, error = %error, "Page load failed");
                self.status = ViewStatus::Failed;
                self.error = Some(error.message());
                LoadOutcome::Failed
            }
        }
    }

    /// Load `page` under the current filters
    ///
    /// Holds the view for the whole round trip. Callers that must keep the
    /// view usable while a request is in flight, and let a newer load
    /// supersede it, drive [`begin_load`](Self::begin_load),
    /// [`LoadTicket::fetch`] and [`complete_load`](Self::complete_load)
    /// themselves.
    pub async fn load<S>(&mut self, source: &S, page: PageNumber) -> LoadOutcome
    where
        S: RecordSource + ?Sized,
    {
        let ticket = self.begin_load(page);
        let result = ticket.fetch(source).await;
        self.complete_load(&ticket, result)
    }

    /// Load the following page; `None` without any request when there is none
    pub async fn next<S>(&mut self, source: &S) -> Option<LoadOutcome>
    where
        S: RecordSource + ?Sized,
    {
        if !self.has_next() {
            return None;
        }
        let page = self.current_page().successor()?;
        Some(self.load(source, page).await)
    }

    /// Load the preceding page; `None` without any request when there is none
    pub async fn previous<S>(&mut self, source: &S) -> Option<LoadOutcome>
    where
        S: RecordSource + ?Sized,
    {
        if !self.has_previous() {
            return None;
        }
        let page = self.current_page().predecessor()?;
        Some(self.load(source, page).await)
    }

    /// Load the current page again
    pub async fn reload<S>(&mut self, source: &S) -> LoadOutcome
    where
        S: RecordSource + ?Sized,
    {
        let page = self.current_page();
        self.load(source, page).await
    }

    /// Replace the filter criteria and load page 1
    pub async fn apply_filters<S>(&mut self, source: &S, filters: FilterSet) -> LoadOutcome
    where
        S: RecordSource + ?Sized,
    {
        self.set_filters(filters);
        self.load(source, PageNumber::first()).await
    }

    /// Drop every filter and load the unfiltered first page
    pub async fn reset_filters<S>(&mut self, source: &S) -> LoadOutcome
    where
        S: RecordSource + ?Sized,
    {
        self.apply_filters(source, FilterSet::empty()).await
    }

    /// Replace the filter criteria without loading
    pub fn set_filters(&mut self, filters: FilterSet) {
        self.filters = filters;
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }
}

impl<T> PaginatedView<T> {
    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn status(&self) -> ViewStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == ViewStatus::Loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn page(&self) -> &Page<T> {
        &self.page
    }

    pub fn items(&self) -> &[T] {
        self.page.items()
    }

    pub fn current_page(&self) -> PageNumber {
        self.page.current_page()
    }

    pub fn total_count(&self) -> u64 {
        self.page.total_count()
    }

    pub fn total_pages(&self) -> u32 {
        self.page.total_pages()
    }

    pub fn has_next(&self) -> bool {
        self.page.has_next()
    }

    pub fn has_previous(&self) -> bool {
        self.page.has_previous()
    }
}
