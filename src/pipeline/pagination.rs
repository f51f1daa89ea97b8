//! Pages of backend collections

use crate::domain::types::{PageNumber, PageSize};
use serde::{Deserialize, Serialize};

/// Paginated list body as served by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageEnvelope<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// One fetched slice of a paginated collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    items: Vec<T>,
    total_count: u64,
    current_page: PageNumber,
    page_size: PageSize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: u64, current_page: PageNumber, page_size: PageSize) -> Self {
        Self {
            items,
            total_count,
            current_page,
            page_size,
        }
    }

    /// Nothing loaded yet
    pub fn empty(page_size: PageSize) -> Self {
        Self::new(Vec::new(), 0, PageNumber::first(), page_size)
    }

    /// Build a page from the backend envelope for the requested page
    ///
    /// An empty collection always lands on page 1, whatever was asked for.
    pub fn from_envelope(envelope: PageEnvelope<T>, requested: PageNumber, page_size: PageSize) -> Self {
        let current_page = if envelope.count == 0 {
            PageNumber::first()
        } else {
            requested
        };
        Self::new(envelope.results, envelope.count, current_page, page_size)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn current_page(&self) -> PageNumber {
        self.current_page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// `ceil(total_count / page_size)`; zero for an empty collection
    pub fn total_pages(&self) -> u32 {
        let pages = self
            .total_count
            .div_ceil(u64::from(self.page_size.into_inner()));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Page count as shown to the user: never below 1
    pub fn display_total_pages(&self) -> u32 {
        self.total_pages().max(1)
    }

    pub fn has_next(&self) -> bool {
        self.current_page.into_inner() < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.current_page.into_inner() > 1
    }

    /// "Page X of Y"
    pub fn position_label(&self) -> String {
        format!(
            "Page {} of {}",
            self.current_page,
            self.display_total_pages()
        )
    }

    /// Page numbers to render in pagination controls
    ///
    /// The first and last two pages are always listed, plus two on either
    /// side of the current page. `None` marks an elided run.
    pub fn page_window(&self) -> Vec<Option<u32>> {
        page_window(self.total_pages(), self.current_page.into_inner(), 2, 2, 2, 2)
    }
}

fn page_window(
    total_pages: u32,
    current_page: u32,
    left_edge: u32,
    left_current: u32,
    right_current: u32,
    right_edge: u32,
) -> Vec<Option<u32>> {
    let last_page = total_pages;
    if last_page == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = current_page
        .saturating_add(right_current)
        .saturating_add(1)
        .min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);
    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}
