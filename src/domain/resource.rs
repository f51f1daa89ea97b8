//! Backend resources and their query contracts

use crate::domain::types::PageSize;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Query parameter carrying the one-based page index
pub const PAGE_PARAM: &str = "page";

/// Query parameter carrying the export format
pub const FORMAT_PARAM: &str = "format";

/// Named filter fields understood by the backend list and export endpoints
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    #[display("client_search")]
    ClientSearch,
    #[display("product_search")]
    ProductSearch,
    #[serde(rename = "fecha_inicio")]
    #[display("fecha_inicio")]
    DateFrom,
    #[serde(rename = "fecha_fin")]
    #[display("fecha_fin")]
    DateTo,
    #[serde(rename = "monto_min")]
    #[display("monto_min")]
    AmountMin,
    #[serde(rename = "monto_max")]
    #[display("monto_max")]
    AmountMax,
}

impl FilterField {
    pub const ALL: [FilterField; 6] = [
        FilterField::ClientSearch,
        FilterField::ProductSearch,
        FilterField::DateFrom,
        FilterField::DateTo,
        FilterField::AmountMin,
        FilterField::AmountMax,
    ];

    /// Query parameter name sent to the backend
    pub fn param(self) -> &'static str {
        match self {
            FilterField::ClientSearch => "client_search",
            FilterField::ProductSearch => "product_search",
            FilterField::DateFrom => "fecha_inicio",
            FilterField::DateTo => "fecha_fin",
            FilterField::AmountMin => "monto_min",
            FilterField::AmountMax => "monto_max",
        }
    }
}

impl FromStr for FilterField {
    type Err = UnknownFilterField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterField::ALL
            .into_iter()
            .find(|field| field.param() == s)
            .ok_or_else(|| UnknownFilterField(s.to_string()))
    }
}

/// A filter name that no resource accepts
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown filter field: {0}")]
pub struct UnknownFilterField(pub String);

/// Format of a backend-generated report artifact
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[display("csv")]
    Csv,
    #[display("pdf")]
    Pdf,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Csv, ExportFormat::Pdf];

    /// File extension and `format` query value
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = UnknownExportFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExportFormat::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownExportFormat(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported export format: {0}")]
pub struct UnknownExportFormat(pub String);

/// Collections and endpoints served by the backend of record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Resource {
    #[display("brands")]
    Brands,
    #[display("products")]
    Products,
    #[display("sales")]
    Sales,
    #[display("customers")]
    Customers,
    #[display("dashboard")]
    Dashboard,
    #[display("report-export")]
    ReportExport,
}

impl Resource {
    /// Path of the collection endpoint, relative to the backend base URL
    pub fn path(self) -> &'static str {
        match self {
            Resource::Brands => "catalog/brands/",
            Resource::Products => "catalog/products/",
            Resource::Sales => "sales/",
            Resource::Customers => "customers/",
            Resource::Dashboard => "reports/dashboard/",
            Resource::ReportExport => "reports/export/",
        }
    }

    /// Path of a single record within the collection
    pub fn item_path(self, id: &str) -> String {
        format!("{}{id}/", self.path())
    }

    /// Records per page as served by the backend, for paginated resources
    pub fn page_size(self) -> Option<PageSize> {
        let size = match self {
            Resource::Sales | Resource::Brands | Resource::Products => 10,
            Resource::Customers => 25,
            Resource::Dashboard | Resource::ReportExport => return None,
        };
        PageSize::try_new(size).ok()
    }

    /// Whether the endpoint accepts the given filter field
    pub fn accepts(self, field: FilterField) -> bool {
        match self {
            Resource::Sales | Resource::ReportExport => true,
            Resource::Customers => field == FilterField::ClientSearch,
            Resource::Products => field == FilterField::ProductSearch,
            Resource::Brands | Resource::Dashboard => false,
        }
    }
}
