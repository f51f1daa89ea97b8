//! Domain types for the sales console
//!
//! Validated values, backend resources and the records they serve.

pub mod dashboard;
pub mod records;
pub mod resource;
pub mod types;

pub use dashboard::{DashboardSummary, SalesPoint, SalesPrediction};
pub use records::{Brand, Customer, Product, Sale};
pub use resource::{ExportFormat, FilterField, Resource};
