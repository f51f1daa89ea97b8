//! Dashboard sales history and forecast

use serde::{Deserialize, Serialize};

/// Monthly sales total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesPoint {
    pub date: String,
    pub month: String,
    pub year: i32,
    pub total_sales: f64,
}

impl SalesPoint {
    /// Short chart label such as `"Jan 2024"`
    pub fn label(&self) -> String {
        let month: String = self.month.chars().take(3).collect();
        format!("{month} {}", self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesPrediction {
    pub prediction_period: String,
    pub predicted_sales_bob: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(default)]
    pub historical: Vec<SalesPoint>,
    #[serde(default)]
    pub prediction: Option<SalesPrediction>,
}

impl DashboardSummary {
    pub fn is_empty(&self) -> bool {
        self.historical.is_empty() && self.prediction.is_none()
    }
}
