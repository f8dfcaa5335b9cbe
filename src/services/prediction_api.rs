//! Trait and types for the external forecasting service.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::Result;

/// Short-horizon forecast for one disease/district pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Horizon labels, e.g. `Week +1`.
    pub labels: Vec<String>,
    pub forecast: Vec<f64>,
    #[serde(default)]
    pub historical_average: Option<f64>,
    #[serde(default)]
    pub data_points_used: Option<u64>,
}

/// Model comparison run by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// One row per model; columns are whatever metrics the service reports.
    pub comparison_table: Vec<Map<String, Value>>,
    /// Predicted series per model name, plus `Actual`.
    pub plot_data: BTreeMap<String, Vec<f64>>,
}

impl Comparison {
    /// Model names in the order the table lists them.
    pub fn models(&self) -> Vec<&str> {
        self.comparison_table
            .iter()
            .filter_map(|row| row.get("Model").and_then(Value::as_str))
            .collect()
    }
}

/// Abstraction over the prediction service so the dashboard can be
/// exercised without a network.
#[async_trait::async_trait]
pub trait PredictionApi: Send + Sync {
    async fn predict(&self, disease: &str, district: &str) -> Result<Forecast>;

    async fn run_comparison(&self) -> Result<Comparison>;
}
