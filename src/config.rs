use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::analyzers::types::ChartLimits;
use crate::error::Result;

pub const DEFAULT_PREDICTION_BASE_URL: &str = "http://localhost:5000";
pub const PREDICTION_BASE_URL_VAR: &str = "PREDICTION_BASE_URL";

/// Dashboard settings.
///
/// Stored as a JSON object on disk; every field is optional:
/// ```json
/// {
///   "prediction_base_url": "http://forecast.internal:5000",
///   "request_timeout_secs": 60,
///   "limits": { "max_points": 300, "timeline_top": 10 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub prediction_base_url: String,
    pub request_timeout_secs: u64,
    pub limits: ChartLimits,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            prediction_base_url: DEFAULT_PREDICTION_BASE_URL.to_string(),
            request_timeout_secs: 30,
            limits: ChartLimits::default(),
        }
    }
}

impl DashboardConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// File settings when `path` is given, defaults otherwise, with
    /// `PREDICTION_BASE_URL` taking precedence over both.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        Ok(config.with_base_url_override(std::env::var(PREDICTION_BASE_URL_VAR).ok()))
    }

    fn with_base_url_override(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.prediction_base_url = url.trim().to_string();
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
