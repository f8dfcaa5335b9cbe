//! Surveillance observation rows.

use serde::{Deserialize, Serialize};

/// One surveillance observation, immutable once loaded into the store.
///
/// `bed_days` and `icu_required` default to `0.0` when absent in the source
/// file; the derived fields stay optional so averages can skip them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub district: String,
    pub disease_clean: String,
    pub year: i32,
    pub week_of_outbreak: Option<u32>,
    pub month: Option<u32>,
    pub cases: f64,
    pub bed_days: f64,
    pub icu_required: f64,
    pub cases_ma_3w: Option<f64>,
    pub cases_trend_4w: Option<f64>,
    pub cases_lag_1w: Option<f64>,
    pub seasonality_index: Option<f64>,
}

impl Record {
    /// Builds a record carrying only the core counts.
    pub fn observation(
        district: &str,
        disease: &str,
        year: i32,
        week: u32,
        cases: f64,
        bed_days: f64,
        icu_required: f64,
    ) -> Self {
        Record {
            district: district.to_string(),
            disease_clean: disease.to_string(),
            year,
            week_of_outbreak: Some(week),
            cases,
            bed_days,
            icu_required,
            ..Default::default()
        }
    }

    /// Display label for the record's period, e.g. `2020-W7`.
    pub fn period_label(&self) -> String {
        period_label(self.year, self.week_of_outbreak)
    }
}

/// Formats a `year-W{week}` label; a missing week renders as `?`.
pub fn period_label(year: i32, week: Option<u32>) -> String {
    match week {
        Some(w) => format!("{}-W{}", year, w),
        None => format!("{}-W?", year),
    }
}
