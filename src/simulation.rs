//! Capacity projection under compound weekly growth.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analyzers::utility::mean;
use crate::error::{AnalyticsError, Result};
use crate::record::Record;

/// Inputs chosen by the analyst for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub available_beds: u32,
    pub icu_capacity: u32,
    pub growth_rate_percent: f64,
    pub weeks_to_simulate: u32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            available_beds: 0,
            icu_capacity: 0,
            growth_rate_percent: 0.0,
            weeks_to_simulate: 12,
        }
    }
}

/// Historical averages the projection starts from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Baseline {
    pub avg_cases: f64,
    pub avg_bed_days: f64,
    pub avg_icu: f64,
}

impl Baseline {
    /// Arithmetic means over `history`; `None` when it is empty.
    pub fn from_records(history: &[Record]) -> Option<Self> {
        let cases: Vec<f64> = history.iter().map(|r| r.cases).collect();
        let bed_days: Vec<f64> = history.iter().map(|r| r.bed_days).collect();
        let icu: Vec<f64> = history.iter().map(|r| r.icu_required).collect();

        Some(Baseline {
            avg_cases: mean(&cases)?,
            avg_bed_days: mean(&bed_days)?,
            avg_icu: mean(&icu)?,
        })
    }

    /// Bed days per case. The denominator floors at one case so a zero-case
    /// history yields the raw average instead of a division by zero.
    pub fn bed_days_per_case(&self) -> f64 {
        self.avg_bed_days / self.avg_cases.max(1.0)
    }

    /// ICU admissions per case, floored the same way as [`Self::bed_days_per_case`].
    pub fn icu_ratio(&self) -> f64 {
        self.avg_icu / self.avg_cases.max(1.0)
    }
}

/// Projected demand for one future week. Values are unrounded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekProjection {
    pub week: u32,
    pub cases: f64,
    pub bed_days: f64,
    pub icu_required: f64,
    /// Infinite or NaN when the bed capacity is zero.
    pub bed_utilization_pct: f64,
    /// Infinite or NaN when the ICU capacity is zero.
    pub icu_utilization_pct: f64,
}

/// Outcome of one simulation run; a new run replaces it entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResult {
    pub district: String,
    pub disease: String,
    pub parameters: SimulationParams,
    pub baseline: Baseline,
    pub weeks: Vec<WeekProjection>,
}

impl SimulationResult {
    /// First week whose bed demand exceeds capacity.
    pub fn bed_critical_week(&self) -> Option<u32> {
        first_breach(&self.weeks, |w| w.bed_utilization_pct)
    }

    /// First week whose ICU demand exceeds capacity.
    pub fn icu_critical_week(&self) -> Option<u32> {
        first_breach(&self.weeks, |w| w.icu_utilization_pct)
    }
}

/// First week whose selected utilization is strictly above 100%.
///
/// NaN utilization (zero demand on zero capacity) never counts as a breach.
pub fn first_breach<F>(weeks: &[WeekProjection], utilization: F) -> Option<u32>
where
    F: Fn(&WeekProjection) -> f64,
{
    weeks.iter().find(|w| utilization(w) > 100.0).map(|w| w.week)
}

fn utilization_pct(projected: f64, capacity: u32) -> f64 {
    projected / capacity as f64 * 100.0
}

/// Compounds `baseline.avg_cases` week over week and derives bed and ICU
/// demand from the baseline ratios.
pub fn project(baseline: &Baseline, params: &SimulationParams) -> Vec<WeekProjection> {
    let growth = 1.0 + params.growth_rate_percent / 100.0;
    let bed_days_per_case = baseline.bed_days_per_case();
    let icu_ratio = baseline.icu_ratio();

    let mut cases = baseline.avg_cases;
    (1..=params.weeks_to_simulate)
        .map(|week| {
            cases *= growth;
            let bed_days = cases * bed_days_per_case;
            let icu_required = cases * icu_ratio;
            WeekProjection {
                week,
                cases,
                bed_days,
                icu_required,
                bed_utilization_pct: utilization_pct(bed_days, params.available_beds),
                icu_utilization_pct: utilization_pct(icu_required, params.icu_capacity),
            }
        })
        .collect()
}

/// Runs a projection from the given history.
///
/// # Errors
///
/// Returns [`AnalyticsError::InsufficientData`] when `history` is empty.
pub fn simulate(
    district: &str,
    disease: &str,
    history: &[Record],
    params: &SimulationParams,
) -> Result<SimulationResult> {
    let baseline = Baseline::from_records(history).ok_or_else(|| {
        AnalyticsError::insufficient(format!(
            "no historical data found for {district} / {disease}"
        ))
    })?;

    debug!(
        avg_cases = baseline.avg_cases,
        avg_bed_days = baseline.avg_bed_days,
        avg_icu = baseline.avg_icu,
        "Baseline computed"
    );

    let weeks = project(&baseline, params);
    let result = SimulationResult {
        district: district.to_string(),
        disease: disease.to_string(),
        parameters: params.clone(),
        baseline,
        weeks,
    };

    info!(
        district,
        disease,
        weeks = params.weeks_to_simulate,
        bed_critical_week = result.bed_critical_week(),
        icu_critical_week = result.icu_critical_week(),
        "Simulation finished"
    );

    Ok(result)
}

/// Selects the district and disease history from the full dataset, then
/// runs [`simulate`] on it.
pub fn simulate_for(
    records: &[Record],
    district: &str,
    disease: &str,
    params: &SimulationParams,
) -> Result<SimulationResult> {
    let history: Vec<Record> = records
        .iter()
        .filter(|r| r.district == district && r.disease_clean == disease)
        .cloned()
        .collect();
    simulate(district, disease, &history, params)
}
