//! Data types produced by the chart views.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AnalyticsError;
use crate::record::Record;

/// The eight chart views offered by the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartView {
    #[default]
    TimeSeries,
    Seasonal,
    DistrictComparison,
    DiseaseDistribution,
    Correlation,
    LagScatter,
    TrendDistribution,
    HealthcareDemand,
}

impl ChartView {
    pub const ALL: [ChartView; 8] = [
        ChartView::TimeSeries,
        ChartView::Seasonal,
        ChartView::DistrictComparison,
        ChartView::DiseaseDistribution,
        ChartView::Correlation,
        ChartView::LagScatter,
        ChartView::TrendDistribution,
        ChartView::HealthcareDemand,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ChartView::TimeSeries => "Time Series Analysis - Cases Over Time",
            ChartView::Seasonal => "Seasonal Pattern Analysis",
            ChartView::DistrictComparison => "District Comparison",
            ChartView::DiseaseDistribution => "Disease Distribution (Total Cases)",
            ChartView::Correlation => "Avg Seasonality Index vs. Avg Trend (by District)",
            ChartView::LagScatter => "Lag Analysis (Cases vs. 1-Week Lag)",
            ChartView::TrendDistribution => "Trend Distribution by Disease",
            ChartView::HealthcareDemand => "Healthcare Demand",
        }
    }

    /// Whether the view reacts to the selected [`Metric`].
    pub fn uses_metric(&self) -> bool {
        matches!(
            self,
            ChartView::DistrictComparison | ChartView::HealthcareDemand
        )
    }
}

impl FromStr for ChartView {
    type Err = AnalyticsError;

    /// Accepts the snake_case names as well as the dashboard's short ids
    /// (`district_bar`, `disease_pie`, `trend_box`, `healthcare`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "time_series" => Ok(ChartView::TimeSeries),
            "seasonal" => Ok(ChartView::Seasonal),
            "district_bar" | "district_comparison" => Ok(ChartView::DistrictComparison),
            "disease_pie" | "disease_distribution" => Ok(ChartView::DiseaseDistribution),
            "correlation" => Ok(ChartView::Correlation),
            "lag_scatter" => Ok(ChartView::LagScatter),
            "trend_box" | "trend_distribution" => Ok(ChartView::TrendDistribution),
            "healthcare" | "healthcare_demand" => Ok(ChartView::HealthcareDemand),
            other => Err(AnalyticsError::InvalidSelection(format!(
                "unknown chart view '{other}'"
            ))),
        }
    }
}

/// Numeric field selected for ranking or as a primary series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    Cases,
    BedDays,
    IcuRequired,
    CasesMa3w,
    CasesTrend4w,
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Cases => "Cases",
            Metric::BedDays => "Bed Days",
            Metric::IcuRequired => "ICU Required",
            Metric::CasesMa3w => "Cases MA 3w",
            Metric::CasesTrend4w => "Cases trend 4w",
        }
    }

    /// Whether the metric is a plain count that timeline frames carry.
    pub fn is_count(&self) -> bool {
        matches!(self, Metric::Cases | Metric::BedDays | Metric::IcuRequired)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Metric {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "cases" => Ok(Metric::Cases),
            "bed_days" | "beds" => Ok(Metric::BedDays),
            "icu_required" | "icu" => Ok(Metric::IcuRequired),
            "cases_ma_3w" | "ma" => Ok(Metric::CasesMa3w),
            "cases_trend_4w" | "trend" => Ok(Metric::CasesTrend4w),
            other => Err(AnalyticsError::InvalidSelection(format!(
                "unknown metric '{other}'"
            ))),
        }
    }
}

/// Cutoffs applied by the views and by timeline ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartLimits {
    /// Time series longer than this are downsampled.
    pub max_points: usize,
    pub top_districts: usize,
    pub top_diseases: usize,
    /// Districts shown per timeline frame.
    pub timeline_top: usize,
}

impl Default for ChartLimits {
    fn default() -> Self {
        Self {
            max_points: 500,
            top_districts: 30,
            top_diseases: 10,
            timeline_top: 15,
        }
    }
}

/// Running totals for one temporal group.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeriodTotals {
    pub year: i32,
    pub week: Option<u32>,
    pub label: String,
    pub cases: f64,
    pub bed_days: f64,
    pub icu_required: f64,
    pub ma_sum: f64,
    pub trend_sum: f64,
    pub count: usize,
}

impl PeriodTotals {
    pub(crate) fn add(&mut self, r: &Record) {
        self.cases += r.cases;
        self.bed_days += r.bed_days;
        self.icu_required += r.icu_required;
        self.ma_sum += r.cases_ma_3w.unwrap_or(0.0);
        self.trend_sum += r.cases_trend_4w.unwrap_or(0.0);
        self.count += 1;
    }

    pub fn ma_mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.ma_sum / self.count as f64
        }
    }

    pub fn trend_mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.trend_sum / self.count as f64
        }
    }

    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Cases => self.cases,
            Metric::BedDays => self.bed_days,
            Metric::IcuRequired => self.icu_required,
            Metric::CasesMa3w => self.ma_mean(),
            Metric::CasesTrend4w => self.trend_mean(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub label: String,
    pub year: i32,
    pub week: Option<u32>,
    pub cases: f64,
    pub ma_mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesChart {
    /// Number of periods before downsampling.
    pub total_periods: usize,
    pub step: usize,
    pub points: Vec<TimeSeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalPoint {
    pub week: u32,
    pub avg_cases: f64,
    /// `None` when no row of that week carries a seasonality index.
    pub avg_seasonality: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledValue {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedChart {
    pub metric: Metric,
    pub bars: Vec<LabeledValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationPoint {
    pub district: String,
    pub avg_seasonality: f64,
    pub avg_trend: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LagPoint {
    pub lag: f64,
    pub cases: f64,
    pub label: String,
}

/// Least-squares line `y = slope * x + intercept`, with its drawn endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub start: (f64, f64),
    pub end: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LagChart {
    pub points: Vec<LagPoint>,
    pub fit: Option<LinearFit>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionStats {
    pub count: usize,
    pub mean: f64,
    pub stddev: f64,
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub disease: String,
    pub values: Vec<f64>,
    pub stats: DistributionStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthcareChart {
    pub metric: Metric,
    pub labels: Vec<String>,
    pub primary: Series,
    /// Bed days on a secondary axis, only when the metric is cases.
    pub secondary: Option<Series>,
}

/// Chart-ready output of one view, consumed by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", content = "data", rename_all = "snake_case")]
pub enum ChartData {
    TimeSeries(TimeSeriesChart),
    Seasonal(Vec<SeasonalPoint>),
    DistrictComparison(RankedChart),
    DiseaseDistribution(Vec<LabeledValue>),
    Correlation(Vec<CorrelationPoint>),
    LagScatter(LagChart),
    TrendDistribution(Vec<TrendSeries>),
    HealthcareDemand(HealthcareChart),
}

impl ChartData {
    pub fn view(&self) -> ChartView {
        match self {
            ChartData::TimeSeries(_) => ChartView::TimeSeries,
            ChartData::Seasonal(_) => ChartView::Seasonal,
            ChartData::DistrictComparison(_) => ChartView::DistrictComparison,
            ChartData::DiseaseDistribution(_) => ChartView::DiseaseDistribution,
            ChartData::Correlation(_) => ChartView::Correlation,
            ChartData::LagScatter(_) => ChartView::LagScatter,
            ChartData::TrendDistribution(_) => ChartView::TrendDistribution,
            ChartData::HealthcareDemand(_) => ChartView::HealthcareDemand,
        }
    }

    /// True when the view has nothing to draw.
    pub fn is_empty(&self) -> bool {
        match self {
            ChartData::TimeSeries(c) => c.points.is_empty(),
            ChartData::Seasonal(p) => p.is_empty(),
            ChartData::DistrictComparison(c) => c.bars.is_empty(),
            ChartData::DiseaseDistribution(v) => v.is_empty(),
            ChartData::Correlation(p) => p.is_empty(),
            ChartData::LagScatter(c) => c.points.is_empty(),
            ChartData::TrendDistribution(s) => s.is_empty(),
            ChartData::HealthcareDemand(c) => c.labels.is_empty(),
        }
    }
}
