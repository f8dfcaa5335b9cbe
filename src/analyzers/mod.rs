//! Chart aggregation over the filtered record set.
//!
//! Every view follows the same shape: group rows by a temporal or
//! categorical key, reduce the numeric fields, order the groups, then
//! optionally downsample or keep the top entries. All functions are pure.

pub mod categorical;
pub mod scatter;
pub mod summary;
pub mod temporal;
pub mod types;
pub mod utility;

use crate::record::Record;
use types::{ChartData, ChartLimits, ChartView, Metric};

/// Computes one chart view. `metric` only affects the views for which
/// [`ChartView::uses_metric`] is true.
pub fn build_chart(
    view: ChartView,
    metric: Metric,
    records: &[Record],
    limits: &ChartLimits,
) -> ChartData {
    match view {
        ChartView::TimeSeries => {
            ChartData::TimeSeries(temporal::time_series(records, limits.max_points))
        }
        ChartView::Seasonal => ChartData::Seasonal(temporal::seasonal_pattern(records)),
        ChartView::DistrictComparison => ChartData::DistrictComparison(
            categorical::district_comparison(records, metric, limits.top_districts),
        ),
        ChartView::DiseaseDistribution => ChartData::DiseaseDistribution(
            categorical::disease_distribution(records, limits.top_diseases),
        ),
        ChartView::Correlation => ChartData::Correlation(scatter::correlation(records)),
        ChartView::LagScatter => ChartData::LagScatter(scatter::lag_scatter(records)),
        ChartView::TrendDistribution => {
            ChartData::TrendDistribution(categorical::trend_distribution(records))
        }
        ChartView::HealthcareDemand => {
            ChartData::HealthcareDemand(temporal::healthcare_demand(records, metric))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_view_is_empty_for_no_rows() {
        let limits = ChartLimits::default();
        for view in ChartView::ALL {
            let chart = build_chart(view, Metric::Cases, &[], &limits);
            assert!(chart.is_empty(), "{:?} should be empty", view);
            assert_eq!(chart.view(), view);
        }
    }

    #[test]
    fn test_views_are_order_independent() {
        let mut rows = Vec::new();
        for (i, district) in ["A", "B", "C"].iter().enumerate() {
            for week in 1..=4u32 {
                let mut r = Record::observation(
                    district,
                    if week % 2 == 0 { "Dengue" } else { "Malaria" },
                    2020 + (week as i32 % 2),
                    week,
                    (i as f64 + 1.0) * week as f64,
                    week as f64,
                    1.0,
                );
                r.seasonality_index = Some(week as f64 / 2.0);
                r.cases_trend_4w = Some(i as f64);
                rows.push(r);
            }
        }
        let mut shuffled = rows.clone();
        shuffled.reverse();
        shuffled.swap(0, 5);

        let limits = ChartLimits::default();
        for view in ChartView::ALL {
            if view == ChartView::LagScatter || view == ChartView::TrendDistribution {
                continue;
            }
            for metric in [Metric::Cases, Metric::BedDays] {
                assert_eq!(
                    build_chart(view, metric, &rows, &limits),
                    build_chart(view, metric, &shuffled, &limits),
                    "{:?} depends on row order",
                    view
                );
            }
        }
    }
}
