//! Views grouped by period: time series, seasonal pattern, healthcare demand.

use std::collections::BTreeMap;

use crate::analyzers::types::{
    HealthcareChart, Metric, PeriodTotals, SeasonalPoint, Series, TimeSeriesChart,
    TimeSeriesPoint,
};
use crate::analyzers::utility::{downsample_step, mean, mean_defined};
use crate::record::{Record, period_label};

/// Groups records by `(year, week)` and returns the groups in period order.
///
/// A missing week keys its own group and sorts before week 1.
pub fn group_by_period(records: &[Record]) -> Vec<PeriodTotals> {
    let mut groups: BTreeMap<(i32, Option<u32>), PeriodTotals> = BTreeMap::new();

    for r in records {
        groups
            .entry((r.year, r.week_of_outbreak))
            .or_insert_with(|| PeriodTotals {
                year: r.year,
                week: r.week_of_outbreak,
                label: period_label(r.year, r.week_of_outbreak),
                ..Default::default()
            })
            .add(r);
    }

    groups.into_values().collect()
}

/// Cases and mean 3-week moving average per period, downsampled to at most
/// `max_points` points.
pub fn time_series(records: &[Record], max_points: usize) -> TimeSeriesChart {
    let periods = group_by_period(records);
    let step = downsample_step(periods.len(), max_points);

    let points = periods
        .iter()
        .enumerate()
        .filter(|(i, _)| i % step == 0)
        .map(|(_, p)| TimeSeriesPoint {
            label: p.label.clone(),
            year: p.year,
            week: p.week,
            cases: p.cases,
            ma_mean: p.ma_mean(),
        })
        .collect();

    TimeSeriesChart {
        total_periods: periods.len(),
        step,
        points,
    }
}

/// Mean cases and mean seasonality index per week of outbreak, across years.
pub fn seasonal_pattern(records: &[Record]) -> Vec<SeasonalPoint> {
    let mut weeks: BTreeMap<u32, (Vec<f64>, Vec<Option<f64>>)> = BTreeMap::new();

    for r in records {
        let Some(week) = r.week_of_outbreak else {
            continue;
        };
        let entry = weeks.entry(week).or_default();
        entry.0.push(r.cases);
        entry.1.push(r.seasonality_index);
    }

    weeks
        .into_iter()
        .map(|(week, (cases, seasonality))| SeasonalPoint {
            week,
            avg_cases: mean(&cases).unwrap_or(0.0),
            avg_seasonality: mean_defined(seasonality),
        })
        .collect()
}

fn healthcare_series_name(metric: Metric) -> &'static str {
    match metric {
        Metric::Cases => "Total Cases",
        Metric::BedDays => "Total Bed Days",
        Metric::IcuRequired => "Total ICU Required",
        Metric::CasesMa3w => "Avg 3-Week MA",
        Metric::CasesTrend4w => "Avg 4-Week Trend",
    }
}

/// Per-period demand for the selected metric; cases also carry bed days as a
/// secondary series.
pub fn healthcare_demand(records: &[Record], metric: Metric) -> HealthcareChart {
    let periods = group_by_period(records);

    let labels = periods.iter().map(|p| p.label.clone()).collect();
    let primary = Series {
        name: healthcare_series_name(metric).to_string(),
        values: periods.iter().map(|p| p.metric(metric)).collect(),
    };
    let secondary = (metric == Metric::Cases).then(|| Series {
        name: "Bed Days".to_string(),
        values: periods.iter().map(|p| p.bed_days).collect(),
    });

    HealthcareChart {
        metric,
        labels,
        primary,
        secondary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(year: i32, week: u32, cases: f64) -> Record {
        Record::observation("A", "D", year, week, cases, cases / 2.0, 0.0)
    }

    #[test]
    fn test_two_rows_same_period_sum_into_one_group() {
        let records = vec![
            Record::observation("A", "D", 2020, 1, 10.0, 5.0, 1.0),
            Record::observation("A", "D", 2020, 1, 5.0, 2.0, 0.0),
        ];
        let groups = group_by_period(&records);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, "2020-W1");
        assert_eq!(groups[0].cases, 15.0);
        assert_eq!(groups[0].bed_days, 7.0);
        assert_eq!(groups[0].icu_required, 1.0);
    }

    #[test]
    fn test_periods_sorted_by_year_then_week() {
        let records = vec![row(2021, 2, 1.0), row(2020, 10, 1.0), row(2021, 1, 1.0), row(2020, 2, 1.0)];
        let labels: Vec<String> = group_by_period(&records).into_iter().map(|g| g.label).collect();
        assert_eq!(labels, vec!["2020-W2", "2020-W10", "2021-W1", "2021-W2"]);
    }

    #[test]
    fn test_missing_week_sorts_first_within_year() {
        let mut undated = row(2020, 1, 3.0);
        undated.week_of_outbreak = None;
        let records = vec![row(2020, 1, 1.0), undated];
        let groups = group_by_period(&records);
        assert_eq!(groups[0].week, None);
        assert_eq!(groups[1].week, Some(1));
    }

    #[test]
    fn test_time_series_ma_mean_counts_missing_as_zero() {
        let mut a = row(2020, 1, 4.0);
        a.cases_ma_3w = Some(8.0);
        let b = row(2020, 1, 2.0);
        let chart = time_series(&[a, b], 500);
        assert_eq!(chart.points.len(), 1);
        assert_eq!(chart.points[0].cases, 6.0);
        assert_eq!(chart.points[0].ma_mean, 4.0);
    }

    #[test]
    fn test_time_series_downsamples_long_series() {
        let records: Vec<Record> = (1..=12).map(|w| row(2020, w, w as f64)).collect();
        let chart = time_series(&records, 5);
        assert_eq!(chart.total_periods, 12);
        assert_eq!(chart.step, 3);
        let weeks: Vec<Option<u32>> = chart.points.iter().map(|p| p.week).collect();
        assert_eq!(weeks, vec![Some(1), Some(4), Some(7), Some(10)]);
    }

    #[test]
    fn test_seasonal_skips_missing_seasonality() {
        let mut a = row(2020, 5, 10.0);
        a.seasonality_index = Some(1.5);
        let b = row(2021, 5, 20.0);
        let c = row(2021, 6, 4.0);
        let points = seasonal_pattern(&[a, b, c]);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].week, 5);
        assert_eq!(points[0].avg_cases, 15.0);
        assert_eq!(points[0].avg_seasonality, Some(1.5));
        assert_eq!(points[1].avg_seasonality, None);
    }

    #[test]
    fn test_healthcare_secondary_only_for_cases() {
        let records = vec![row(2020, 1, 4.0), row(2020, 2, 6.0)];
        let chart = healthcare_demand(&records, Metric::Cases);
        assert_eq!(chart.primary.values, vec![4.0, 6.0]);
        assert_eq!(chart.secondary.as_ref().unwrap().values, vec![2.0, 3.0]);

        let chart = healthcare_demand(&records, Metric::BedDays);
        assert_eq!(chart.primary.name, "Total Bed Days");
        assert!(chart.secondary.is_none());
    }

    #[test]
    fn test_group_sums_independent_of_row_order() {
        let records = vec![row(2020, 1, 1.0), row(2020, 2, 2.0), row(2020, 1, 3.0), row(2021, 1, 4.0)];
        let mut reversed = records.clone();
        reversed.reverse();
        assert_eq!(group_by_period(&records), group_by_period(&reversed));
    }
}
