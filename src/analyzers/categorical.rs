//! Views grouped by district or disease.

use std::collections::BTreeMap;

use crate::analyzers::types::{
    DistributionStats, LabeledValue, Metric, PeriodTotals, RankedChart, TrendSeries,
};
use crate::analyzers::utility::{mean, median, rank_descending, stddev, top_ranked};
use crate::record::Record;

const UNKNOWN_DISEASE: &str = "Unknown";
const OTHER_BUCKET: &str = "Other";

fn disease_label(r: &Record) -> &str {
    if r.disease_clean.is_empty() {
        UNKNOWN_DISEASE
    } else {
        &r.disease_clean
    }
}

/// Totals per district for the selected metric, top `limit` descending.
///
/// Rows without a district are ignored.
pub fn district_comparison(records: &[Record], metric: Metric, limit: usize) -> RankedChart {
    let mut districts: BTreeMap<&str, PeriodTotals> = BTreeMap::new();

    for r in records.iter().filter(|r| !r.district.is_empty()) {
        districts.entry(r.district.as_str()).or_default().add(r);
    }

    let bars: Vec<LabeledValue> = districts
        .into_iter()
        .map(|(district, totals)| LabeledValue {
            label: district.to_string(),
            value: totals.metric(metric),
        })
        .collect();

    RankedChart {
        metric,
        bars: top_ranked(bars, limit),
    }
}

/// Total cases per disease, top `limit` plus an `Other` bucket for the rest
/// when it is positive.
pub fn disease_distribution(records: &[Record], limit: usize) -> Vec<LabeledValue> {
    let mut diseases: BTreeMap<&str, f64> = BTreeMap::new();

    for r in records {
        *diseases.entry(disease_label(r)).or_default() += r.cases;
    }

    let mut slices: Vec<LabeledValue> = diseases
        .into_iter()
        .map(|(disease, cases)| LabeledValue {
            label: disease.to_string(),
            value: cases,
        })
        .collect();

    rank_descending(&mut slices);

    if slices.len() > limit {
        let other: f64 = slices.drain(limit..).map(|s| s.value).sum();
        if other > 0.0 {
            slices.push(LabeledValue {
                label: OTHER_BUCKET.to_string(),
                value: other,
            });
        }
    }

    slices
}

/// Defined 4-week trend values per disease; diseases without any are omitted.
pub fn trend_distribution(records: &[Record]) -> Vec<TrendSeries> {
    let mut diseases: BTreeMap<&str, Vec<f64>> = BTreeMap::new();

    for r in records {
        let values = diseases.entry(disease_label(r)).or_default();
        if let Some(t) = r.cases_trend_4w {
            values.push(t);
        }
    }

    diseases
        .into_iter()
        .filter_map(|(disease, values)| {
            let avg = mean(&values)?;
            let stats = DistributionStats {
                count: values.len(),
                mean: avg,
                stddev: stddev(&values, avg),
                min: values.iter().copied().fold(f64::INFINITY, f64::min),
                median: median(&values),
                max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            };
            Some(TrendSeries {
                disease: disease.to_string(),
                values,
                stats,
            })
        })
        .collect()
}
