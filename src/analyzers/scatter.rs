//! Scatter views: seasonality vs. trend per district, and lag-1 regression.

use std::collections::BTreeMap;

use crate::analyzers::types::{CorrelationPoint, LagChart, LagPoint, LinearFit};
use crate::analyzers::utility::mean;
use crate::record::Record;

/// One point per district: mean seasonality index against mean 4-week trend.
///
/// Districts lacking either series are left out.
pub fn correlation(records: &[Record]) -> Vec<CorrelationPoint> {
    let mut districts: BTreeMap<&str, (Vec<f64>, Vec<f64>)> = BTreeMap::new();

    for r in records.iter().filter(|r| !r.district.is_empty()) {
        let entry = districts.entry(r.district.as_str()).or_default();
        if let Some(s) = r.seasonality_index {
            entry.0.push(s);
        }
        if let Some(t) = r.cases_trend_4w {
            entry.1.push(t);
        }
    }

    districts
        .into_iter()
        .filter_map(|(district, (seasonality, trend))| {
            Some(CorrelationPoint {
                district: district.to_string(),
                avg_seasonality: mean(&seasonality)?,
                avg_trend: mean(&trend)?,
            })
        })
        .collect()
}

/// Closed-form least-squares fit over paired samples.
///
/// Returns `None` with fewer than two points or when every `x` is equal.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> Option<LinearFit> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }

    let (mut sx, mut sy, mut sxy, mut sxx) = (0.0_f64, 0.0_f64, 0.0_f64, 0.0_f64);
    for (&x, &y) in xs.iter().zip(ys) {
        sx += x;
        sy += y;
        sxy += x * y;
        sxx += x * x;
    }

    let n = n as f64;
    let denom = n * sxx - sx * sx;
    if denom == 0.0 {
        return None;
    }

    let slope = (n * sxy - sx * sy) / denom;
    let intercept = (sy - slope * sx) / n;

    let min_x = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let max_x = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(LinearFit {
        slope,
        intercept,
        start: (min_x, slope * min_x + intercept),
        end: (max_x, slope * max_x + intercept),
    })
}

/// Cases against last week's cases for every row carrying a lag value.
pub fn lag_scatter(records: &[Record]) -> LagChart {
    let points: Vec<LagPoint> = records
        .iter()
        .filter_map(|r| {
            r.cases_lag_1w.map(|lag| LagPoint {
                lag,
                cases: r.cases,
                label: format!("{} {}", r.district, r.period_label()),
            })
        })
        .collect();

    let xs: Vec<f64> = points.iter().map(|p| p.lag).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.cases).collect();
    let fit = linear_fit(&xs, &ys);

    LagChart { points, fit }
}
