use serde::Serialize;
use std::collections::HashSet;

use crate::record::Record;

/// Headline figures for the current selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub records: usize,
    pub total_cases: f64,
    pub total_bed_days: f64,
    pub total_icu: f64,
    pub districts: usize,
    pub diseases: usize,
    /// Missing trends count as zero, averaged over every row.
    pub avg_trend: f64,
    pub year_range: Option<(i32, i32)>,
}

impl SummaryStats {
    pub fn from_records(records: &[Record]) -> Self {
        let mut s = SummaryStats {
            records: records.len(),
            ..Default::default()
        };

        let mut districts = HashSet::new();
        let mut diseases = HashSet::new();
        let mut trend_sum = 0.0;

        for r in records {
            s.total_cases += r.cases;
            s.total_bed_days += r.bed_days;
            s.total_icu += r.icu_required;
            trend_sum += r.cases_trend_4w.unwrap_or(0.0);
            districts.insert(r.district.as_str());
            diseases.insert(r.disease_clean.as_str());

            if r.year != 0 {
                s.year_range = Some(match s.year_range {
                    None => (r.year, r.year),
                    Some((lo, hi)) => (lo.min(r.year), hi.max(r.year)),
                });
            }
        }

        s.districts = districts.len();
        s.diseases = diseases.len();
        if !records.is_empty() {
            s.avg_trend = trend_sum / records.len() as f64;
        }

        s
    }
}
