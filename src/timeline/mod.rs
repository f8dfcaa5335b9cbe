//! Per-period, per-district snapshots for the outbreak animation.
//!
//! [`build_sequence`] turns records into ordered [`TimelineFrame`]s;
//! [`Playback`] walks a cursor over them on a timer.

mod playback;

pub use playback::{ChannelSink, FrameSink, Playback, PlaybackEvent};

use serde::Serialize;
use std::collections::BTreeMap;

use crate::analyzers::types::{LabeledValue, Metric};
use crate::analyzers::utility::top_ranked;
use crate::filter::Selection;
use crate::record::{Record, period_label};

/// Counts summed for one district within a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DistrictTotals {
    pub cases: f64,
    pub bed_days: f64,
    pub icu_required: f64,
}

impl DistrictTotals {
    /// Value for a count metric; derived metrics fall back to cases.
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::BedDays => self.bed_days,
            Metric::IcuRequired => self.icu_required,
            _ => self.cases,
        }
    }
}

/// One `(year, week)` snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineFrame {
    pub year: i32,
    pub week: Option<u32>,
    pub label: String,
    pub districts: BTreeMap<String, DistrictTotals>,
}

impl TimelineFrame {
    /// Districts ordered by `metric` descending, ties by name, top `limit`.
    pub fn ranked(&self, metric: Metric, limit: usize) -> Vec<LabeledValue> {
        let values: Vec<LabeledValue> = self
            .districts
            .iter()
            .map(|(district, totals)| LabeledValue {
                label: district.clone(),
                value: totals.metric(metric),
            })
            .collect();
        top_ranked(values, limit)
    }
}

/// What a sink receives on every playback tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedFrame {
    /// Zero-based position in the sequence.
    pub index: usize,
    pub total: usize,
    pub label: String,
    pub metric: Metric,
    pub districts: Vec<LabeledValue>,
}

impl RankedFrame {
    /// Share of the sequence shown so far, in percent.
    pub fn progress_pct(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.index + 1) as f64 / self.total as f64 * 100.0
        }
    }
}

/// Groups records into frames ordered by `(year, week)`, each summing
/// counts per district.
pub fn build_sequence(records: &[Record], disease: &Selection<String>) -> Vec<TimelineFrame> {
    let mut frames: BTreeMap<(i32, Option<u32>), TimelineFrame> = BTreeMap::new();

    for r in records.iter().filter(|r| disease.matches(&r.disease_clean)) {
        let frame = frames
            .entry((r.year, r.week_of_outbreak))
            .or_insert_with(|| TimelineFrame {
                year: r.year,
                week: r.week_of_outbreak,
                label: period_label(r.year, r.week_of_outbreak),
                districts: BTreeMap::new(),
            });

        let totals = frame.districts.entry(r.district.clone()).or_default();
        totals.cases += r.cases;
        totals.bed_days += r.bed_days;
        totals.icu_required += r.icu_required;
    }

    frames.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(district: &str, disease: &str, year: i32, week: u32, cases: f64) -> Record {
        Record::observation(district, disease, year, week, cases, cases * 2.0, 1.0)
    }

    #[test]
    fn test_frames_strictly_ascending_across_years() {
        let records = vec![
            row("A", "D", 2022, 3, 1.0),
            row("B", "D", 2021, 52, 1.0),
            row("A", "D", 2021, 1, 1.0),
            row("C", "D", 2022, 1, 1.0),
            row("A", "D", 2022, 3, 2.0),
            row("B", "D", 2021, 1, 4.0),
        ];
        let frames = build_sequence(&records, &Selection::All);
        let keys: Vec<(i32, Option<u32>)> = frames.iter().map(|f| (f.year, f.week)).collect();
        assert_eq!(
            keys,
            vec![(2021, Some(1)), (2021, Some(52)), (2022, Some(1)), (2022, Some(3))]
        );
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(frames[0].districts.len(), 2);
        assert_eq!(frames[3].districts["A"].cases, 3.0);
        assert_eq!(frames[3].districts["A"].bed_days, 6.0);
        assert_eq!(frames[3].districts["A"].icu_required, 2.0);
    }

    #[test]
    fn test_disease_filter() {
        let records = vec![row("A", "Dengue", 2021, 1, 1.0), row("A", "Malaria", 2021, 2, 1.0)];
        let frames = build_sequence(&records, &Selection::Only("Malaria".to_string()));
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].label, "2021-W2");
    }

    #[test]
    fn test_sequence_independent_of_input_order() {
        let records = vec![
            row("A", "D", 2021, 2, 1.0),
            row("B", "D", 2021, 1, 2.0),
            row("A", "D", 2021, 1, 3.0),
        ];
        let mut reversed = records.clone();
        reversed.reverse();
        assert_eq!(
            build_sequence(&records, &Selection::All),
            build_sequence(&reversed, &Selection::All)
        );
    }

    #[test]
    fn test_ranked_keeps_top_by_metric() {
        let records = vec![
            row("A", "D", 2021, 1, 5.0),
            row("B", "D", 2021, 1, 9.0),
            row("C", "D", 2021, 1, 1.0),
        ];
        let frame = &build_sequence(&records, &Selection::All)[0];
        let top = frame.ranked(Metric::BedDays, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].label, "B");
        assert_eq!(top[0].value, 18.0);
        assert_eq!(top[1].label, "A");
    }
}
