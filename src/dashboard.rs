//! Command/query surface over the analytics core.
//!
//! A [`Dashboard`] owns the dataset, the active filter, the selected chart,
//! the latest simulation and the timeline playback. Each command returns
//! a freshly derived result; a failed command leaves the previous state in
//! place, except that a timeline request always stops the running playback.

use chrono::NaiveDate;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::analyzers::build_chart;
use crate::analyzers::summary::SummaryStats;
use crate::analyzers::types::{ChartData, ChartLimits, ChartView, Metric};
use crate::error::{AnalyticsError, Result};
use crate::filter::{FilterCriteria, Selection};
use crate::output::export_report;
use crate::record::Record;
use crate::services::prediction_api::{Comparison, Forecast, PredictionApi};
use crate::simulation::{SimulationParams, SimulationResult, simulate_for};
use crate::store::{FilterOptions, RecordStore};
use crate::timeline::{FrameSink, Playback, build_sequence};

pub struct Dashboard {
    store: RecordStore,
    limits: ChartLimits,
    view: ChartView,
    metric: Metric,
    simulation: Option<SimulationResult>,
    playback: Option<Playback>,
}

impl Dashboard {
    pub fn new(records: Vec<Record>, limits: ChartLimits) -> Self {
        Self {
            store: RecordStore::new(records),
            limits,
            view: ChartView::default(),
            metric: Metric::default(),
            simulation: None,
            playback: None,
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn limits(&self) -> &ChartLimits {
        &self.limits
    }

    pub fn selected_view(&self) -> (ChartView, Metric) {
        (self.view, self.metric)
    }

    pub fn apply_filter(&mut self, criteria: FilterCriteria) -> &[Record] {
        self.store.apply(criteria)
    }

    /// Switches the active chart and returns it for the current selection.
    pub fn select_view(&mut self, view: ChartView, metric: Metric) -> ChartData {
        self.view = view;
        self.metric = metric;
        self.chart()
    }

    /// The active chart computed over the filtered records.
    pub fn chart(&self) -> ChartData {
        build_chart(self.view, self.metric, self.store.filtered(), &self.limits)
    }

    pub fn summary(&self) -> SummaryStats {
        SummaryStats::from_records(self.store.filtered())
    }

    pub fn options(&self) -> FilterOptions {
        self.store.options()
    }

    /// Projects demand for one district and disease from its full history,
    /// replacing the previous result on success.
    pub fn run_simulation(
        &mut self,
        district: &str,
        disease: &str,
        params: &SimulationParams,
    ) -> Result<&SimulationResult> {
        let result = simulate_for(self.store.records(), district, disease, params)?;
        Ok(&*self.simulation.insert(result))
    }

    pub fn last_simulation(&self) -> Option<&SimulationResult> {
        self.simulation.as_ref()
    }

    /// Writes the latest simulation as a delimited report.
    pub fn export_report(&self, path: &Path, date: NaiveDate, gzip: bool) -> Result<()> {
        let result = self
            .simulation
            .as_ref()
            .ok_or_else(|| AnalyticsError::insufficient("no simulation has been run yet"))?;
        export_report(path, result, date, gzip)
    }

    /// Stops any running playback, then builds the frame sequence for
    /// `disease` and starts playing it. Returns the number of frames.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn start_playback(
        &mut self,
        disease: &Selection<String>,
        metric: Metric,
        speed: Duration,
        sink: Arc<dyn FrameSink>,
    ) -> Result<usize> {
        // A new request stops the running playback even if it then fails.
        if let Some(mut old) = self.playback.take() {
            old.pause();
        }

        let frames = build_sequence(self.store.records(), disease);
        if frames.is_empty() {
            return Err(AnalyticsError::insufficient(format!(
                "no timeline data for disease {disease}"
            )));
        }
        if !metric.is_count() {
            warn!(%metric, "Timeline ranks count metrics only, falling back to cases");
        }

        let mut playback = Playback::new(frames, metric, self.limits.timeline_top);
        playback.start(speed, sink);
        let len = playback.len();
        self.playback = Some(playback);
        Ok(len)
    }

    pub fn pause_playback(&mut self) {
        if let Some(p) = self.playback.as_mut() {
            p.pause();
        }
    }

    pub fn reset_playback(&mut self) {
        if let Some(p) = self.playback.as_mut() {
            p.reset();
        }
    }

    /// Resumes the current playback from its cursor.
    pub fn resume_playback(&mut self, speed: Duration, sink: Arc<dyn FrameSink>) -> Result<()> {
        let playback = self
            .playback
            .as_mut()
            .ok_or_else(|| AnalyticsError::insufficient("no timeline has been built yet"))?;
        playback.start(speed, sink);
        Ok(())
    }

    pub fn playback(&self) -> Option<&Playback> {
        self.playback.as_ref()
    }

    /// Requests a forecast for one concrete disease and district.
    pub async fn forecast<A: PredictionApi + ?Sized>(
        &self,
        api: &A,
        disease: &Selection<String>,
        district: &Selection<String>,
    ) -> Result<Forecast> {
        let (Some(disease), Some(district)) = (disease.value(), district.value()) else {
            return Err(AnalyticsError::InvalidSelection(
                "select a specific disease and district for a forecast".to_string(),
            ));
        };

        let forecast = api.predict(disease, district).await?;
        info!(
            disease = %disease,
            district = %district,
            horizon = forecast.forecast.len(),
            "Forecast received"
        );
        Ok(forecast)
    }

    pub async fn compare_models<A: PredictionApi + ?Sized>(&self, api: &A) -> Result<Comparison> {
        let comparison = api.run_comparison().await?;
        info!(models = comparison.comparison_table.len(), "Model comparison received");
        Ok(comparison)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{ChannelSink, PlaybackEvent};
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn dashboard() -> Dashboard {
        let records = vec![
            Record::observation("X", "Malaria", 2020, 1, 10.0, 5.0, 1.0),
            Record::observation("X", "Malaria", 2020, 2, 20.0, 10.0, 1.0),
            Record::observation("Y", "Dengue", 2020, 1, 5.0, 2.0, 0.0),
            Record::observation("Y", "Dengue", 2021, 1, 7.0, 3.0, 0.0),
        ];
        Dashboard::new(records, ChartLimits::default())
    }

    #[derive(Default)]
    struct FakeApi {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl PredictionApi for FakeApi {
        async fn predict(&self, _disease: &str, _district: &str) -> Result<Forecast> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AnalyticsError::external("connection refused"));
            }
            Ok(Forecast {
                labels: vec!["Week +1".to_string()],
                forecast: vec![3.5],
                historical_average: Some(2.0),
                data_points_used: Some(4),
            })
        }

        async fn run_comparison(&self) -> Result<Comparison> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Comparison {
                comparison_table: Vec::new(),
                plot_data: BTreeMap::new(),
            })
        }
    }

    #[test]
    fn test_filter_drives_chart_and_summary() {
        let mut d = dashboard();
        d.apply_filter(FilterCriteria::all().with_disease("Malaria"));

        let summary = d.summary();
        assert_eq!(summary.records, 2);
        assert_eq!(summary.total_cases, 30.0);

        match d.select_view(ChartView::DistrictComparison, Metric::BedDays) {
            ChartData::DistrictComparison(chart) => {
                assert_eq!(chart.bars.len(), 1);
                assert_eq!(chart.bars[0].label, "X");
                assert_eq!(chart.bars[0].value, 15.0);
            }
            other => panic!("unexpected chart {:?}", other.view()),
        }
        assert_eq!(d.selected_view(), (ChartView::DistrictComparison, Metric::BedDays));
    }

    #[test]
    fn test_empty_filter_yields_empty_chart() {
        let mut d = dashboard();
        d.apply_filter(FilterCriteria::all().with_year(1999));
        assert!(d.chart().is_empty());
        assert_eq!(d.summary().records, 0);
    }

    #[test]
    fn test_failed_simulation_keeps_previous_result() {
        let mut d = dashboard();
        let params = SimulationParams {
            available_beds: 100,
            icu_capacity: 10,
            growth_rate_percent: 10.0,
            weeks_to_simulate: 4,
        };
        d.run_simulation("X", "Malaria", &params).unwrap();
        assert_eq!(d.last_simulation().unwrap().baseline.avg_cases, 15.0);

        let err = d.run_simulation("X", "Dengue", &params).unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientData(_)));
        assert_eq!(d.last_simulation().unwrap().disease, "Malaria");
    }

    #[test]
    fn test_simulation_ignores_active_filter() {
        let mut d = dashboard();
        d.apply_filter(FilterCriteria::all().with_year(2021));
        let result = d
            .run_simulation("X", "Malaria", &SimulationParams::default())
            .unwrap();
        assert_eq!(result.weeks.len(), 12);
    }

    #[test]
    fn test_export_without_simulation() {
        let d = dashboard();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let err = d
            .export_report(&std::env::temp_dir().join("never_written.csv"), date, false)
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientData(_)));
    }

    #[tokio::test]
    async fn test_forecast_requires_concrete_selection() {
        let d = dashboard();
        let api = FakeApi::default();

        let err = d
            .forecast(&api, &Selection::All, &Selection::Only("X".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidSelection(_)));
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);

        let forecast = d
            .forecast(
                &api,
                &Selection::Only("Malaria".to_string()),
                &Selection::Only("X".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(forecast.forecast, vec![3.5]);
    }

    #[tokio::test]
    async fn test_service_failure_leaves_state_intact() {
        let mut d = dashboard();
        d.apply_filter(FilterCriteria::all().with_district("Y"));
        let api = FakeApi {
            fail: true,
            ..Default::default()
        };

        let err = d
            .forecast(
                &api,
                &Selection::Only("Dengue".to_string()),
                &Selection::Only("Y".to_string()),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::ExternalServiceFailure(_)));
        assert_eq!(d.store().filtered().len(), 2);

        assert!(d.compare_models(&FakeApi::default()).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_playback_commands() {
        let mut d = dashboard();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let sink = Arc::new(ChannelSink::new(tx));

        let frames = d
            .start_playback(&Selection::All, Metric::Cases, Duration::from_millis(50), sink.clone())
            .unwrap();
        assert_eq!(frames, 3);

        match rx.recv().await {
            Some(PlaybackEvent::Frame(f)) => {
                assert_eq!(f.label, "2020-W1");
                assert_eq!(f.districts[0].label, "X");
            }
            other => panic!("unexpected event {:?}", other),
        }

        d.pause_playback();
        let cursor = d.playback().unwrap().cursor();
        assert!(!d.playback().unwrap().is_playing());

        d.resume_playback(Duration::from_millis(50), sink).unwrap();
        match rx.recv().await {
            Some(PlaybackEvent::Frame(f)) => assert_eq!(f.index, cursor),
            other => panic!("unexpected event {:?}", other),
        }

        d.reset_playback();
        assert_eq!(d.playback().unwrap().cursor(), 0);
        assert!(!d.playback().unwrap().is_playing());
    }

    #[tokio::test]
    async fn test_playback_for_unknown_disease() {
        let mut d = dashboard();
        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let err = d
            .start_playback(
                &Selection::Only("Cholera".to_string()),
                Metric::Cases,
                Duration::from_millis(10),
                Arc::new(ChannelSink::new(tx)),
            )
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientData(_)));
        assert!(d.playback().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_restart_stops_running_playback() {
        let mut d = dashboard();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let sink = Arc::new(ChannelSink::new(tx));

        d.start_playback(&Selection::All, Metric::Cases, Duration::from_millis(50), sink.clone())
            .unwrap();
        assert!(matches!(rx.recv().await, Some(PlaybackEvent::Frame(_))));

        let err = d
            .start_playback(
                &Selection::Only("Cholera".to_string()),
                Metric::Cases,
                Duration::from_millis(50),
                sink,
            )
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientData(_)));
        assert!(d.playback().is_none());

        while rx.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }
}
