//! CLI entry point for outbreak_lens.
//!
//! Loads a surveillance dataset and exposes the dashboard commands: summary
//! figures, chart views, capacity simulation, timeline playback and the
//! prediction-service calls.

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use outbreak_lens::analyzers::types::{ChartView, Metric};
use outbreak_lens::config::DashboardConfig;
use outbreak_lens::dashboard::Dashboard;
use outbreak_lens::filter::{FilterCriteria, Selection};
use outbreak_lens::infra::prediction::PredictionClient;
use outbreak_lens::output::{format_pct, print_pretty, report_file_name, to_json};
use outbreak_lens::parser::load_path;
use outbreak_lens::simulation::SimulationParams;
use outbreak_lens::timeline::{ChannelSink, PlaybackEvent};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "outbreak_lens")]
#[command(about = "Explore disease-outbreak surveillance data", long_about = None)]
struct Cli {
    /// Dataset file (.csv, .txt or .tsv)
    #[arg(short, long, global = true, default_value = "data.csv")]
    data: PathBuf,

    /// Optional JSON settings file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Disease name or "All"
    #[arg(long, default_value = "All")]
    disease: Selection<String>,

    /// District name or "All"
    #[arg(long, default_value = "All")]
    district: Selection<String>,

    /// Year or "All"
    #[arg(long, default_value = "All")]
    year: Selection<i32>,

    /// Month (1-12) or "All"
    #[arg(long, default_value = "All")]
    month: Selection<u32>,
}

impl From<FilterArgs> for FilterCriteria {
    fn from(args: FilterArgs) -> Self {
        FilterCriteria {
            disease: args.disease,
            district: args.district,
            year: args.year,
            month: args.month,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Headline figures and filter options for the selection
    Summary {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Compute one chart view for the selection
    Chart {
        /// time_series, seasonal, district_bar, disease_pie, correlation,
        /// lag_scatter, trend_box or healthcare
        view: ChartView,

        /// cases, bed_days, icu_required, cases_ma_3w or cases_trend_4w
        #[arg(short, long, default_value = "cases")]
        metric: Metric,

        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Project bed and ICU demand for one district and disease
    Simulate {
        #[arg(long)]
        district: String,

        #[arg(long)]
        disease: String,

        /// Available hospital beds
        #[arg(long)]
        beds: u32,

        /// ICU capacity
        #[arg(long)]
        icu: u32,

        /// Weekly growth rate in percent
        #[arg(short, long, default_value_t = 10.0)]
        growth: f64,

        #[arg(short, long, default_value_t = 12)]
        weeks: u32,

        /// Write the report to this path, or to a generated file name in
        /// this directory when it is one
        #[arg(long)]
        export: Option<PathBuf>,

        /// Gzip the exported report
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Play the outbreak timeline frame by frame
    Timeline {
        /// Disease name or "All"
        #[arg(long, default_value = "All")]
        disease: Selection<String>,

        #[arg(short, long, default_value = "cases")]
        metric: Metric,

        /// Milliseconds between frames
        #[arg(long, default_value_t = 500)]
        speed_ms: u64,
    },
    /// Request a short-horizon forecast from the prediction service
    Forecast {
        #[arg(long)]
        disease: Selection<String>,

        #[arg(long)]
        district: Selection<String>,
    },
    /// Run the prediction service's model comparison
    Compare,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/outbreak_lens.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("outbreak_lens.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = DashboardConfig::resolve(cli.config.as_deref())
        .context("failed to load dashboard config")?;

    // The prediction commands never touch the dataset.
    match &cli.command {
        Commands::Forecast { disease, district } => {
            let dashboard = Dashboard::new(Vec::new(), config.limits);
            let client =
                PredictionClient::new(&config.prediction_base_url, config.request_timeout())?;
            let forecast = dashboard.forecast(&client, disease, district).await?;
            println!("{}", to_json(&forecast)?);
            return Ok(());
        }
        Commands::Compare => {
            let dashboard = Dashboard::new(Vec::new(), config.limits);
            let client =
                PredictionClient::new(&config.prediction_base_url, config.request_timeout())?;
            let comparison = dashboard.compare_models(&client).await?;
            println!("{}", to_json(&comparison)?);
            return Ok(());
        }
        _ => {}
    }

    let report = load_path(&cli.data)
        .with_context(|| format!("failed to load dataset {}", cli.data.display()))?;
    let mut dashboard = Dashboard::new(report.records, config.limits);

    match cli.command {
        Commands::Summary { filter } => {
            dashboard.apply_filter(filter.into());
            println!("{}", to_json(&dashboard.summary())?);
            println!("{}", to_json(&dashboard.options())?);
        }
        Commands::Chart {
            view,
            metric,
            filter,
        } => {
            if !view.uses_metric() && metric != Metric::Cases {
                info!(view = view.title(), %metric, "Metric is ignored by this view");
            }
            dashboard.apply_filter(filter.into());
            let chart = dashboard.select_view(view, metric);
            if chart.is_empty() {
                info!(view = view.title(), "No data for the current selection");
            }
            println!("{}", to_json(&chart)?);
        }
        Commands::Simulate {
            district,
            disease,
            beds,
            icu,
            growth,
            weeks,
            export,
            gzip,
        } => {
            let params = SimulationParams {
                available_beds: beds,
                icu_capacity: icu,
                growth_rate_percent: growth,
                weeks_to_simulate: weeks,
            };
            let result = dashboard.run_simulation(&district, &disease, &params)?;
            print_pretty(result);

            for week in &result.weeks {
                println!(
                    "week {:>2}: {:>8.0} cases {:>9.0} bed days {:>6.0} ICU  beds {:>6}%  icu {:>6}%",
                    week.week,
                    week.cases,
                    week.bed_days,
                    week.icu_required,
                    format_pct(week.bed_utilization_pct),
                    format_pct(week.icu_utilization_pct),
                );
            }
            match result.bed_critical_week() {
                Some(w) => warn!(week = w, "Bed capacity exceeded"),
                None => info!("Bed capacity holds"),
            }
            match result.icu_critical_week() {
                Some(w) => warn!(week = w, "ICU capacity exceeded"),
                None => info!("ICU capacity holds"),
            }

            if let Some(target) = export {
                let today = Local::now().date_naive();
                let mut path = if target.is_dir() {
                    target.join(report_file_name(result, today))
                } else {
                    target
                };
                if gzip && path.extension() != Some(OsStr::new("gz")) {
                    path.as_mut_os_string().push(".gz");
                }
                dashboard.export_report(&path, today, gzip)?;
                println!("report written to {}", path.display());
            }
        }
        Commands::Timeline {
            disease,
            metric,
            speed_ms,
        } => {
            let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
            let frames = dashboard.start_playback(
                &disease,
                metric,
                Duration::from_millis(speed_ms),
                Arc::new(ChannelSink::new(tx)),
            )?;
            info!(frames, "Timeline playback started, press Ctrl+C to stop");

            loop {
                tokio::select! {
                    event = rx.recv() => match event {
                        Some(PlaybackEvent::Frame(frame)) => {
                            println!(
                                "[{:>5.1}%] {} {}",
                                frame.progress_pct(),
                                frame.label,
                                frame.metric
                            );
                            for (rank, d) in frame.districts.iter().enumerate() {
                                println!("  {:>2}. {:<24} {:>10.0}", rank + 1, d.label, d.value);
                            }
                        }
                        Some(PlaybackEvent::Finished) | None => break,
                    },
                    _ = tokio::signal::ctrl_c() => {
                        dashboard.pause_playback();
                        info!("Playback interrupted");
                        break;
                    }
                }
            }
        }
        Commands::Forecast { .. } | Commands::Compare => {}
    }

    Ok(())
}
