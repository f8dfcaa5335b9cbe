//! Output formatting and persistence for engine results.
//!
//! Supports pretty-printing, JSON serialization, and the delimited
//! simulation report.

use chrono::NaiveDate;
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fmt::Debug;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::error::Result;
use crate::simulation::SimulationResult;

/// Logs any result using Rust's debug pretty-print format.
pub fn print_pretty<T: Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Renders a value as pretty-printed JSON.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Formats a utilization percentage with one decimal, or `n/a` when the
/// capacity was zero.
pub fn format_pct(value: f64) -> String {
    if value.is_finite() {
        format!("{:.1}", value)
    } else {
        "n/a".to_string()
    }
}

fn rounded(value: f64) -> String {
    format!("{}", value.round())
}

/// Suggested file name for an exported report.
pub fn report_file_name(result: &SimulationResult, date: NaiveDate) -> String {
    format!(
        "resource_simulation_{}_{}_{}.csv",
        result.district,
        result.disease,
        date.format("%Y-%m-%d")
    )
}

fn write_rows<W: Write>(out: W, rows: &[Vec<String>]) -> Result<()> {
    let mut w = WriterBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_writer(out);
    for row in rows {
        w.write_record(row)?;
    }
    w.flush()?;
    Ok(())
}

fn row<const N: usize>(fields: [&str; N]) -> Vec<String> {
    fields.iter().map(|f| f.to_string()).collect()
}

/// Writes a simulation report: header block with parameters and baseline,
/// then one row per projected week. Blocks are separated by blank lines.
pub fn write_report<W: Write>(
    mut out: W,
    result: &SimulationResult,
    date: NaiveDate,
) -> Result<()> {
    let p = &result.parameters;
    let b = &result.baseline;

    let mut table = vec![
        row(["Simulation Results:"]),
        row([
            "Week",
            "Projected Cases",
            "Bed Days Required",
            "ICU Required",
            "Bed Utilization %",
            "ICU Utilization %",
        ]),
    ];
    table.extend(result.weeks.iter().map(|week| {
        vec![
            week.week.to_string(),
            rounded(week.cases),
            rounded(week.bed_days),
            rounded(week.icu_required),
            format_pct(week.bed_utilization_pct),
            format_pct(week.icu_utilization_pct),
        ]
    }));

    let blocks = [
        vec![row(["Disease Outbreak Resource Simulation Report"])],
        vec![
            row(["District:", &result.district]),
            row(["Disease:", &result.disease]),
            row(["Simulation Date:", &date.format("%Y-%m-%d").to_string()]),
        ],
        vec![
            row(["Parameters:"]),
            row(["Available Beds:", &p.available_beds.to_string()]),
            row(["ICU Capacity:", &p.icu_capacity.to_string()]),
            row(["Growth Rate:", &format!("{}%", p.growth_rate_percent)]),
            row(["Weeks Simulated:", &p.weeks_to_simulate.to_string()]),
        ],
        vec![
            row(["Baseline Metrics (Historical Average):"]),
            row(["Average Cases:", &rounded(b.avg_cases)]),
            row(["Average Bed Days:", &rounded(b.avg_bed_days)]),
            row(["Average ICU Required:", &rounded(b.avg_icu)]),
        ],
        table,
    ];

    for (i, rows) in blocks.iter().enumerate() {
        if i > 0 {
            out.write_all(b"\n")?;
        }
        write_rows(&mut out, rows)?;
    }
    out.flush()?;
    Ok(())
}

/// Writes the report to `path`, gzip-compressed when `gzip` is set.
pub fn export_report(
    path: &Path,
    result: &SimulationResult,
    date: NaiveDate,
    gzip: bool,
) -> Result<()> {
    debug!(path = %path.display(), gzip, "Exporting simulation report");

    let file = File::create(path)?;
    if gzip {
        let mut encoder = GzEncoder::new(file, Compression::default());
        write_report(&mut encoder, result, date)?;
        encoder.finish()?;
    } else {
        write_report(file, result, date)?;
    }

    info!(path = %path.display(), weeks = result.weeks.len(), "Report exported");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{Baseline, SimulationParams, project};
    use flate2::read::GzDecoder;
    use std::env;
    use std::fs;
    use std::io::Read;

    fn temp_path(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(name)
    }

    fn sample_result(beds: u32) -> SimulationResult {
        let baseline = Baseline {
            avg_cases: 100.0,
            avg_bed_days: 300.0,
            avg_icu: 20.0,
        };
        let parameters = SimulationParams {
            available_beds: beds,
            icu_capacity: 20,
            growth_rate_percent: 10.0,
            weeks_to_simulate: 3,
        };
        SimulationResult {
            district: "Chennai".to_string(),
            disease: "Dengue".to_string(),
            weeks: project(&baseline, &parameters),
            parameters,
            baseline,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&sample_result(500));
    }

    #[test]
    fn test_to_json_contains_weeks() {
        let json = to_json(&sample_result(500)).unwrap();
        assert!(json.contains("\"weeks\""));
        assert!(json.contains("\"bed_utilization_pct\""));
    }

    #[test]
    fn test_format_pct() {
        assert_eq!(format_pct(66.04), "66.0");
        assert_eq!(format_pct(f64::INFINITY), "n/a");
        assert_eq!(format_pct(f64::NAN), "n/a");
    }

    #[test]
    fn test_write_report_layout() {
        let mut buf = Vec::new();
        write_report(&mut buf, &sample_result(500), date()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Disease Outbreak Resource Simulation Report");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "District:,Chennai");
        assert_eq!(lines[4], "Simulation Date:,2024-03-01");
        let blanks: Vec<usize> = (0..lines.len()).filter(|&i| lines[i].is_empty()).collect();
        assert_eq!(blanks, vec![1, 5, 11, 16]);
        assert_eq!(lines[17], "Simulation Results:");
        assert_eq!(lines.len(), 19 + 3);
        assert!(lines.contains(&"Growth Rate:,10%"));
        assert!(lines.contains(&"Average Bed Days:,300"));
        assert!(lines.contains(
            &"Week,Projected Cases,Bed Days Required,ICU Required,Bed Utilization %,ICU Utilization %"
        ));
        // 110 cases * 3 bed days / 500 beds = 66%
        assert!(lines.contains(&"1,110,330,22,66.0,110.0"));
        assert_eq!(lines.last().unwrap(), &"3,133,399,27,79.9,133.1");
    }

    #[test]
    fn test_write_report_quotes_fields() {
        let mut result = sample_result(500);
        result.district = "Salem, North".to_string();
        let mut buf = Vec::new();
        write_report(&mut buf, &result, date()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("District:,\"Salem, North\"\n"));
    }

    #[test]
    fn test_write_report_zero_capacity() {
        let mut buf = Vec::new();
        write_report(&mut buf, &sample_result(0), date()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("1,110,330,22,n/a,110.0"));
    }

    #[test]
    fn test_export_report_gzip_round_trip() {
        let path = temp_path("outbreak_lens_test_report.csv.gz");
        let _ = fs::remove_file(&path);

        export_report(&path, &sample_result(500), date(), true).unwrap();

        let mut text = String::new();
        GzDecoder::new(fs::File::open(&path).unwrap())
            .read_to_string(&mut text)
            .unwrap();
        assert!(text.starts_with("Disease Outbreak Resource Simulation Report"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(
            report_file_name(&sample_result(500), date()),
            "resource_simulation_Chennai_Dengue_2024-03-01.csv"
        );
    }
}
