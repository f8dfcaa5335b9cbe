//! Delimited-text parser for surveillance datasets.

use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::{AnalyticsError, Result};
use crate::record::Record;

/// Raw row as it appears in the dataset header.
///
/// Integer columns are read as floats because exports often write `2020.0`.
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    district: Option<String>,
    #[serde(rename = "Disease_Clean", default)]
    disease_clean: Option<String>,
    #[serde(default)]
    year: Option<f64>,
    #[serde(default)]
    week_of_outbreak: Option<f64>,
    #[serde(rename = "mon", default)]
    month: Option<f64>,
    #[serde(rename = "Cases", default)]
    cases: Option<f64>,
    #[serde(rename = "Bed_Days", default)]
    bed_days: Option<f64>,
    #[serde(rename = "ICU_Required", default)]
    icu_required: Option<f64>,
    #[serde(rename = "Cases_MA_3w", default)]
    cases_ma_3w: Option<f64>,
    #[serde(rename = "Cases_trend_4w", default)]
    cases_trend_4w: Option<f64>,
    #[serde(rename = "Cases_lag_1w", default)]
    cases_lag_1w: Option<f64>,
    #[serde(rename = "Seasonality_Index", default)]
    seasonality_index: Option<f64>,
}

impl RawRecord {
    /// Converts into a [`Record`]. An empty `Cases` cell counts as zero.
    ///
    /// Fails with the reason when a value is present but unusable: a
    /// fractional or out-of-range year, or negative or non-finite cases.
    fn into_record(self) -> std::result::Result<Record, String> {
        let year = match self.year {
            None => 0,
            Some(y) => whole_year(y).ok_or_else(|| format!("invalid year {y}"))?,
        };
        let cases = self.cases.unwrap_or(0.0);
        if !cases.is_finite() || cases < 0.0 {
            return Err(format!("invalid case count {cases}"));
        }
        Ok(Record {
            district: self.district.unwrap_or_default(),
            disease_clean: self.disease_clean.unwrap_or_default(),
            year,
            week_of_outbreak: self.week_of_outbreak.and_then(whole_positive),
            month: self.month.and_then(whole_positive).filter(|m| (1..=12).contains(m)),
            cases,
            bed_days: self.bed_days.unwrap_or(0.0),
            icu_required: self.icu_required.unwrap_or(0.0),
            cases_ma_3w: self.cases_ma_3w,
            cases_trend_4w: self.cases_trend_4w,
            cases_lag_1w: self.cases_lag_1w,
            seasonality_index: self.seasonality_index,
        })
    }
}

fn whole_year(v: f64) -> Option<i32> {
    let in_range = v >= f64::from(i32::MIN) && v <= f64::from(i32::MAX);
    (in_range && v.fract() == 0.0).then(|| v as i32)
}

fn whole_positive(v: f64) -> Option<u32> {
    if v >= 1.0 && v.fract() == 0.0 {
        Some(v as u32)
    } else {
        None
    }
}

/// Outcome of a dataset load.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub records: Vec<Record>,
    /// Rows dropped because they never reach a `Cases` column.
    pub dropped_rows: usize,
    /// Rows rejected because a value could not be parsed.
    pub malformed_rows: usize,
}

/// Field delimiter implied by a dataset file name.
///
/// # Errors
///
/// Returns [`AnalyticsError::MalformedInput`] for anything other than
/// `.csv`, `.txt` or `.tsv`.
pub fn delimiter_for(path: &Path) -> Result<u8> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("csv") | Some("txt") => Ok(b','),
        Some("tsv") => Ok(b'\t'),
        _ => Err(AnalyticsError::malformed(format!(
            "unsupported file type '{}', expected .csv, .txt or .tsv",
            path.display()
        ))),
    }
}

/// Parses delimited text with a header row into records.
///
/// Rows too short to reach the `Cases` column (or every row, when the
/// header has none) are dropped; rows with unparseable or invalid values
/// are skipped and counted.
pub fn parse_records<R: Read>(reader: R, delimiter: u8) -> Result<LoadReport> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let cases_idx = headers.iter().position(|h| h == "Cases");
    if cases_idx.is_none() {
        warn!("Dataset header has no Cases column, every row will be dropped");
    }

    let mut report = LoadReport::default();

    for (line, result) in rdr.records().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                debug!(row = line + 1, error = %e, "Skipping unreadable row");
                report.malformed_rows += 1;
                continue;
            }
        };

        match cases_idx {
            Some(idx) if idx < row.len() => {}
            _ => {
                report.dropped_rows += 1;
                continue;
            }
        }

        let parsed = row
            .deserialize::<RawRecord>(Some(&headers))
            .map_err(|e| e.to_string())
            .and_then(RawRecord::into_record);
        match parsed {
            Ok(record) => report.records.push(record),
            Err(reason) => {
                debug!(row = line + 1, error = %reason, "Skipping malformed row");
                report.malformed_rows += 1;
            }
        }
    }

    Ok(report)
}

/// Loads a dataset file, choosing the delimiter from its extension.
///
/// # Errors
///
/// Fails for unsupported extensions, unreadable files, or when no row
/// survives parsing.
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn load_path(path: &Path) -> Result<LoadReport> {
    let delimiter = delimiter_for(path)?;
    let file = File::open(path)?;
    let report = parse_records(file, delimiter)?;

    if report.malformed_rows > 0 {
        warn!(malformed = report.malformed_rows, "Some rows could not be parsed");
    }

    if report.records.is_empty() {
        return Err(AnalyticsError::insufficient(
            "no valid rows found, check the file format",
        ));
    }

    info!(
        records = report.records.len(),
        dropped = report.dropped_rows,
        "Dataset loaded"
    );

    Ok(report)
}
