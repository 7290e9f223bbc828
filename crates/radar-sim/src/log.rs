//! Radar log ingestion.
//!
//! Logs are CSV tables with one `T<n>_R` (range, m) / `T<n>_THETA` (azimuth,
//! rad) column pair per target and an optional `TIME` column (s). Header and
//! cell whitespace is ignored. An empty or non-finite cell means the target
//! had no return on that scan.

use crate::sensor::MeasurementData;
use nalgebra::Vector2;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

const TIME_COLUMNS: [&str; 3] = ["TIME", "T", "TIMESTAMP"];
const RANGE_SUFFIX: &str = "_R";
const AZIMUTH_SUFFIX: &str = "_THETA";

#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to open radar log: {0}")]
    Io(#[from] io::Error),
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("no target columns (T<n>_R / T<n>_THETA) found")]
    NoTargets,
    #[error("target {0} has a range column but no azimuth column")]
    MissingAzimuth(String),
    #[error("row {row}, column {column}: cannot parse {value:?} as a number")]
    BadValue {
        row: usize,
        column: String,
        value: String,
    },
}

/// Converts a polar return to `[cross-range, down-range]`.
///
/// Azimuth is measured from the down-range axis towards cross-range.
pub fn polar_to_cartesian(range: f64, azimuth: f64) -> Vector2<f64> {
    Vector2::new(range * azimuth.sin(), range * azimuth.cos())
}

/// Returns of a single target column pair.
#[derive(Clone, Debug)]
pub struct TargetLog {
    pub id: String,
    pub data: MeasurementData,
}

#[derive(Clone, Debug, Default)]
pub struct RadarLog {
    pub targets: Vec<TargetLog>,
}

/// Scan spacing recovered from the time column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanTiming {
    /// Mean interval between consecutive scans (s).
    pub interval: f64,
    /// Largest deviation of any single gap from `interval`, relative to it.
    pub jitter: f64,
}

impl ScanTiming {
    pub fn is_uniform(&self, tolerance: f64) -> bool {
        self.jitter <= tolerance
    }
}

struct TargetColumns {
    id: String,
    range: usize,
    azimuth: usize,
}

impl RadarLog {
    pub fn from_path(path: impl AsRef<Path>, dt: f64) -> Result<Self, LogError> {
        let path = path.as_ref();
        info!("reading radar log {}", path.display());
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, dt)
    }

    /// Parses a log. `dt` spaces the scans when there is no time column.
    pub fn from_reader<R: io::Read>(reader: R, dt: f64) -> Result<Self, LogError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.to_ascii_uppercase())
            .collect();

        let time_col = headers
            .iter()
            .position(|h| TIME_COLUMNS.contains(&h.as_str()));
        let columns = find_target_columns(&headers)?;

        let mut targets: Vec<TargetLog> = columns
            .iter()
            .map(|c| TargetLog {
                id: c.id.clone(),
                data: MeasurementData::default(),
            })
            .collect();

        for (row, record) in rdr.records().enumerate() {
            let record = record?;

            let time = match time_col {
                Some(col) => parse_cell(&record, col, row, &headers)?
                    .ok_or_else(|| bad_value(row, &headers[col], ""))?,
                None => row as f64 * dt,
            };

            for (cols, target) in columns.iter().zip(targets.iter_mut()) {
                let range = parse_cell(&record, cols.range, row, &headers)?;
                let azimuth = parse_cell(&record, cols.azimuth, row, &headers)?;
                let meas = match (range, azimuth) {
                    (Some(r), Some(a)) => Some(polar_to_cartesian(r, a)),
                    _ => None,
                };
                target.data.time.push(time);
                target.data.position.push(meas);
            }
        }

        for t in &targets {
            debug!(
                id = %t.id,
                scans = t.data.len(),
                returns = t.data.returns(),
                "parsed target"
            );
        }

        Ok(Self { targets })
    }

    pub fn target(&self, id: &str) -> Option<&TargetLog> {
        self.targets.iter().find(|t| t.id.eq_ignore_ascii_case(id))
    }

    /// Spacing of the scan times. `None` with fewer than two scans.
    ///
    /// All targets share one time axis.
    pub fn scan_timing(&self) -> Option<ScanTiming> {
        let time = &self.targets.first()?.data.time;
        if time.len() < 2 {
            return None;
        }
        let span = time[time.len() - 1] - time[0];
        let interval = span / (time.len() - 1) as f64;
        let jitter = time
            .windows(2)
            .map(|w| ((w[1] - w[0]) - interval).abs())
            .fold(0.0, f64::max)
            / interval.abs();
        Some(ScanTiming { interval, jitter })
    }
}

fn find_target_columns(headers: &[String]) -> Result<Vec<TargetColumns>, LogError> {
    let mut columns = Vec::new();
    for (range_idx, h) in headers.iter().enumerate() {
        let Some(id) = h.strip_suffix(RANGE_SUFFIX) else {
            continue;
        };
        if id.len() < 2 || !id.starts_with('T') || !id[1..].chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        let azimuth_name = format!("{id}{AZIMUTH_SUFFIX}");
        let azimuth = headers
            .iter()
            .position(|h| *h == azimuth_name)
            .ok_or_else(|| LogError::MissingAzimuth(id.to_string()))?;
        columns.push(TargetColumns {
            id: id.to_string(),
            range: range_idx,
            azimuth,
        });
    }
    if columns.is_empty() {
        return Err(LogError::NoTargets);
    }
    Ok(columns)
}

/// `Ok(None)` for empty, missing or non-finite cells.
fn parse_cell(
    record: &csv::StringRecord,
    col: usize,
    row: usize,
    headers: &[String],
) -> Result<Option<f64>, LogError> {
    let raw = record.get(col).unwrap_or("");
    if raw.is_empty() {
        return Ok(None);
    }
    let v: f64 = raw
        .parse()
        .map_err(|_| bad_value(row, &headers[col], raw))?;
    Ok(v.is_finite().then_some(v))
}

fn bad_value(row: usize, column: &str, value: &str) -> LogError {
    LogError::BadValue {
        row,
        column: column.to_string(),
        value: value.to_string(),
    }
}
