//! CSV ingest of daily price ranges.
//!
//! Turns a local price CSV into a validated [`TimeSeries`].
//!
//! Accepted schema (header names are case-insensitive, a UTF-8 BOM is ignored):
//! - `date` (required): `YYYY-MM-DD`, plus a few common alternatives
//! - `low` + `high`, or a single `close` / `price` column used for both
//!
//! Behavior:
//! - rows that fail to parse are skipped and reported as [`RowError`]s
//! - rows are sorted by date; a repeated date keeps the first row and
//!   reports the others
//! - no fitting logic here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::{DataPoint, TimeSeries};
use crate::error::{AppError, Result};

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the validated series plus what was skipped.
#[derive(Debug, Clone)]
pub struct IngestedSeries {
    pub series: TimeSeries,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Where the low/high values of a row come from.
#[derive(Debug, Clone, Copy)]
enum PriceColumns {
    Range { low: usize, high: usize },
    Single(usize),
}

/// Load a price CSV from `path`.
pub fn load_series(path: &Path) -> Result<IngestedSeries> {
    let file = File::open(path)
        .map_err(|e| AppError::Io(format!("failed to open CSV '{}': {e}", path.display())))?;
    read_series(file)
}

/// Read a price CSV from any reader.
pub fn read_series<R: std::io::Read>(input: R) -> Result<IngestedSeries> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AppError::Parse {
            line: 1,
            message: format!("failed to read CSV headers: {e}"),
        })?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = *header_map.get("date").ok_or_else(|| AppError::Parse {
        line: 1,
        message: "missing required column: `date`".to_string(),
    })?;
    let columns = resolve_price_columns(&header_map)?;

    let mut rows: Vec<(usize, DataPoint)> = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header line; lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {e}"))
            .and_then(|record| parse_row(&record, date_idx, columns));
        match parsed {
            Ok(point) => rows.push((line, point)),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    // Stable: among equal dates the earliest line stays first.
    rows.sort_by_key(|(_, p)| p.date);
    let mut points: Vec<DataPoint> = Vec::with_capacity(rows.len());
    for (line, point) in rows {
        if points.last().is_some_and(|prev| prev.date == point.date) {
            row_errors.push(RowError {
                line,
                message: format!("duplicate date {}; keeping the first row", point.date),
            });
            continue;
        }
        points.push(point);
    }
    row_errors.sort_by_key(|e| e.line);

    let rows_used = points.len();
    if rows_used == 0 {
        return Err(AppError::invalid_input("no valid rows in price CSV"));
    }
    if !row_errors.is_empty() {
        warn!(skipped = row_errors.len(), "some CSV rows were skipped");
    }
    info!(rows_read, rows_used, "loaded price series");

    Ok(IngestedSeries {
        series: TimeSeries::new(points)?,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn resolve_price_columns(header_map: &HashMap<String, usize>) -> Result<PriceColumns> {
    match (header_map.get("low"), header_map.get("high")) {
        (Some(&low), Some(&high)) => return Ok(PriceColumns::Range { low, high }),
        (Some(_), None) | (None, Some(_)) => {
            return Err(AppError::Parse {
                line: 1,
                message: "`low` and `high` must be given together".to_string(),
            });
        }
        (None, None) => {}
    }
    header_map
        .get("close")
        .or_else(|| header_map.get("price"))
        .map(|&idx| PriceColumns::Single(idx))
        .ok_or_else(|| AppError::Parse {
            line: 1,
            message: "missing price columns: expected `low` + `high`, `close`, or `price`".to_string(),
        })
}

fn parse_row(
    record: &StringRecord,
    date_idx: usize,
    columns: PriceColumns,
) -> std::result::Result<DataPoint, String> {
    let date = parse_date(get_required(record, date_idx, "date")?)?;
    let (low, high) = match columns {
        PriceColumns::Range { low, high } => (
            parse_price(get_required(record, low, "low")?, "low")?,
            parse_price(get_required(record, high, "high")?, "high")?,
        ),
        PriceColumns::Single(idx) => {
            let p = parse_price(get_required(record, idx, "price")?, "price")?;
            (p, p)
        }
    };
    if low > high {
        return Err(format!("low ({low}) is above high ({high})"));
    }
    Ok(DataPoint::new(date, low, high))
}

fn get_required<'a>(record: &'a StringRecord, idx: usize, name: &str) -> std::result::Result<&'a str, String> {
    record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("missing required value: `{name}`"))
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "invalid date '{s}'; expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD"
    ))
}

fn parse_price(s: &str, name: &str) -> std::result::Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("invalid `{name}` value '{s}'")),
    }
}
