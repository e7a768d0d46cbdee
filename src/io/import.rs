//! CSV ingestion into the canonical table.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use chrono::{DateTime, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::sim::types::SLOT_HOURS;
use crate::table::{Column, Table};

/// Slot start timestamp column.
pub const START_COLUMN: &str = "開始日時";

/// Slot end timestamp column; rows where it is empty are totals or notes.
pub const END_COLUMN: &str = "終了日時";

/// Metered energy per slot before losses (kWh).
pub const ENERGY_BEFORE_LOSS: &str = "使用電力量(ロス前)";

/// Metered energy per slot after losses (kWh).
pub const ENERGY_AFTER_LOSS: &str = "使用電力量(ロス後)";

/// Columns every input file must carry.
pub const REQUIRED_COLUMNS: &[&str] = &[START_COLUMN, ENERGY_AFTER_LOSS, ENERGY_BEFORE_LOSS];

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Loads a half-hour record file from `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, a required column is absent,
/// or a mandatory energy cell is not numeric.
pub fn load_csv(path: &Path) -> Result<Table> {
    let file = File::open(path)?;
    read_csv(io::BufReader::new(file))
}

/// Reads half-hour records from any CSV source.
///
/// Rows with an empty end timestamp (when that column exists) and rows whose
/// start timestamp cannot be parsed are dropped. Rows are sorted by start
/// time; a repeated timestamp keeps its first row. Columns whose non-empty
/// cells are all numeric become table columns, others are ignored. Two
/// derived columns, `<energy column>_kW`, hold the average power of each slot.
///
/// # Errors
///
/// See [`load_csv`].
pub fn read_csv(reader: impl Read) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    for required in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            return Err(Error::MissingColumn((*required).to_string()));
        }
    }
    let start_idx = headers.iter().position(|h| h == START_COLUMN).unwrap_or_default();
    let end_idx = headers.iter().position(|h| h == END_COLUMN);

    // (file row, timestamp, raw cells)
    let mut rows: Vec<(usize, NaiveDateTime, csv::StringRecord)> = Vec::new();
    let mut dropped = 0_usize;
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let file_row = i + 2;
        if let Some(end_idx) = end_idx
            && record.get(end_idx).is_none_or(|cell| cell.trim().is_empty())
        {
            debug!(row = file_row, "skipping row without end timestamp");
            continue;
        }
        match record.get(start_idx).and_then(parse_timestamp) {
            Some(at) => rows.push((file_row, at, record)),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        warn!(dropped, "rows with unparsable start timestamps were dropped");
    }

    rows.sort_by_key(|(_, at, _)| *at);
    let before = rows.len();
    rows.dedup_by_key(|(_, at, _)| *at);
    if rows.len() < before {
        warn!(duplicates = before - rows.len(), "repeated start timestamps were dropped");
    }

    let mut table = Table::new(rows.iter().map(|(_, at, _)| *at).collect());
    for (col_idx, name) in headers.iter().enumerate() {
        if col_idx == start_idx || Some(col_idx) == end_idx || name.is_empty() {
            continue;
        }
        let mandatory = REQUIRED_COLUMNS.contains(&name.as_str());
        match parse_column(&rows, col_idx, name) {
            Ok(values) => table.insert_column(name.clone(), values),
            Err(err) if mandatory => return Err(err),
            Err(_) => debug!(column = %name, "ignoring non-numeric column"),
        }
    }

    for energy in [ENERGY_AFTER_LOSS, ENERGY_BEFORE_LOSS] {
        let power: Column = table
            .column(energy)
            .unwrap_or_default()
            .iter()
            .map(|kwh| kwh.map(|kwh| kwh / SLOT_HOURS))
            .collect();
        table.insert_column(format!("{energy}_kW"), power);
    }

    info!(rows = table.len(), columns = table.column_names().count(), "loaded records");
    Ok(table)
}

fn parse_column(
    rows: &[(usize, NaiveDateTime, csv::StringRecord)],
    col_idx: usize,
    name: &str,
) -> Result<Column> {
    rows.iter()
        .map(|(file_row, _, record)| {
            let cell = record.get(col_idx).unwrap_or("").trim();
            if cell.is_empty() {
                return Ok(None);
            }
            parse_number(cell).map(Some).ok_or_else(|| Error::InvalidNumber {
                row: *file_row,
                column: name.to_string(),
                value: cell.to_string(),
            })
        })
        .collect()
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.replace(',', "").parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a slot timestamp into local wall-clock time.
///
/// Offset-aware values keep their local time and drop the offset.
pub fn parse_timestamp(cell: &str) -> Option<NaiveDateTime> {
    let cell = cell.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(cell) {
        return Some(at.naive_local());
    }
    if let Ok(at) = DateTime::parse_from_str(cell, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(at.naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(cell, format).ok())
}
