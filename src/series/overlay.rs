//! Day-overlay matrices and calendar aggregation of table columns.

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use itertools::Itertools;

use super::selector::PRICE_COLUMN;
use crate::sim::types::SLOTS_PER_DAY;
use crate::table::Table;

/// One column per date, one row per half-hour slot of the day.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub dates: Vec<NaiveDate>,
    /// `values[date][slot]`, `None` where the day has no record for the slot.
    pub values: Vec<[Option<f64>; SLOTS_PER_DAY]>,
}

impl Overlay {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Slot number within the local day: 0 for 00:00, 47 for 23:30.
pub fn slot_of_day(time: NaiveTime) -> usize {
    (time.hour() as usize * 60 + time.minute() as usize) / 30
}

/// Builds the overlay of `column` for the given dates.
///
/// Dates without any record are skipped; an absent column yields an empty
/// overlay.
pub fn overlay_by_dates(table: &Table, column: &str, dates: &[NaiveDate]) -> Overlay {
    let mut overlay = Overlay {
        dates: Vec::new(),
        values: Vec::new(),
    };
    if !table.has_column(column) {
        return overlay;
    }

    for &date in dates {
        let day = table.day_slice(date);
        if day.is_empty() {
            continue;
        }
        let mut cells = [None; SLOTS_PER_DAY];
        for (at, value) in day.index().iter().zip(day.column(column).unwrap_or_default()) {
            cells[slot_of_day(at.time())] = *value;
        }
        overlay.dates.push(date);
        overlay.values.push(cells);
    }
    overlay
}

/// Price overlay over every date in the table.
///
/// Empty when the price column is absent or has no values.
pub fn overlay_price_full_year(table: &Table) -> Overlay {
    if !table.has_values(PRICE_COLUMN) {
        return overlay_by_dates(table, PRICE_COLUMN, &[]);
    }
    overlay_by_dates(table, PRICE_COLUMN, &table.dates())
}

/// Calendar bucket size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Period {
    Daily,
    /// Buckets keyed by the first day of the month.
    Monthly,
}

/// Reduction applied within a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Reduce {
    Mean,
    Sum,
    Max,
}

/// Aggregates `column` into calendar buckets, skipping missing cells.
///
/// Buckets are returned in chronological order; a bucket whose cells are all
/// missing reduces to `None`.
pub fn aggregate(table: &Table, column: &str, period: Period, reduce: Reduce) -> Vec<(NaiveDate, Option<f64>)> {
    let Some(values) = table.column(column) else {
        return Vec::new();
    };

    table
        .index()
        .iter()
        .zip(values)
        .chunk_by(|(at, _)| match period {
            Period::Daily => at.date(),
            Period::Monthly => at.date().with_day(1).unwrap_or(at.date()),
        })
        .into_iter()
        .map(|(key, cells)| {
            let present: Vec<f64> = cells.filter_map(|(_, v)| *v).collect();
            let reduced = if present.is_empty() {
                None
            } else {
                Some(match reduce {
                    Reduce::Mean => present.iter().sum::<f64>() / present.len() as f64,
                    Reduce::Sum => present.iter().sum(),
                    Reduce::Max => present.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                })
            };
            (key, reduced)
        })
        .collect()
}
