//! CSV export of trajectories, costs, offers, overlays and aggregates.
//!
//! Every file starts with a UTF-8 byte-order mark so spreadsheet tools pick
//! the right encoding for the Japanese headers.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::Result;
use crate::offer::OfferRow;
use crate::series::overlay::Overlay;
use crate::sim::cost::CostStep;
use crate::sim::strategy::Strategy;
use crate::sim::types::{SLOTS_PER_DAY, SocStep};

const BOM: &[u8] = b"\xEF\xBB\xBF";

const INDEX_LABEL: &str = "開始日時";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const PERIODIC_HEADER: &[&str] = &[INDEX_LABEL, "SOC_kWh", "SOC_%", "charging"];

const PRICE_HEADER: &[&str] = &[
    INDEX_LABEL,
    "SOC_kWh",
    "SOC_%",
    "charging",
    "charge_kWh",
    "supply_kW",
];

const COST_HEADER: &[&str] = &[INDEX_LABEL, "charge_kWh", "price", "cost", "cumulative_cost"];

const OFFER_HEADER: &[&str] = &[
    INDEX_LABEL,
    "供出可能量kW(①=PCS-(L-G))",
    "需要kW(L)",
    "自家発kW(G)",
];

const OVERLAY_INDEX_LABEL: &str = "slot(30min)";

const DATE_FORMAT: &str = "%Y-%m-%d";

const AGGREGATE_INDEX_LABEL: &str = "date";

fn writer_with_bom<W: Write>(mut writer: W) -> Result<csv::Writer<W>> {
    writer.write_all(BOM)?;
    Ok(csv::WriterBuilder::new().from_writer(writer))
}

fn create(path: &Path) -> Result<io::BufWriter<File>> {
    Ok(io::BufWriter::new(File::create(path)?))
}

fn timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

fn number(value: f64) -> String {
    value.to_string()
}

fn optional(value: Option<f64>) -> String {
    value.map(number).unwrap_or_default()
}

fn flag(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// Writes a SOC trajectory with the column layout of `strategy`.
///
/// The periodic-reset layout has no `charge_kWh`/`supply_kW` columns.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_trajectory(steps: &[SocStep], strategy: Strategy, writer: impl Write) -> Result<()> {
    let mut wtr = writer_with_bom(writer)?;
    let detailed = strategy == Strategy::PriceOptimized;
    wtr.write_record(if detailed { PRICE_HEADER } else { PERIODIC_HEADER })?;

    for step in steps {
        let mut record = vec![
            timestamp(step.at),
            number(step.soc_kwh),
            number(step.soc_pct),
            flag(step.charging).to_string(),
        ];
        if detailed {
            record.push(optional(step.charge_kwh));
            record.push(optional(step.supply_kw));
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes a SOC trajectory to the file at `path`.
///
/// # Errors
///
/// Returns an error if file creation or writing fails.
pub fn export_trajectory(steps: &[SocStep], strategy: Strategy, path: &Path) -> Result<()> {
    write_trajectory(steps, strategy, create(path)?)
}

/// Writes a cost trajectory.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_costs(costs: &[CostStep], writer: impl Write) -> Result<()> {
    let mut wtr = writer_with_bom(writer)?;
    wtr.write_record(COST_HEADER)?;
    for c in costs {
        wtr.write_record(&[
            timestamp(c.at),
            number(c.charge_kwh),
            number(c.price),
            number(c.cost),
            number(c.cumulative_cost),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes a cost trajectory to the file at `path`.
///
/// # Errors
///
/// Returns an error if file creation or writing fails.
pub fn export_costs(costs: &[CostStep], path: &Path) -> Result<()> {
    write_costs(costs, create(path)?)
}

/// Writes export-offer rows.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_offer(rows: &[OfferRow], writer: impl Write) -> Result<()> {
    let mut wtr = writer_with_bom(writer)?;
    wtr.write_record(OFFER_HEADER)?;
    for r in rows {
        wtr.write_record(&[
            timestamp(r.at),
            number(r.offer_kw),
            number(r.load_kw),
            number(r.generation_kw),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes export-offer rows to the file at `path`.
///
/// # Errors
///
/// Returns an error if file creation or writing fails.
pub fn export_offer(rows: &[OfferRow], path: &Path) -> Result<()> {
    write_offer(rows, create(path)?)
}

/// Writes a day overlay: one row per slot of the day, one column per date.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_overlay(overlay: &Overlay, writer: impl Write) -> Result<()> {
    let mut wtr = writer_with_bom(writer)?;
    let header = std::iter::once(OVERLAY_INDEX_LABEL.to_string())
        .chain(overlay.dates.iter().map(|d| d.format(DATE_FORMAT).to_string()));
    wtr.write_record(header)?;

    for slot in 0..SLOTS_PER_DAY {
        let row = std::iter::once(slot.to_string())
            .chain(overlay.values.iter().map(|day| optional(day[slot])));
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes a day overlay to the file at `path`.
///
/// # Errors
///
/// Returns an error if file creation or writing fails.
pub fn export_overlay(overlay: &Overlay, path: &Path) -> Result<()> {
    write_overlay(overlay, create(path)?)
}

/// Writes calendar buckets of `column`, one row per bucket date.
///
/// Buckets without any value are written as empty cells.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_aggregate(buckets: &[(NaiveDate, Option<f64>)], column: &str, writer: impl Write) -> Result<()> {
    let mut wtr = writer_with_bom(writer)?;
    wtr.write_record([AGGREGATE_INDEX_LABEL, column])?;
    for (date, value) in buckets {
        wtr.write_record([date.format(DATE_FORMAT).to_string(), optional(*value)])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_aggregate(buckets: &[(NaiveDate, Option<f64>)], column: &str, path: &Path) -> Result<()> {
    write_aggregate(buckets, column, create(path)?)
}
