//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use soc_sim::sim::types::{BatteryParams, SLOTS_PER_DAY, Slot};

/// Reference battery: 1 MW converter and charger, 2 MWh, 90 % target,
/// 10 % floor, recharge every fourth day.
pub fn default_params() -> BatteryParams {
    BatteryParams::new(1000.0, 1000.0, 2000.0, 90.0, 10.0, 4)
}

/// Midnight of the first simulated day (2024-04-01).
pub fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 4, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap()
}

pub fn slot_at(i: usize) -> NaiveDateTime {
    start() + Duration::minutes(30 * i as i64)
}

/// `days` whole days of slots with per-slot load, generation and price.
pub fn slots(
    days: usize,
    load_kw: impl Fn(usize) -> f64,
    generation_kw: impl Fn(usize) -> f64,
    price: impl Fn(usize) -> f64,
) -> Vec<Slot> {
    (0..days * SLOTS_PER_DAY)
        .map(|i| Slot {
            at: slot_at(i),
            load_kw: load_kw(i),
            generation_kw: generation_kw(i),
            price: price(i),
        })
        .collect()
}

/// `days` whole days of constant load, no generation, zero price.
pub fn constant_load(days: usize, load_kw: f64) -> Vec<Slot> {
    slots(days, |_| load_kw, |_| 0.0, |_| 0.0)
}

/// Deterministic, irregular load profile in `[0, 1500)` kW.
pub fn ragged_load(i: usize) -> f64 {
    ((i * 53 + 17) % 1500) as f64
}

/// Deterministic, irregular price profile with repeated values.
pub fn ragged_price(i: usize) -> f64 {
    ((i * 37 + 5) % 11) as f64 + 3.0
}

/// Half-hour record CSV in the importer's layout.
///
/// Every slot meters `energy_kwh(i)`; when `price` is given a spot price
/// column is included. A trailing totals row without an end timestamp is
/// appended, as real exports carry one.
pub fn records_csv(
    days: usize,
    energy_kwh: impl Fn(usize) -> f64,
    price: Option<&dyn Fn(usize) -> f64>,
) -> String {
    let mut csv = String::from("\u{feff}開始日時,終了日時,使用電力量(ロス後),使用電力量(ロス前)");
    if price.is_some() {
        csv.push_str(",JEPXスポットプライス");
    }
    csv.push('\n');

    let mut total = 0.0;
    for i in 0..days * SLOTS_PER_DAY {
        let energy = energy_kwh(i);
        total += energy;
        let _ = write!(
            csv,
            "{},{},{energy},{energy}",
            slot_at(i).format("%Y/%m/%d %H:%M"),
            slot_at(i + 1).format("%Y/%m/%d %H:%M"),
        );
        if let Some(price) = price {
            let _ = write!(csv, ",{}", price(i));
        }
        csv.push('\n');
    }
    let _ = writeln!(csv, "合計,,{total},{total}");
    csv
}

/// Writes `contents` into a fresh per-test directory and returns the path.
pub fn write_temp(test: &str, name: &str, contents: &str) -> PathBuf {
    let dir = temp_dir(test);
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Per-test scratch directory under the system temp dir.
pub fn temp_dir(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("soc-sim-{}-{test}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}
