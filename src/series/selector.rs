//! Resolution of load, generation and price series from the canonical table.

use tracing::debug;

use crate::error::{Error, Result};
pub use crate::io::import::ENERGY_AFTER_LOSS;
use crate::sim::types::SLOT_HOURS;
use crate::table::Table;

/// Load columns tried in priority order when no override is given.
pub const LOAD_CANDIDATES: &[&str] = &["需要計画量(ロス前)", "需要計画量", "需要kW"];

/// Generation columns tried in priority order when no override is given.
pub const GENERATION_CANDIDATES: &[&str] = &["自家発出力", "PV出力", "太陽光出力", "発電kW"];

/// Spot price column (yen/kWh).
pub const PRICE_COLUMN: &str = "JEPXスポットプライス";

/// Role a resolved series plays in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Load,
    Generation,
    Price,
}

/// Resolves the series for `role`, aligned with the table index.
///
/// A present `preferred` column always wins. Otherwise the role's fallback
/// chain applies: load tries [`LOAD_CANDIDATES`] (first column with any value)
/// and then [`ENERGY_AFTER_LOSS`] converted to average kW; generation tries
/// [`GENERATION_CANDIDATES`] and falls back to zeros; price reads
/// [`PRICE_COLUMN`] and falls back to zeros. Missing cells read as 0.
///
/// # Errors
///
/// Returns [`Error::MissingColumn`] only for [`Role::Load`] when no load
/// source exists at all. An empty table always selects an empty series.
pub fn select(role: Role, table: &Table, preferred: Option<&str>) -> Result<Vec<f64>> {
    if table.is_empty() {
        return Ok(Vec::new());
    }

    if let Some(values) = preferred.and_then(|name| table.column(name)) {
        debug!(?role, column = preferred, "using preferred column");
        return Ok(zero_filled(values));
    }

    match role {
        Role::Load => {
            if let Some(name) = LOAD_CANDIDATES.iter().find(|name| table.has_values(name)) {
                debug!(?role, column = name, "using candidate column");
                return Ok(zero_filled(table.column(name).unwrap_or_default()));
            }
            let energy = table
                .column(ENERGY_AFTER_LOSS)
                .ok_or_else(|| Error::MissingColumn(ENERGY_AFTER_LOSS.to_string()))?;
            debug!(?role, column = ENERGY_AFTER_LOSS, "deriving load from metered energy");
            Ok(energy
                .iter()
                .map(|kwh| kwh.unwrap_or(0.0) / SLOT_HOURS)
                .collect())
        }
        Role::Generation => Ok(GENERATION_CANDIDATES
            .iter()
            .find_map(|name| table.column(name))
            .map_or_else(|| vec![0.0; table.len()], zero_filled)),
        Role::Price => Ok(table
            .column(PRICE_COLUMN)
            .map_or_else(|| vec![0.0; table.len()], zero_filled)),
    }
}

/// Price cells as they are, missing entries kept as `None`.
///
/// Cost derivation treats `None` as 0 itself; an absent column is all `None`.
pub fn price_cells(table: &Table) -> Vec<Option<f64>> {
    table
        .column(PRICE_COLUMN)
        .map_or_else(|| vec![None; table.len()], <[Option<f64>]>::to_vec)
}

fn zero_filled(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().map(|v| v.unwrap_or(0.0)).collect()
}
