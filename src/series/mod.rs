//! Series resolution and derived views over the canonical table.

pub mod overlay;
pub mod selector;

pub use selector::{Role, price_cells, select};

use crate::error::Result;
use crate::sim::types::Slot;
use crate::table::Table;

/// Explicit column choices for the load and generation roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnOverrides {
    pub load: Option<String>,
    pub generation: Option<String>,
}

/// Resolves load, generation and price and zips them into simulator slots.
///
/// # Errors
///
/// Fails only when no load source can be resolved.
pub fn build_slots(table: &Table, overrides: &ColumnOverrides) -> Result<Vec<Slot>> {
    let load = select(Role::Load, table, overrides.load.as_deref())?;
    let generation = select(Role::Generation, table, overrides.generation.as_deref())?;
    let price = select(Role::Price, table, None)?;

    Ok(table
        .index()
        .iter()
        .zip(load)
        .zip(generation)
        .zip(price)
        .map(|(((&at, load_kw), generation_kw), price)| Slot {
            at,
            load_kw,
            generation_kw,
            price,
        })
        .collect())
}
