//! Primary-reserve export offer: how much converter capacity is left after
//! serving the net load.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::Result;
use crate::series::{ColumnOverrides, Role, select};
use crate::table::Table;

/// Offer for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OfferRow {
    pub at: NaiveDateTime,
    /// `P_pcs - (L - G)`, capped by the export limit when one is set (kW).
    pub offer_kw: f64,
    pub load_kw: f64,
    pub generation_kw: f64,
}

/// Smallest offer over the window and when it first occurs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OfferSummary {
    pub min_kw: f64,
    pub min_at: NaiveDateTime,
}

/// Computes the per-slot offer over `table`.
///
/// The offer is not clamped at zero: a negative value means the net load
/// already exceeds the converter rating.
///
/// # Errors
///
/// Fails only when no load source can be resolved.
pub fn compute_offer(
    table: &Table,
    pcs_kw: f64,
    export_cap_kw: Option<f64>,
    overrides: &ColumnOverrides,
) -> Result<Vec<OfferRow>> {
    let load = select(Role::Load, table, overrides.load.as_deref())?;
    let generation = select(Role::Generation, table, overrides.generation.as_deref())?;

    Ok(table
        .index()
        .iter()
        .zip(load)
        .zip(generation)
        .map(|((&at, load_kw), generation_kw)| {
            let raw = pcs_kw - (load_kw - generation_kw);
            OfferRow {
                at,
                offer_kw: export_cap_kw.map_or(raw, |cap| raw.min(cap)),
                load_kw,
                generation_kw,
            }
        })
        .collect())
}

/// First occurrence of the minimum offer; `None` for an empty window.
pub fn summarize(rows: &[OfferRow]) -> Option<OfferSummary> {
    rows.iter()
        .fold(None::<&OfferRow>, |best, row| match best {
            Some(b) if b.offer_kw <= row.offer_kw => Some(b),
            _ => Some(row),
        })
        .map(|row| OfferSummary {
            min_kw: row.offer_kw,
            min_at: row.at,
        })
}
