//! Charging cost derived from a SOC trajectory and a price series.

use chrono::NaiveDateTime;
use serde::Serialize;

use super::types::SocStep;

/// Charging cost of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostStep {
    pub at: NaiveDateTime,
    /// Energy charged in this slot (kWh).
    pub charge_kwh: f64,
    /// Price applied to the slot; missing prices are 0.
    pub price: f64,
    /// `charge_kwh * price`.
    pub cost: f64,
    /// Running sum of `cost` up to and including this slot.
    pub cumulative_cost: f64,
}

/// Derives per-slot and cumulative charging cost.
///
/// Charge energy is the step's explicit `charge_kwh` when the trajectory
/// carries one. Otherwise it is the positive part of the SOC increase over
/// the previous slot, counted only on slots flagged as charging; the first
/// slot has no predecessor and reconstructs to 0.
///
/// `prices` is aligned with `steps` by position; missing or absent prices are
/// treated as 0.
pub fn derive_costs(steps: &[SocStep], prices: &[Option<f64>]) -> Vec<CostStep> {
    let mut cumulative_cost = 0.0;
    let mut previous_kwh: Option<f64> = None;

    steps
        .iter()
        .enumerate()
        .map(|(index, step)| {
            let delta = previous_kwh.map_or(0.0, |previous| step.soc_kwh - previous);
            previous_kwh = Some(step.soc_kwh);

            let charge_kwh = step.charge_kwh.unwrap_or(if step.charging {
                delta.max(0.0)
            } else {
                0.0
            });
            let price = prices.get(index).copied().flatten().unwrap_or(0.0);
            let cost = charge_kwh * price;
            cumulative_cost += cost;

            CostStep {
                at: step.at,
                charge_kwh,
                price,
                cost,
                cumulative_cost,
            }
        })
        .collect()
}
