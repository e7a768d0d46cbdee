//! Post-hoc run report computed from a trajectory and its cost rows.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::cost::CostStep;
use super::strategy::Strategy;
use super::types::{BatteryParams, SLOT_HOURS, Slot, SocStep};

/// Aggregate indicators of one simulation run.
///
/// Computed after the run from the trajectory itself so that reported figures
/// always agree with the exported rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub strategy: Strategy,
    /// Number of simulated slots.
    pub slot_count: usize,
    pub first_at: Option<NaiveDateTime>,
    pub last_at: Option<NaiveDateTime>,
    pub min_soc_kwh: f64,
    pub max_soc_kwh: f64,
    pub final_soc_kwh: f64,
    pub final_soc_pct: f64,
    /// Number of slots flagged as charging.
    pub charging_slots: usize,
    /// Energy charged, as counted by the cost derivation (kWh).
    pub charged_kwh: f64,
    /// Load energy served through the converter (kWh).
    pub served_kwh: f64,
    /// Total charging cost.
    pub total_cost: f64,
}

impl RunReport {
    /// Builds the report.
    ///
    /// # Arguments
    ///
    /// * `strategy` - Strategy that produced the trajectory
    /// * `params` - Battery parameters of the run
    /// * `slots` - Inputs the trajectory was simulated from
    /// * `steps` - The trajectory
    /// * `costs` - Cost rows derived from `steps`
    pub fn from_run(
        strategy: Strategy,
        params: &BatteryParams,
        slots: &[Slot],
        steps: &[SocStep],
        costs: &[CostStep],
    ) -> Self {
        let Some(last) = steps.last() else {
            return Self {
                strategy,
                slot_count: 0,
                first_at: None,
                last_at: None,
                min_soc_kwh: 0.0,
                max_soc_kwh: 0.0,
                final_soc_kwh: 0.0,
                final_soc_pct: 0.0,
                charging_slots: 0,
                charged_kwh: 0.0,
                served_kwh: 0.0,
                total_cost: 0.0,
            };
        };

        let mut min_soc = f64::INFINITY;
        let mut max_soc = f64::NEG_INFINITY;
        let mut charging_slots = 0_usize;
        let mut served_kwh = 0.0;

        for (step, slot) in steps.iter().zip(slots) {
            min_soc = min_soc.min(step.soc_kwh);
            max_soc = max_soc.max(step.soc_kwh);
            if step.charging {
                charging_slots += 1;
            }
            // The periodic variant serves nothing while charging and reports
            // no supply column; the price variant reports what it served.
            let supply_kw = match step.supply_kw {
                Some(supply) => supply,
                None if step.charging => 0.0,
                None => params.supply_kw(slot.load_kw, slot.generation_kw),
            };
            served_kwh += supply_kw * SLOT_HOURS;
        }

        Self {
            strategy,
            slot_count: steps.len(),
            first_at: steps.first().map(|s| s.at),
            last_at: Some(last.at),
            min_soc_kwh: min_soc,
            max_soc_kwh: max_soc,
            final_soc_kwh: last.soc_kwh,
            final_soc_pct: last.soc_pct,
            charging_slots,
            charged_kwh: costs.iter().map(|c| c.charge_kwh).sum(),
            served_kwh,
            total_cost: costs.last().map_or(0.0, |c| c.cumulative_cost),
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- SOC Report ({}) ---", self.strategy)?;
        match (self.first_at, self.last_at) {
            (Some(first), Some(last)) => writeln!(f, "Window:              {first} .. {last}")?,
            _ => writeln!(f, "Window:              (empty)")?,
        }
        writeln!(f, "Slots:               {}", self.slot_count)?;
        writeln!(
            f,
            "SOC range:           {:.2} .. {:.2} kWh",
            self.min_soc_kwh, self.max_soc_kwh
        )?;
        writeln!(
            f,
            "Final SOC:           {:.2} kWh ({:.1}%)",
            self.final_soc_kwh, self.final_soc_pct
        )?;
        writeln!(f, "Charging slots:      {}", self.charging_slots)?;
        writeln!(f, "Charged energy:      {:.2} kWh", self.charged_kwh)?;
        writeln!(f, "Served energy:       {:.2} kWh", self.served_kwh)?;
        write!(f, "Charging cost:       {:.2}", self.total_cost)
    }
}
