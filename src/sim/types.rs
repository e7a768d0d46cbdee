//! Core simulation types: battery parameters, slot inputs and trajectory steps.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

/// Duration of one slot in hours.
pub const SLOT_HOURS: f64 = 0.5;

/// Number of half-hour slots in a calendar day.
pub const SLOTS_PER_DAY: usize = 48;

/// Tolerance used when deciding that a recharge has completed.
pub const EPSILON_KWH: f64 = 1e-9;

/// Battery and scheduling parameters for one simulation run.
///
/// The simulators assume `0 <= floor_kwh() <= target_kwh() <= capacity_kwh`
/// and positive ratings; [`crate::config::ScenarioConfig::validate`] is the
/// place that rejects configurations breaking that.
///
/// # Examples
///
/// ```
/// use soc_sim::sim::types::BatteryParams;
///
/// let params = BatteryParams::new(1000.0, 1000.0, 2000.0, 90.0, 10.0, 4);
/// assert_eq!(params.target_kwh(), 1800.0);
/// assert_eq!(params.floor_kwh(), 200.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatteryParams {
    /// Converter (PCS) power rating (kW).
    pub pcs_kw: f64,
    /// Charger power rating (kW).
    pub charger_kw: f64,
    /// Nominal energy capacity (kWh).
    pub capacity_kwh: f64,
    /// Target/reset level as a percentage of capacity.
    pub soc_init_pct: f64,
    /// Discharge floor as a percentage of capacity.
    pub soc_floor_pct: f64,
    /// Recharge cadence in calendar days.
    pub reset_every_days: u32,
}

impl BatteryParams {
    pub fn new(
        pcs_kw: f64,
        charger_kw: f64,
        capacity_kwh: f64,
        soc_init_pct: f64,
        soc_floor_pct: f64,
        reset_every_days: u32,
    ) -> Self {
        Self {
            pcs_kw,
            charger_kw,
            capacity_kwh,
            soc_init_pct,
            soc_floor_pct,
            reset_every_days,
        }
    }

    /// Target/reset level `E_init` (kWh).
    pub fn target_kwh(&self) -> f64 {
        self.capacity_kwh * self.soc_init_pct / 100.0
    }

    /// Discharge floor `E_floor` (kWh).
    pub fn floor_kwh(&self) -> f64 {
        self.capacity_kwh * self.soc_floor_pct / 100.0
    }

    /// Converts stored energy to a percentage of nominal capacity.
    pub fn soc_pct(&self, energy_kwh: f64) -> f64 {
        100.0 * energy_kwh / self.capacity_kwh
    }

    /// Load actually served through the converter: `min(max(0, L - G), P_pcs)`.
    pub fn supply_kw(&self, load_kw: f64, generation_kw: f64) -> f64 {
        (load_kw - generation_kw).max(0.0).min(self.pcs_kw)
    }

    /// Energy discharged over one slot while serving `supply_kw`.
    pub fn discharge(&self, energy_kwh: f64, supply_kw: f64) -> f64 {
        (energy_kwh - supply_kw * SLOT_HOURS).max(self.floor_kwh())
    }

    /// Whether `day_index` is a day on which a recharge cycle may trigger.
    pub fn is_reset_day(&self, day_index: i64) -> bool {
        day_index.rem_euclid(i64::from(self.reset_every_days.max(1))) == 0
    }
}

/// Aligned inputs for one half-hour slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    /// Slot start in local wall-clock time.
    pub at: NaiveDateTime,
    /// Facility load (kW).
    pub load_kw: f64,
    /// On-site generation (kW).
    pub generation_kw: f64,
    /// Spot price (currency per kWh), 0 when unknown.
    pub price: f64,
}

/// One row of a SOC trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SocStep {
    /// Slot start in local wall-clock time.
    pub at: NaiveDateTime,
    /// Stored energy after this slot (kWh).
    pub soc_kwh: f64,
    /// Stored energy as a percentage of nominal capacity.
    pub soc_pct: f64,
    /// Whether energy was added during this slot.
    pub charging: bool,
    /// Energy added during this slot; only the price-optimized variant reports it.
    pub charge_kwh: Option<f64>,
    /// Load served during this slot; only the price-optimized variant reports it.
    pub supply_kw: Option<f64>,
}

impl fmt::Display for SocStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | SoC={:>9.2} kWh ({:>5.1}%) charging={}",
            self.at.format("%Y-%m-%d %H:%M"),
            self.soc_kwh,
            self.soc_pct,
            self.charging,
        )?;
        if let (Some(charge), Some(supply)) = (self.charge_kwh, self.supply_kw) {
            write!(f, " charge={charge:.2} kWh supply={supply:.2} kW")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn params() -> BatteryParams {
        BatteryParams::new(1000.0, 1000.0, 2000.0, 90.0, 10.0, 4)
    }

    #[test]
    fn derived_levels() {
        let p = params();
        assert_eq!(p.target_kwh(), 1800.0);
        assert_eq!(p.floor_kwh(), 200.0);
        assert_eq!(p.soc_pct(1000.0), 50.0);
    }

    #[test]
    fn supply_is_capped_by_converter() {
        let p = params();
        assert_eq!(p.supply_kw(1200.0, 0.0), 1000.0);
        assert_eq!(p.supply_kw(600.0, 100.0), 500.0);
    }

    #[test]
    fn generation_surplus_yields_no_supply() {
        assert_eq!(params().supply_kw(100.0, 400.0), 0.0);
    }

    #[test]
    fn discharge_stops_at_floor() {
        let p = params();
        assert_eq!(p.discharge(1800.0, 1000.0), 1300.0);
        assert_eq!(p.discharge(300.0, 1000.0), 200.0);
    }

    #[test]
    fn reset_days_follow_cadence() {
        let p = params();
        let reset: Vec<i64> = (0..10).filter(|&d| p.is_reset_day(d)).collect();
        assert_eq!(reset, vec![0, 4, 8]);
    }

    #[test]
    fn step_display_does_not_panic() {
        let at = NaiveDate::from_ymd_opt(2024, 4, 1)
            .and_then(|d| d.and_hms_opt(0, 30, 0))
            .unwrap();
        let step = SocStep {
            at,
            soc_kwh: 1300.0,
            soc_pct: 65.0,
            charging: false,
            charge_kwh: Some(0.0),
            supply_kw: Some(1000.0),
        };
        let s = format!("{step}");
        assert!(s.contains("2024-04-01 00:30"));
    }
}
