//! Periodic-reset simulator: fixed-rate recharge on a day cadence.

use chrono::NaiveDate;
use tracing::debug;

use super::clock::Clock;
use super::strategy::SocSimulator;
use super::types::{BatteryParams, EPSILON_KWH, SLOT_HOURS, Slot, SocStep};

/// Simulates a battery that discharges to serve load and, at local midnight on
/// every `reset_every_days`-th day, switches to charging at the charger rating
/// until the target level is reached.
///
/// Load is not served during charging slots.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicReset {
    params: BatteryParams,
    window_start: Option<NaiveDate>,
}

/// State threaded through the slot fold.
#[derive(Debug, Clone, Copy)]
struct ResetState {
    energy_kwh: f64,
    charging: bool,
    deficit_kwh: f64,
}

impl PeriodicReset {
    pub fn new(params: BatteryParams) -> Self {
        Self {
            params,
            window_start: None,
        }
    }

    /// Counts reset days from `date` instead of the first slot's date.
    pub fn with_window_start(mut self, date: Option<NaiveDate>) -> Self {
        self.window_start = date;
        self
    }

    /// Advances the state by one slot and returns whether the slot was charging.
    fn step(&self, clock: &Clock, state: &mut ResetState, slot: &Slot) -> bool {
        let p = &self.params;
        let target = p.target_kwh();

        if Clock::is_midnight(slot.at) && p.is_reset_day(clock.day_index(slot.at)) {
            state.deficit_kwh = (target - state.energy_kwh).max(0.0);
            state.charging = state.deficit_kwh > 0.0;
            if state.charging {
                debug!(at = %slot.at, deficit_kwh = state.deficit_kwh, "recharge triggered");
            }
        }

        if state.charging {
            let step_kwh = (p.charger_kw * SLOT_HOURS).min(state.deficit_kwh);
            let before = state.energy_kwh;
            state.energy_kwh = (state.energy_kwh + step_kwh).min(target);
            state.deficit_kwh -= state.energy_kwh - before;
            if state.deficit_kwh < EPSILON_KWH || state.energy_kwh >= target - EPSILON_KWH {
                state.charging = false;
            }
            true
        } else {
            let supply_kw = p.supply_kw(slot.load_kw, slot.generation_kw);
            state.energy_kwh = p.discharge(state.energy_kwh, supply_kw);
            false
        }
    }
}

impl SocSimulator for PeriodicReset {
    fn simulate(&self, slots: &[Slot]) -> Vec<SocStep> {
        let Some(clock) = Clock::starting_at(slots.first().map(|s| s.at), self.window_start) else {
            return Vec::new();
        };

        let mut state = ResetState {
            energy_kwh: self.params.target_kwh(),
            charging: false,
            deficit_kwh: 0.0,
        };

        slots
            .iter()
            .map(|slot| {
                let charging = self.step(&clock, &mut state, slot);
                SocStep {
                    at: slot.at,
                    soc_kwh: state.energy_kwh,
                    soc_pct: self.params.soc_pct(state.energy_kwh),
                    charging,
                    charge_kwh: None,
                    supply_kw: None,
                }
            })
            .collect()
    }
}
