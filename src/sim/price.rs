//! Price-optimized simulator: day-by-day greedy recharge into the cheapest slots.

use chrono::NaiveDate;
use itertools::Itertools;
use tracing::debug;

use super::allocation::allocate_cheapest_first;
use super::clock::Clock;
use super::strategy::SocSimulator;
use super::types::{BatteryParams, EPSILON_KWH, SLOT_HOURS, Slot, SocStep};

/// Simulates a battery that always serves load and, on reset days, places the
/// day's recharge requirement into the cheapest slots with converter headroom.
///
/// Each day runs three separate passes: a discharge-only shadow pass that
/// sizes the requirement, the greedy allocation, and a replay that applies
/// discharge and allocated charge slot by slot against the real SOC.
#[derive(Debug, Clone, Copy)]
pub struct PriceOptimized {
    params: BatteryParams,
    window_start: Option<NaiveDate>,
}

impl PriceOptimized {
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

    /// SOC at the end of the day if nothing were charged.
    fn shadow_end_kwh(&self, start_kwh: f64, supply_kw: &[f64]) -> f64 {
        supply_kw
            .iter()
            .fold(start_kwh, |energy, &supply| self.params.discharge(energy, supply))
    }

    /// Charging headroom per slot: converter budget left after serving load,
    /// capped by the charger rating, as energy.
    fn headroom_kwh(&self, supply_kw: f64) -> f64 {
        let p = &self.params;
        p.charger_kw.min(p.pcs_kw - supply_kw).max(0.0) * SLOT_HOURS
    }

    /// Runs one calendar day starting from `energy_kwh` and appends its steps.
    fn simulate_day(
        &self,
        day_index: i64,
        day: &[Slot],
        energy_kwh: &mut f64,
        steps: &mut Vec<SocStep>,
    ) {
        let p = &self.params;
        let target = p.target_kwh();

        let supply: Vec<f64> = day
            .iter()
            .map(|s| p.supply_kw(s.load_kw, s.generation_kw))
            .collect();

        let required_kwh = if p.is_reset_day(day_index) {
            (target - self.shadow_end_kwh(*energy_kwh, &supply)).max(0.0)
        } else {
            0.0
        };

        let allocation = if required_kwh > 0.0 {
            let prices: Vec<f64> = day.iter().map(|s| s.price).collect();
            let capacities: Vec<f64> = supply.iter().map(|&s| self.headroom_kwh(s)).collect();
            let allocation = allocate_cheapest_first(&prices, &capacities, required_kwh);
            let placed: f64 = allocation.iter().sum();
            if placed + EPSILON_KWH < required_kwh {
                debug!(
                    date = %day[0].at.date(),
                    required_kwh,
                    placed_kwh = placed,
                    "recharge limited by headroom"
                );
            }
            allocation
        } else {
            vec![0.0; day.len()]
        };

        for ((slot, &supply_kw), &allocated) in day.iter().zip(&supply).zip(&allocation) {
            *energy_kwh = p.discharge(*energy_kwh, supply_kw);
            let applied = allocated.min((target - *energy_kwh).max(0.0));
            *energy_kwh += applied;
            steps.push(SocStep {
                at: slot.at,
                soc_kwh: *energy_kwh,
                soc_pct: p.soc_pct(*energy_kwh),
                charging: applied > 0.0,
                charge_kwh: Some(applied),
                supply_kw: Some(supply_kw),
            });
        }
    }
}

impl SocSimulator for PriceOptimized {
    fn simulate(&self, slots: &[Slot]) -> Vec<SocStep> {
        let Some(clock) = Clock::starting_at(slots.first().map(|s| s.at), self.window_start) else {
            return Vec::new();
        };

        let mut energy_kwh = self.params.target_kwh();
        let mut steps = Vec::with_capacity(slots.len());

        for (_, day) in &slots.iter().chunk_by(|s| s.at.date()) {
            let day: Vec<Slot> = day.copied().collect();
            let day_index = clock.day_index(day[0].at);
            self.simulate_day(day_index, &day, &mut energy_kwh, &mut steps);
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    use super::*;
    use crate::sim::types::SLOTS_PER_DAY;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 4, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap()
    }

    fn slots(days: usize, load_kw: f64, price: impl Fn(usize) -> f64) -> Vec<Slot> {
        (0..days * SLOTS_PER_DAY)
            .map(|i| Slot {
                at: start() + Duration::minutes(30 * i as i64),
                load_kw,
                generation_kw: 0.0,
                price: price(i % SLOTS_PER_DAY),
            })
            .collect()
    }

    fn params(reset_every_days: u32) -> BatteryParams {
        BatteryParams::new(1000.0, 1000.0, 2000.0, 90.0, 10.0, reset_every_days)
    }

    #[test]
    fn empty_window() {
        assert!(PriceOptimized::new(params(1)).simulate(&[]).is_empty());
    }

    #[test]
    fn idle_battery_stays_at_target() {
        let steps = PriceOptimized::new(params(1)).simulate(&slots(2, 0.0, |_| 10.0));
        assert_eq!(steps.len(), 96);
        assert!(steps.iter().all(|s| !s.charging));
        assert!(steps.iter().all(|s| (s.soc_kwh - 1800.0).abs() < 1e-9));
    }

    fn charged_slots(steps: &[SocStep]) -> Vec<usize> {
        steps
            .iter()
            .enumerate()
            .filter(|(_, s)| s.charging)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn recharge_goes_to_cheapest_slot() {
        // One 1000 kW slot drains 500 kWh; slot 40 is the cheapest.
        let mut input = slots(1, 0.0, |i| if i == 40 { 1.0 } else { 20.0 });
        input[0].load_kw = 1000.0;
        let steps = PriceOptimized::new(params(1)).simulate(&input);
        assert_eq!(charged_slots(&steps), vec![40]);
        assert_abs_diff_eq!(steps[40].charge_kwh.unwrap_or_default(), 500.0);
        assert_abs_diff_eq!(steps[47].soc_kwh, 1800.0);
    }

    #[test]
    fn overflow_continues_in_time_order_among_equal_prices() {
        // Four saturated slots drain to the floor: R = 1600 kWh with 500 kWh
        // headroom per idle slot. Slots 10 and 11 are cheap.
        let mut input = slots(1, 0.0, |i| if i == 10 || i == 11 { 1.0 } else { 20.0 });
        for slot in &mut input[..4] {
            slot.load_kw = 1000.0;
        }
        let steps = PriceOptimized::new(params(1)).simulate(&input);
        assert_eq!(charged_slots(&steps), vec![4, 5, 10, 11]);
        let charge: Vec<f64> = [4, 5, 10, 11]
            .iter()
            .map(|&i| steps[i].charge_kwh.unwrap_or_default())
            .collect();
        assert_eq!(charge, vec![500.0, 100.0, 500.0, 500.0]);
        assert_abs_diff_eq!(steps[47].soc_kwh, 1800.0);
    }

    #[test]
    fn non_reset_day_does_not_charge() {
        let steps = PriceOptimized::new(params(2)).simulate(&slots(2, 100.0, |_| 5.0));
        assert!(steps[SLOTS_PER_DAY..].iter().all(|s| !s.charging));
        assert!(
            steps[SLOTS_PER_DAY..]
                .iter()
                .all(|s| s.charge_kwh == Some(0.0))
        );
    }

    #[test]
    fn reset_days_count_from_window_start() {
        // Window opens a day before the records, so the first record day is
        // day 1 and, with a two-day cadence, not a reset day.
        let mut input = slots(2, 0.0, |_| 5.0).split_off(SLOTS_PER_DAY);
        input[0].load_kw = 1000.0;
        let sim = PriceOptimized::new(params(2));

        let anchored = sim.with_window_start(Some(start().date())).simulate(&input);
        assert!(anchored.iter().all(|s| !s.charging));

        let unanchored = sim.simulate(&input);
        assert!(unanchored.iter().any(|s| s.charging));
    }

    #[test]
    fn load_is_served_while_charging() {
        let steps = PriceOptimized::new(params(1)).simulate(&slots(1, 1200.0, |i| i as f64));
        assert!(steps.iter().all(|s| s.supply_kw == Some(1000.0)));
        // The converter is saturated by load, so there is no headroom at all.
        assert!(steps.iter().all(|s| !s.charging));
        assert_abs_diff_eq!(steps[47].soc_kwh, 200.0);
    }
}
