//! Recharge strategies and the simulator contract they share.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::periodic::PeriodicReset;
use super::price::PriceOptimized;
use super::types::{BatteryParams, Slot, SocStep};

/// A SOC simulator: a pure function from aligned slots to a trajectory.
///
/// Implementations hold only immutable settings; the stored energy
/// lives inside one `simulate` call, so a simulator can be reused and shared
/// freely across runs.
pub trait SocSimulator {
    /// Simulates the window. An empty window yields an empty trajectory.
    fn simulate(&self, slots: &[Slot]) -> Vec<SocStep>;
}

/// Recharge policy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Fixed-rate recharge at midnight of every reset day, discharge suspended.
    #[default]
    PeriodicReset,
    /// Greedy recharge into the cheapest slots of every reset day.
    PriceOptimized,
}

impl Strategy {
    pub const NAMES: &[&str] = &["periodic_reset", "price_optimized"];

    /// Runs the selected simulator over `slots`, counting days from the
    /// first slot.
    pub fn simulate(self, params: BatteryParams, slots: &[Slot]) -> Vec<SocStep> {
        self.simulate_from(params, None, slots)
    }

    /// Runs the selected simulator with day 0 at `window_start` when given.
    pub fn simulate_from(
        self,
        params: BatteryParams,
        window_start: Option<NaiveDate>,
        slots: &[Slot],
    ) -> Vec<SocStep> {
        match self {
            Self::PeriodicReset => PeriodicReset::new(params)
                .with_window_start(window_start)
                .simulate(slots),
            Self::PriceOptimized => PriceOptimized::new(params)
                .with_window_start(window_start)
                .simulate(slots),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PeriodicReset => "periodic_reset",
            Self::PriceOptimized => "price_optimized",
        })
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "periodic_reset" | "periodic" => Ok(Self::PeriodicReset),
            "price_optimized" | "price" => Ok(Self::PriceOptimized),
            other => Err(format!(
                "unknown strategy \"{other}\", available: {}",
                Self::NAMES.join(", ")
            )),
        }
    }
}
