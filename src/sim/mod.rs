/// Greedy cheapest-first energy allocation.
pub mod allocation;
/// Calendar anchored at the simulation window start.
pub mod clock;
/// Charging cost per slot from a trajectory and prices.
pub mod cost;
/// Run summaries for printing and JSON export.
pub mod kpi;
/// Fixed-rate recharge on a day cadence.
pub mod periodic;
/// Greedy recharge into the cheapest slots of reset days.
pub mod price;
/// Recharge strategies and the simulator trait.
pub mod strategy;
/// Battery parameters, input slots and trajectory steps.
pub mod types;

pub use cost::{CostStep, derive_costs};
pub use kpi::RunReport;
pub use periodic::PeriodicReset;
pub use price::PriceOptimized;
pub use strategy::{SocSimulator, Strategy};
pub use types::{BatteryParams, Slot, SocStep};
