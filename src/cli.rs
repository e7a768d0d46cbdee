use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::config::{ConfigError, ScenarioConfig};
use crate::series::overlay::{Period, Reduce};
use crate::series::selector::PRICE_COLUMN;
use crate::sim::strategy::Strategy;

#[derive(Debug, Parser)]
#[command(name = "soc-sim", author, version, about = "Battery SOC simulation over half-hour records")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Simulate the SOC trajectory and derive charging costs.
    Simulate(SimulateArgs),

    /// Compute the primary-reserve export offer per slot.
    Offer(OfferArgs),

    /// Write the price overlay (one column per date), optionally aggregated
    /// into daily or monthly buckets.
    Overlay(OverlayArgs),
}

/// Where the scenario comes from; the `default` preset when neither is given.
#[derive(Debug, Clone, ClapArgs)]
pub struct ScenarioArgs {
    /// Scenario TOML file.
    #[arg(long, conflicts_with = "preset")]
    pub scenario: Option<PathBuf>,

    /// Built-in preset (default, price_optimized, weekly).
    #[arg(long)]
    pub preset: Option<String>,
}

impl ScenarioArgs {
    /// Loads the selected scenario.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for unreadable files, invalid TOML or an
    /// unknown preset.
    pub fn load(&self) -> Result<ScenarioConfig, ConfigError> {
        match (&self.scenario, &self.preset) {
            (Some(path), _) => ScenarioConfig::from_toml_file(path),
            (None, Some(name)) => ScenarioConfig::from_preset(name),
            (None, None) => Ok(ScenarioConfig::default_preset()),
        }
    }
}

/// Window overrides, inclusive whole days.
#[derive(Debug, Clone, ClapArgs)]
pub struct WindowArgs {
    /// First day to include (YYYY-MM-DD).
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD).
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Parser)]
pub struct SimulateArgs {
    /// Half-hour record CSV.
    #[arg(long, short)]
    pub input: PathBuf,

    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Recharge strategy, overriding the scenario.
    #[arg(long)]
    pub strategy: Option<Strategy>,

    #[command(flatten)]
    pub window: WindowArgs,

    /// SOC trajectory CSV.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Charging cost CSV.
    #[arg(long)]
    pub cost_out: Option<PathBuf>,

    /// Run report as JSON.
    #[arg(long)]
    pub report_json: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct OfferArgs {
    /// Half-hour record CSV.
    #[arg(long, short)]
    pub input: PathBuf,

    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Export cap (kW), overriding the scenario.
    #[arg(long)]
    pub export_cap_kw: Option<f64>,

    #[command(flatten)]
    pub window: WindowArgs,

    /// Offer CSV.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct OverlayArgs {
    /// Half-hour record CSV.
    #[arg(long, short)]
    pub input: PathBuf,

    /// Overlay CSV.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Also aggregate `--column` into calendar buckets.
    #[arg(long, value_enum)]
    pub aggregate: Option<Period>,

    /// Reduction within each bucket.
    #[arg(long, value_enum, default_value_t = Reduce::Mean)]
    pub reduce: Reduce,

    /// Column to aggregate.
    #[arg(long, default_value = PRICE_COLUMN)]
    pub column: String,

    /// Aggregate CSV.
    #[arg(long, requires = "aggregate")]
    pub aggregate_out: Option<PathBuf>,
}
