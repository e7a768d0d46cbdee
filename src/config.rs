//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::series::ColumnOverrides;
use crate::sim::strategy::Strategy;
use crate::sim::types::BatteryParams;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the `default` preset. Load from TOML
/// with [`ScenarioConfig::from_toml_file`] or start from
/// [`ScenarioConfig::from_preset`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Battery and converter ratings.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Recharge cadence, strategy and simulation window.
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Explicit load/generation column choices.
    #[serde(default)]
    pub columns: ColumnsConfig,
    /// Export-offer settings.
    #[serde(default)]
    pub offer: OfferConfig,
}

/// Battery and converter ratings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Converter (PCS) power rating (kW).
    pub pcs_kw: f64,
    /// Charger power rating (kW).
    pub charger_kw: f64,
    /// Nominal energy capacity (kWh).
    pub capacity_kwh: f64,
    /// Target/reset SOC (% of capacity).
    pub soc_init_pct: f64,
    /// Discharge floor SOC (% of capacity).
    pub soc_floor_pct: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            pcs_kw: 1000.0,
            charger_kw: 1000.0,
            capacity_kwh: 2000.0,
            soc_init_pct: 90.0,
            soc_floor_pct: 10.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Recharge cadence in days (must be >= 1).
    pub reset_every_days: u32,
    pub strategy: Strategy,
    /// First simulated day (inclusive).
    pub start_date: Option<NaiveDate>,
    /// Last simulated day (inclusive).
    pub end_date: Option<NaiveDate>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            reset_every_days: 4,
            strategy: Strategy::PeriodicReset,
            start_date: None,
            end_date: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnsConfig {
    pub load: Option<String>,
    pub generation: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OfferConfig {
    /// Upper bound on the export offer (kW); unbounded when absent.
    pub export_cap_kw: Option<f64>,
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"battery.capacity_kwh"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the default scenario: 1 MW converter and charger, 2 MWh
    /// storage, 90 % target, 10 % floor, recharge every fourth day.
    pub fn default_preset() -> Self {
        Self::default()
    }

    /// Same ratings as the default, recharging into the cheapest slots.
    pub fn price_optimized() -> Self {
        Self {
            schedule: ScheduleConfig {
                strategy: Strategy::PriceOptimized,
                ..ScheduleConfig::default()
            },
            ..Self::default()
        }
    }

    /// Default ratings with a weekly recharge cadence.
    pub fn weekly() -> Self {
        Self {
            schedule: ScheduleConfig {
                reset_every_days: 7,
                ..ScheduleConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["default", "price_optimized", "weekly"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "default" => Ok(Self::default_preset()),
            "price_optimized" => Ok(Self::price_optimized()),
            "weekly" => Ok(Self::weekly()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let b = &self.battery;

        for (field, value) in [
            ("battery.pcs_kw", b.pcs_kw),
            ("battery.charger_kw", b.charger_kw),
            ("battery.capacity_kwh", b.capacity_kwh),
        ] {
            if value.is_nan() || value <= 0.0 {
                errors.push(ConfigError::new(field, "must be > 0"));
            }
        }
        for (field, value) in [
            ("battery.soc_init_pct", b.soc_init_pct),
            ("battery.soc_floor_pct", b.soc_floor_pct),
        ] {
            if !(0.0..=100.0).contains(&value) {
                errors.push(ConfigError::new(field, "must be in [0, 100]"));
            }
        }
        if b.soc_floor_pct > b.soc_init_pct {
            errors.push(ConfigError::new(
                "battery.soc_floor_pct",
                "must be <= battery.soc_init_pct",
            ));
        }

        let s = &self.schedule;
        if s.reset_every_days == 0 {
            errors.push(ConfigError::new("schedule.reset_every_days", "must be >= 1"));
        }
        if let (Some(start), Some(end)) = (s.start_date, s.end_date)
            && start > end
        {
            errors.push(ConfigError::new(
                "schedule.start_date",
                "must be <= schedule.end_date",
            ));
        }

        if let Some(cap) = self.offer.export_cap_kw
            && (cap.is_nan() || cap <= 0.0)
        {
            errors.push(ConfigError::new("offer.export_cap_kw", "must be > 0"));
        }

        errors
    }

    /// Simulator parameters for this scenario.
    pub fn battery_params(&self) -> BatteryParams {
        let b = &self.battery;
        BatteryParams::new(
            b.pcs_kw,
            b.charger_kw,
            b.capacity_kwh,
            b.soc_init_pct,
            b.soc_floor_pct,
            self.schedule.reset_every_days,
        )
    }

    pub fn column_overrides(&self) -> ColumnOverrides {
        ColumnOverrides {
            load: self.columns.load.clone(),
            generation: self.columns.generation.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_preset_valid() {
        let errors = ScenarioConfig::default_preset().validate();
        assert!(errors.is_empty(), "default should be valid: {errors:?}");
    }

    #[test]
    fn default_battery_params() {
        let p = ScenarioConfig::default_preset().battery_params();
        assert_eq!(p, BatteryParams::new(1000.0, 1000.0, 2000.0, 90.0, 10.0, 4));
    }

    #[test]
    fn from_preset_unknown() {
        let err = ScenarioConfig::from_preset("nonexistent").unwrap_err();
        assert_eq!(err.field, "preset");
        assert!(err.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ScenarioConfig::PRESETS {
            let cfg = ScenarioConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(ScenarioConfig::validate).unwrap_or_default();
            assert!(errors.is_empty(), "preset \"{name}\" should be valid: {errors:?}");
        }
    }

    #[test]
    fn presets_differ_where_expected() {
        assert_eq!(
            ScenarioConfig::price_optimized().schedule.strategy,
            Strategy::PriceOptimized
        );
        assert_eq!(ScenarioConfig::weekly().schedule.reset_every_days, 7);
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[battery]
pcs_kw = 500.0
charger_kw = 250.0
capacity_kwh = 1000.0
soc_init_pct = 80.0
soc_floor_pct = 20.0

[schedule]
reset_every_days = 2
strategy = "price_optimized"
start_date = "2024-04-01"
end_date = "2024-04-30"

[columns]
load = "需要kW"
generation = "PV出力"

[offer]
export_cap_kw = 400.0
"#;
        let cfg = ScenarioConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.unwrap();
        assert_eq!(cfg.battery.charger_kw, 250.0);
        assert_eq!(cfg.schedule.strategy, Strategy::PriceOptimized);
        assert_eq!(cfg.schedule.start_date, NaiveDate::from_ymd_opt(2024, 4, 1));
        assert_eq!(cfg.column_overrides().load.as_deref(), Some("需要kW"));
        assert_eq!(cfg.offer.export_cap_kw, Some(400.0));
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[battery]
pcs_kw = 100.0
bogus_field = true
"#;
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let toml = "[schedule]\nstrategy = \"cheapest\"\n";
        assert!(ScenarioConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let cfg = ScenarioConfig::from_toml_str("[battery]\ncapacity_kwh = 500.0\n").unwrap();
        assert_eq!(cfg.battery.capacity_kwh, 500.0);
        assert_eq!(cfg.battery.pcs_kw, 1000.0);
        assert_eq!(cfg.schedule.reset_every_days, 4);
        assert_eq!(cfg.schedule.strategy, Strategy::PeriodicReset);
    }

    #[test]
    fn validation_catches_non_positive_ratings() {
        let mut cfg = ScenarioConfig::default_preset();
        cfg.battery.capacity_kwh = 0.0;
        cfg.battery.charger_kw = -1.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "battery.capacity_kwh"));
        assert!(errors.iter().any(|e| e.field == "battery.charger_kw"));
    }

    #[test]
    fn validation_catches_floor_above_target() {
        let mut cfg = ScenarioConfig::default_preset();
        cfg.battery.soc_floor_pct = 95.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "battery.soc_floor_pct"));
    }

    #[test]
    fn validation_catches_zero_cadence_and_reversed_window() {
        let mut cfg = ScenarioConfig::default_preset();
        cfg.schedule.reset_every_days = 0;
        cfg.schedule.start_date = NaiveDate::from_ymd_opt(2024, 5, 1);
        cfg.schedule.end_date = NaiveDate::from_ymd_opt(2024, 4, 1);
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "schedule.reset_every_days"));
        assert!(errors.iter().any(|e| e.field == "schedule.start_date"));
    }

    #[test]
    fn validation_catches_bad_export_cap() {
        let mut cfg = ScenarioConfig::default_preset();
        cfg.offer.export_cap_kw = Some(0.0);
        assert!(cfg.validate().iter().any(|e| e.field == "offer.export_cap_kw"));
    }
}
