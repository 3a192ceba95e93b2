//! TOML-based simulator configuration and preset definitions.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::battery::{Battery, MAX_SOC, MIN_SOC};
use crate::error::SimError;
use crate::generator::Scenario;

/// Top-level simulator configuration parsed from TOML.
///
/// All fields have defaults matching the baseline preset. Load from TOML
/// with [`SimulatorConfig::from_toml_file`] or use
/// [`SimulatorConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulatorConfig {
    /// Battery physical parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Dispatch run parameters.
    #[serde(default)]
    pub run: RunConfig,
}

/// Battery physical parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Usable energy capacity (MWh).
    pub capacity_mwh: f64,
    /// Symmetric charge/discharge power rating (MW).
    pub max_power_mw: f64,
    /// Round-trip efficiency (0–1].
    pub round_trip_efficiency: f64,
    /// Initial state of charge (within the 0.10–0.90 guard-band).
    pub initial_soc: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_mwh: 100.0,
            max_power_mw: 20.0,
            round_trip_efficiency: 0.92,
            initial_soc: 0.5,
        }
    }
}

impl BatteryConfig {
    /// Builds a fresh per-run [`Battery`] for the given interval length.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidConfiguration` for parameters outside
    /// their physically valid ranges.
    pub fn build(&self, dt_hours: f64) -> Result<Battery, SimError> {
        Battery::new(
            self.capacity_mwh,
            self.max_power_mw,
            self.round_trip_efficiency,
            self.initial_soc,
            dt_hours,
        )
    }
}

/// Upper bound on the dispatch horizon (one year of hours).
pub const MAX_HORIZON_HOURS: u32 = 8760;

/// Dispatch run parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Time horizon to dispatch over (hours, in `1..=MAX_HORIZON_HOURS`).
    pub horizon_hours: u32,
    /// Interval granularity (minutes, must be > 0 and divide an hour).
    pub interval_minutes: u32,
    /// Price scenario: `"normal"`, `"volatile"`, or `"high_peaks"`.
    pub scenario: String,
    /// Master random seed for the synthetic data generator.
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            horizon_hours: 24,
            interval_minutes: 5,
            scenario: "normal".to_string(),
            seed: 42,
        }
    }
}

impl RunConfig {
    /// Interval length in hours.
    pub fn dt_hours(&self) -> f64 {
        f64::from(self.interval_minutes) / 60.0
    }

    /// Number of intervals in the horizon.
    ///
    /// Computed in `u64` so an out-of-range horizon cannot overflow before
    /// validation catches it.
    pub fn periods(&self) -> usize {
        (u64::from(self.horizon_hours) * 60 / u64::from(self.interval_minutes)) as usize
    }
}

impl SimulatorConfig {
    /// Returns the baseline preset: 100 MWh / 20 MW battery at 92%
    /// round-trip efficiency, a 24 h horizon of 5-minute intervals, normal
    /// prices.
    pub fn baseline() -> Self {
        Self {
            battery: BatteryConfig::default(),
            run: RunConfig::default(),
        }
    }

    /// Returns the volatile-day preset: heavy price noise with a slightly
    /// lossier battery.
    pub fn volatile_day() -> Self {
        Self {
            battery: BatteryConfig {
                round_trip_efficiency: 0.88,
                ..BatteryConfig::default()
            },
            run: RunConfig {
                scenario: "volatile".to_string(),
                ..RunConfig::default()
            },
        }
    }

    /// Returns the peak-chaser preset: spiky prices, a higher power rating,
    /// and a two-day horizon.
    pub fn peak_chaser() -> Self {
        Self {
            battery: BatteryConfig {
                max_power_mw: 25.0,
                initial_soc: 0.3,
                ..BatteryConfig::default()
            },
            run: RunConfig {
                horizon_hours: 48,
                scenario: "high_peaks".to_string(),
                ..RunConfig::default()
            },
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "volatile_day", "peak_chaser"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns an error if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, SimError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "volatile_day" => Ok(Self::volatile_day()),
            "peak_chaser" => Ok(Self::peak_chaser()),
            _ => Err(SimError::invalid_config(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, SimError> {
        let content = fs::read_to_string(path).map_err(|e| {
            SimError::invalid_config("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, SimError> {
        toml::from_str(s).map_err(|e| SimError::invalid_config("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<SimError> {
        let mut errors = Vec::new();

        let b = &self.battery;
        if !(b.capacity_mwh.is_finite() && b.capacity_mwh > 0.0) {
            errors.push(SimError::invalid_config(
                "battery.capacity_mwh",
                "must be > 0",
            ));
        }
        if !(b.max_power_mw.is_finite() && b.max_power_mw > 0.0) {
            errors.push(SimError::invalid_config(
                "battery.max_power_mw",
                "must be > 0",
            ));
        }
        if !(b.round_trip_efficiency.is_finite()
            && b.round_trip_efficiency > 0.0
            && b.round_trip_efficiency <= 1.0)
        {
            errors.push(SimError::invalid_config(
                "battery.round_trip_efficiency",
                "must be in (0, 1]",
            ));
        }
        if !(b.initial_soc.is_finite() && (MIN_SOC..=MAX_SOC).contains(&b.initial_soc)) {
            errors.push(SimError::invalid_config(
                "battery.initial_soc",
                format!("must be in [{MIN_SOC}, {MAX_SOC}]"),
            ));
        }

        let r = &self.run;
        if r.horizon_hours == 0 || r.horizon_hours > MAX_HORIZON_HOURS {
            errors.push(SimError::invalid_config(
                "run.horizon_hours",
                format!("must be in [1, {MAX_HORIZON_HOURS}]"),
            ));
        }
        if r.interval_minutes == 0 || 60 % r.interval_minutes != 0 {
            errors.push(SimError::invalid_config(
                "run.interval_minutes",
                "must be > 0 and divide 60",
            ));
        }
        if let Err(e) = Scenario::from_str(&r.scenario) {
            errors.push(SimError::invalid_config("run.scenario", e.to_string()));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = SimulatorConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn all_presets_are_valid() {
        for name in SimulatorConfig::PRESETS {
            let cfg = SimulatorConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn from_preset_unknown() {
        let err = SimulatorConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let msg = err.err().map(|e| e.to_string()).unwrap_or_default();
        assert!(msg.contains("unknown preset"));
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[battery]
capacity_mwh = 50.0
max_power_mw = 10.0
round_trip_efficiency = 0.85
initial_soc = 0.4

[run]
horizon_hours = 12
interval_minutes = 15
scenario = "volatile"
seed = 99
"#;
        let cfg = SimulatorConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.battery.capacity_mwh), Some(50.0));
        assert_eq!(cfg.as_ref().map(|c| c.run.horizon_hours), Some(12));
        assert_eq!(cfg.as_ref().map(|c| &*c.run.scenario), Some("volatile"));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[run]
seed = 99
"#;
        let cfg = SimulatorConfig::from_toml_str(toml);
        assert!(cfg.is_ok());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.run.seed), Some(99));
        assert_eq!(cfg.as_ref().map(|c| c.run.interval_minutes), Some(5));
        assert_eq!(cfg.as_ref().map(|c| c.battery.capacity_mwh), Some(100.0));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[battery]
capacity_mwh = 100.0
bogus_field = true
"#;
        assert!(SimulatorConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn validation_catches_bad_efficiency() {
        let mut cfg = SimulatorConfig::baseline();
        cfg.battery.round_trip_efficiency = 1.2;
        let errors = cfg.validate();
        assert!(errors.iter().any(
            |e| matches!(e, SimError::InvalidConfiguration { field, .. } if field == "battery.round_trip_efficiency")
        ));
    }

    #[test]
    fn validation_catches_soc_outside_guard_band() {
        let mut cfg = SimulatorConfig::baseline();
        cfg.battery.initial_soc = 0.95;
        let errors = cfg.validate();
        assert!(errors.iter().any(
            |e| matches!(e, SimError::InvalidConfiguration { field, .. } if field == "battery.initial_soc")
        ));
    }

    #[test]
    fn validation_catches_oversized_horizon() {
        let mut cfg = SimulatorConfig::baseline();
        cfg.run.horizon_hours = u32::MAX;
        let errors = cfg.validate();
        assert!(errors.iter().any(
            |e| matches!(e, SimError::InvalidConfiguration { field, .. } if field == "run.horizon_hours")
        ));
    }

    #[test]
    fn periods_do_not_overflow_at_the_horizon_bound() {
        let mut run = RunConfig::default();
        run.horizon_hours = MAX_HORIZON_HOURS;
        assert_eq!(run.periods(), 105_120);
        // Even an out-of-range horizon computes without wrapping.
        run.horizon_hours = u32::MAX;
        assert_eq!(run.periods(), u64::from(u32::MAX) as usize * 12);
    }

    #[test]
    fn validation_catches_bad_interval() {
        let mut cfg = SimulatorConfig::baseline();
        cfg.run.interval_minutes = 7;
        let errors = cfg.validate();
        assert!(errors.iter().any(
            |e| matches!(e, SimError::InvalidConfiguration { field, .. } if field == "run.interval_minutes")
        ));
    }

    #[test]
    fn validation_catches_unknown_scenario() {
        let mut cfg = SimulatorConfig::baseline();
        cfg.run.scenario = "stormy".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(
            |e| matches!(e, SimError::InvalidConfiguration { field, .. } if field == "run.scenario")
        ));
    }

    #[test]
    fn run_config_derived_values() {
        let run = RunConfig::default();
        assert!((run.dt_hours() - 1.0 / 12.0).abs() < 1e-12);
        assert_eq!(run.periods(), 288);
    }

    #[test]
    fn battery_config_builds_a_battery() {
        let cfg = BatteryConfig::default();
        let battery = cfg.build(1.0 / 12.0);
        assert!(battery.is_ok());
        assert_eq!(battery.map(|b| b.soc()).ok(), Some(0.5));
    }
}
