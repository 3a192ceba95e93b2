//! Battery energy storage system (BESS) physical model.

use std::str::FromStr;

use serde::Serialize;

use crate::error::SimError;

/// Operational SOC floor. The battery is never discharged below this bound.
pub const MIN_SOC: f64 = 0.10;

/// Operational SOC ceiling. The battery is never charged above this bound.
pub const MAX_SOC: f64 = 0.90;

/// A grid-scale battery that can charge from and discharge to the grid.
///
/// `Battery` owns the mutable state of charge and enforces the operational
/// guard-band, power rating, and efficiency losses. One instance belongs to
/// exactly one dispatch run at a time; independent runs each build their own.
///
/// # Power Convention
/// - Positive power: discharging to the grid
/// - Negative power: charging from the grid
#[derive(Debug, Clone)]
pub struct Battery {
    /// Usable energy capacity in megawatt-hours.
    capacity_mwh: f64,

    /// Symmetric charge/discharge power rating in megawatts.
    max_power_mw: f64,

    /// Round-trip efficiency in (0, 1].
    round_trip_efficiency: f64,

    /// Charge-side efficiency, `sqrt(round_trip_efficiency)`.
    charge_efficiency: f64,

    /// Discharge-side efficiency, `sqrt(round_trip_efficiency)`.
    discharge_efficiency: f64,

    /// State of charge as a fraction, always within `[MIN_SOC, MAX_SOC]`.
    soc: f64,

    /// SOC restored by [`Battery::reset`] when no target is given.
    initial_soc: f64,

    /// Duration of one dispatch interval in hours. Shared by
    /// [`Battery::available_power`] and [`Battery::step`] so the
    /// energy-to-power conversion and the SOC update can never disagree.
    dt_hours: f64,
}

/// Requested direction for an availability query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryAction {
    Charge,
    Discharge,
}

impl FromStr for BatteryAction {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "charge" => Ok(Self::Charge),
            "discharge" => Ok(Self::Discharge),
            other => Err(SimError::InvalidArgument(format!(
                "unknown action \"{other}\", expected \"charge\" or \"discharge\""
            ))),
        }
    }
}

/// Result of applying one commanded power for one interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// State of charge after the step, clamped to the guard-band.
    pub soc: f64,
    /// Commanded energy change `power_mw * dt_hours` (pre-efficiency).
    pub energy_change_mwh: f64,
    /// The power that was applied (MW, signed).
    pub power_mw: f64,
}

/// Snapshot of battery configuration and current availability.
#[derive(Debug, Clone, Serialize)]
pub struct BatteryState {
    pub soc: f64,
    pub capacity_mwh: f64,
    pub max_power_mw: f64,
    pub round_trip_efficiency: f64,
    pub available_charge_mw: f64,
    pub available_discharge_mw: f64,
}

impl Battery {
    /// Creates a battery from its four configuration scalars and the
    /// dispatch interval length.
    ///
    /// # Errors
    ///
    /// Returns `SimError::InvalidConfiguration` if capacity or power rating
    /// is not strictly positive, the round-trip efficiency is outside
    /// (0, 1], the initial SOC is outside `[MIN_SOC, MAX_SOC]`, or the
    /// interval length is not strictly positive.
    pub fn new(
        capacity_mwh: f64,
        max_power_mw: f64,
        round_trip_efficiency: f64,
        initial_soc: f64,
        dt_hours: f64,
    ) -> Result<Self, SimError> {
        if !(capacity_mwh.is_finite() && capacity_mwh > 0.0) {
            return Err(SimError::invalid_config("capacity_mwh", "must be > 0"));
        }
        if !(max_power_mw.is_finite() && max_power_mw > 0.0) {
            return Err(SimError::invalid_config("max_power_mw", "must be > 0"));
        }
        if !(round_trip_efficiency.is_finite()
            && round_trip_efficiency > 0.0
            && round_trip_efficiency <= 1.0)
        {
            return Err(SimError::invalid_config(
                "round_trip_efficiency",
                "must be in (0, 1]",
            ));
        }
        if !(initial_soc.is_finite() && (MIN_SOC..=MAX_SOC).contains(&initial_soc)) {
            return Err(SimError::invalid_config(
                "initial_soc",
                format!("must be in [{MIN_SOC}, {MAX_SOC}]"),
            ));
        }
        if !(dt_hours.is_finite() && dt_hours > 0.0) {
            return Err(SimError::invalid_config("dt_hours", "must be > 0"));
        }

        // Round-trip losses split evenly between the charge and discharge legs.
        let leg_efficiency = round_trip_efficiency.sqrt();

        Ok(Self {
            capacity_mwh,
            max_power_mw,
            round_trip_efficiency,
            charge_efficiency: leg_efficiency,
            discharge_efficiency: leg_efficiency,
            soc: initial_soc,
            initial_soc,
            dt_hours,
        })
    }

    pub fn soc(&self) -> f64 {
        self.soc
    }

    pub fn capacity_mwh(&self) -> f64 {
        self.capacity_mwh
    }

    pub fn max_power_mw(&self) -> f64 {
        self.max_power_mw
    }

    pub fn round_trip_efficiency(&self) -> f64 {
        self.round_trip_efficiency
    }

    pub fn dt_hours(&self) -> f64 {
        self.dt_hours
    }

    /// Maximum power available for the requested action at the current SOC,
    /// over one interval, capped at the power rating.
    ///
    /// Discharge converts the energy above `MIN_SOC` to power at the interval
    /// rate and reduces it by the discharge efficiency; charge converts the
    /// headroom below `MAX_SOC` and inflates it by the charge efficiency
    /// (more grid power is needed than ends up stored). Returns exactly 0 at
    /// the respective bound.
    pub fn available_power(&self, action: BatteryAction) -> f64 {
        match action {
            BatteryAction::Discharge => {
                let energy_available = (self.soc - MIN_SOC) * self.capacity_mwh;
                let power_from_energy = energy_available / self.dt_hours;
                (power_from_energy * self.discharge_efficiency).min(self.max_power_mw)
            }
            BatteryAction::Charge => {
                let energy_headroom = (MAX_SOC - self.soc) * self.capacity_mwh;
                let power_from_energy = energy_headroom / self.dt_hours;
                (power_from_energy / self.charge_efficiency).min(self.max_power_mw)
            }
        }
    }

    /// Applies a commanded power for one interval and updates the SOC.
    ///
    /// Positive power discharges (battery energy removed is
    /// `power * dt / discharge_efficiency`), negative power charges (stored
    /// energy added is `-power * dt * charge_efficiency`). The resulting SOC
    /// is clamped to `[MIN_SOC, MAX_SOC]` unconditionally; callers that honor
    /// [`Battery::available_power`] never trigger the clamp.
    pub fn step(&mut self, power_mw: f64) -> StepOutcome {
        if power_mw > 0.0 {
            // Discharging
            let energy_out = power_mw * self.dt_hours;
            let energy_from_battery = energy_out / self.discharge_efficiency;
            self.soc -= energy_from_battery / self.capacity_mwh;
        } else if power_mw < 0.0 {
            // Charging
            let energy_in = -power_mw * self.dt_hours;
            let energy_to_battery = energy_in * self.charge_efficiency;
            self.soc += energy_to_battery / self.capacity_mwh;
        }

        self.soc = self.soc.clamp(MIN_SOC, MAX_SOC);

        StepOutcome {
            soc: self.soc,
            energy_change_mwh: power_mw * self.dt_hours,
            power_mw,
        }
    }

    /// Resets the SOC to the given value (clamped to the guard-band) or to
    /// the construction-time initial SOC when omitted.
    pub fn reset(&mut self, soc: Option<f64>) {
        self.soc = match soc {
            Some(s) => s.clamp(MIN_SOC, MAX_SOC),
            None => self.initial_soc,
        };
    }

    /// Snapshot of the configuration and current availability.
    pub fn state(&self) -> BatteryState {
        BatteryState {
            soc: self.soc,
            capacity_mwh: self.capacity_mwh,
            max_power_mw: self.max_power_mw,
            round_trip_efficiency: self.round_trip_efficiency,
            available_charge_mw: self.available_power(BatteryAction::Charge),
            available_discharge_mw: self.available_power(BatteryAction::Discharge),
        }
    }
}
