//! API request and response types.
//!
//! The optimize response uses the original columnar schedule layout:
//! parallel arrays keyed by an ISO 8601 timestamp index.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::battery::BatteryState;
use crate::dispatch::{Schedule, ScheduleSummary};

/// Request body for `POST /api/optimize`.
///
/// Every field is optional; omitted fields fall back to the configured run
/// defaults. `start_time` defaults to the current wall-clock time, so
/// reproducible requests should pin it explicitly.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptimizeRequest {
    pub horizon_hours: Option<u32>,
    pub interval_minutes: Option<u32>,
    pub scenario: Option<String>,
    pub seed: Option<u64>,
    pub start_time: Option<NaiveDateTime>,
}

/// Columnar schedule layout: one entry per interval in each array.
#[derive(Debug, Serialize)]
pub struct ScheduleColumns {
    /// ISO 8601 timestamps (`%Y-%m-%dT%H:%M:%S`).
    pub index: Vec<String>,
    pub price: Vec<f64>,
    pub power_mw: Vec<f64>,
    pub soc: Vec<f64>,
    pub profit: Vec<f64>,
    pub energy_charged: Vec<f64>,
    pub energy_discharged: Vec<f64>,
}

impl From<&Schedule> for ScheduleColumns {
    fn from(schedule: &Schedule) -> Self {
        let rows = schedule.rows();
        Self {
            index: rows
                .iter()
                .map(|r| r.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string())
                .collect(),
            price: rows.iter().map(|r| r.price).collect(),
            power_mw: rows.iter().map(|r| r.power_mw).collect(),
            soc: rows.iter().map(|r| r.soc).collect(),
            profit: rows.iter().map(|r| r.profit).collect(),
            energy_charged: rows.iter().map(|r| r.energy_charged_mwh).collect(),
            energy_discharged: rows.iter().map(|r| r.energy_discharged_mwh).collect(),
        }
    }
}

/// Aggregate metrics in the public API contract:
/// - `total_energy_charged_mwh` → `energy_charged`
/// - `total_energy_discharged_mwh` → `energy_discharged`
#[derive(Debug, Serialize)]
pub struct Metrics {
    pub total_profit: f64,
    pub energy_charged: f64,
    pub energy_discharged: f64,
    pub final_soc: f64,
}

impl From<&ScheduleSummary> for Metrics {
    fn from(s: &ScheduleSummary) -> Self {
        Self {
            total_profit: s.total_profit,
            energy_charged: s.total_energy_charged_mwh,
            energy_discharged: s.total_energy_discharged_mwh,
            final_soc: s.final_soc,
        }
    }
}

/// Response body for `POST /api/optimize`.
#[derive(Debug, Serialize)]
pub struct OptimizeResponse {
    pub success: bool,
    pub schedule: ScheduleColumns,
    pub metrics: Metrics,
}

impl From<&Schedule> for OptimizeResponse {
    fn from(schedule: &Schedule) -> Self {
        Self {
            success: true,
            schedule: ScheduleColumns::from(schedule),
            metrics: Metrics::from(&schedule.summary()),
        }
    }
}

/// Response body for `GET /api/battery/status`.
#[derive(Debug, Serialize)]
pub struct BatteryStatusResponse {
    pub capacity_mwh: f64,
    pub max_power_mw: f64,
    pub current_soc: f64,
    pub round_trip_efficiency: f64,
    pub available_charge_mw: f64,
    pub available_discharge_mw: f64,
}

impl From<&BatteryState> for BatteryStatusResponse {
    fn from(s: &BatteryState) -> Self {
        Self {
            capacity_mwh: s.capacity_mwh,
            max_power_mw: s.max_power_mw,
            current_soc: s.soc,
            round_trip_efficiency: s.round_trip_efficiency,
            available_charge_mw: s.available_charge_mw,
            available_discharge_mw: s.available_discharge_mw,
        }
    }
}

/// Request body for `POST /api/battery/configure`.
///
/// Each field is independently settable; omitted fields keep their current
/// values.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigureRequest {
    pub capacity_mwh: Option<f64>,
    pub max_power_mw: Option<f64>,
    pub round_trip_efficiency: Option<f64>,
    pub initial_soc: Option<f64>,
}

/// Response body for `POST /api/battery/configure`.
#[derive(Debug, Serialize)]
pub struct ConfigureResponse {
    pub success: bool,
    pub message: String,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
