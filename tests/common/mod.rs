//! Shared test fixtures for integration tests.

use bess_sim::battery::Battery;
use bess_sim::config::{BatteryConfig, RunConfig};
use bess_sim::generator::{Scenario, generate_market_data, sample_day_start};
use bess_sim::series::MarketData;

/// Canonical 5-minute interval in hours.
pub const DT_HOURS: f64 = 1.0 / 12.0;

/// Default battery (100 MWh, 20 MW, 92% round-trip, 50% SOC, 5-minute interval).
pub fn default_battery() -> Battery {
    BatteryConfig::default()
        .build(DT_HOURS)
        .expect("default battery config is valid")
}

/// A battery with a custom initial SOC and round-trip efficiency.
pub fn battery_with(initial_soc: f64, round_trip_efficiency: f64) -> Battery {
    BatteryConfig {
        initial_soc,
        round_trip_efficiency,
        ..BatteryConfig::default()
    }
    .build(DT_HOURS)
    .expect("test battery config is valid")
}

/// One sample day of market data for the given scenario, fixed seed.
pub fn sample_day(scenario: Scenario) -> MarketData {
    let run = RunConfig::default();
    generate_market_data(
        sample_day_start(),
        run.horizon_hours,
        run.interval_minutes,
        scenario,
        run.seed,
    )
}
