//! End-to-end runs for every built-in preset.

use std::str::FromStr;

use bess_sim::config::SimulatorConfig;
use bess_sim::dispatch::GreedyDispatch;
use bess_sim::generator::{Scenario, generate_market_data, sample_day_start};

#[test]
fn every_preset_produces_a_full_schedule() {
    for name in SimulatorConfig::PRESETS {
        let config = SimulatorConfig::from_preset(name).expect("preset loads");
        assert!(config.validate().is_empty(), "preset \"{name}\" validates");

        let scenario = Scenario::from_str(&config.run.scenario).expect("preset scenario parses");
        let data = generate_market_data(
            sample_day_start(),
            config.run.horizon_hours,
            config.run.interval_minutes,
            scenario,
            config.run.seed,
        );

        let mut battery = config
            .battery
            .build(config.run.dt_hours())
            .expect("preset battery builds");
        let schedule = GreedyDispatch
            .optimize(&mut battery, &data.prices, &data.forecasts)
            .expect("preset run succeeds");

        assert_eq!(schedule.len(), config.run.periods(), "preset \"{name}\"");
        for row in schedule.rows() {
            assert!(
                row.power_mw.abs() <= config.battery.max_power_mw + 1e-12,
                "preset \"{name}\" exceeds its power rating"
            );
        }
    }
}

#[test]
fn peak_chaser_runs_a_two_day_horizon() {
    let config = SimulatorConfig::from_preset("peak_chaser").expect("preset loads");
    assert_eq!(config.run.periods(), 576);

    let scenario = Scenario::from_str(&config.run.scenario).expect("scenario parses");
    let data = generate_market_data(
        sample_day_start(),
        config.run.horizon_hours,
        config.run.interval_minutes,
        scenario,
        config.run.seed,
    );
    assert_eq!(data.prices.len(), 576);

    // The second day repeats the hour-of-day pattern with fresh noise.
    let first_day_mean: f64 = data.prices.values()[..288].iter().sum::<f64>() / 288.0;
    let second_day_mean: f64 = data.prices.values()[288..].iter().sum::<f64>() / 288.0;
    assert!((first_day_mean - second_day_mean).abs() < 15.0);
}
