//! Synthetic electricity price and solar forecast generation.

use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::error::SimError;
use crate::series::{ForecastSet, MarketData, TimeSeries};

/// Base electricity price in currency/MWh.
pub const BASE_PRICE: f64 = 50.0;

/// Seed offset for the solar RNG to avoid correlation with the price noise.
const SOLAR_SEED_OFFSET: u64 = 73;

/// Probability of a price spike per interval in the high-peaks scenario.
const SPIKE_PROBABILITY: f64 = 0.02;

/// Price scenario controlling the stochastic component of the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Moderate noise (σ = 5).
    Normal,
    /// Heavy noise (σ = 15).
    Volatile,
    /// Moderate noise plus occasional spikes of 50–100 currency/MWh.
    HighPeaks,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Volatile => "volatile",
            Self::HighPeaks => "high_peaks",
        }
    }
}

impl FromStr for Scenario {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "volatile" => Ok(Self::Volatile),
            "high_peaks" => Ok(Self::HighPeaks),
            other => Err(SimError::InvalidArgument(format!(
                "unknown scenario \"{other}\", expected \"normal\", \"volatile\", or \"high_peaks\""
            ))),
        }
    }
}

/// Gaussian noise via the Box-Muller transform, mean 0.
fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

fn timestamps(start: NaiveDateTime, periods: usize, interval_minutes: u32) -> Vec<NaiveDateTime> {
    (0..periods)
        .map(|i| start + Duration::minutes(i64::from(interval_minutes) * i as i64))
        .collect()
}

/// Hour-of-day price component: overlapping morning and evening peaks.
fn hour_effect(hour: u32) -> f64 {
    let h = f64::from(hour);
    10.0 * (2.0 * std::f64::consts::PI * (h - 8.0) / 24.0).sin()
        + 15.0 * (2.0 * std::f64::consts::PI * (h - 18.0) / 24.0).sin()
}

/// Generates a synthetic price series.
///
/// Base price plus an hour-of-day effect plus scenario-dependent noise,
/// floored at zero. Deterministic for a given RNG state.
pub fn generate_price_series(
    start: NaiveDateTime,
    periods: usize,
    interval_minutes: u32,
    scenario: Scenario,
    rng: &mut StdRng,
) -> TimeSeries {
    let stamps = timestamps(start, periods, interval_minutes);
    let values = stamps
        .iter()
        .map(|t| {
            let noise = match scenario {
                Scenario::Normal => gaussian_noise(rng, 5.0),
                Scenario::Volatile => gaussian_noise(rng, 15.0),
                Scenario::HighPeaks => {
                    let mut n = gaussian_noise(rng, 5.0);
                    if rng.random::<f64>() < SPIKE_PROBABILITY {
                        n += rng.random_range(50.0..100.0);
                    }
                    n
                }
            };
            (BASE_PRICE + hour_effect(t.hour()) + noise).max(0.0)
        })
        .collect();

    TimeSeries::new(stamps, values)
}

/// Generates a synthetic solar generation forecast on a [0, 1] scale.
///
/// A sine bell centered at noon over a 06:00–18:00 daylight window, with
/// Gaussian noise (σ = 0.1) for cloud cover, clamped to [0, 1].
pub fn generate_solar_series(
    start: NaiveDateTime,
    periods: usize,
    interval_minutes: u32,
    rng: &mut StdRng,
) -> TimeSeries {
    let stamps = timestamps(start, periods, interval_minutes);
    let values = stamps
        .iter()
        .map(|t| {
            let h = f64::from(t.hour()) + f64::from(t.minute()) / 60.0;
            let clear_sky = (std::f64::consts::PI * (h - 6.0) / 12.0).sin().max(0.0);
            (clear_sky + gaussian_noise(rng, 0.1)).clamp(0.0, 1.0)
        })
        .collect();

    TimeSeries::new(stamps, values)
}

/// Generates a complete aligned dataset of prices and forecasts.
///
/// `periods = horizon_hours * 60 / interval_minutes`. The price and solar
/// RNGs are seeded independently so the two series are uncorrelated but
/// each deterministic per seed.
pub fn generate_market_data(
    start: NaiveDateTime,
    horizon_hours: u32,
    interval_minutes: u32,
    scenario: Scenario,
    seed: u64,
) -> MarketData {
    let periods = (u64::from(horizon_hours) * 60 / u64::from(interval_minutes)) as usize;

    let mut price_rng = StdRng::seed_from_u64(seed);
    let prices = generate_price_series(start, periods, interval_minutes, scenario, &mut price_rng);

    let mut solar_rng = StdRng::seed_from_u64(seed.wrapping_add(SOLAR_SEED_OFFSET));
    let solar = generate_solar_series(start, periods, interval_minutes, &mut solar_rng);

    MarketData {
        prices,
        forecasts: ForecastSet { solar },
    }
}

/// Fixed start time for a reproducible sample day.
pub fn sample_day_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}
