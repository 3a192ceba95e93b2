//! Timestamped value series and alignment checks.

use chrono::NaiveDateTime;

use crate::error::SimError;

/// An ordered sequence of `(timestamp, value)` pairs with a fixed-width
/// interval between consecutive timestamps.
///
/// Prices carry currency/MWh values; solar forecasts carry a normalized
/// [0, 1] generation fraction.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<NaiveDateTime>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Creates a series from parallel timestamp and value vectors.
    ///
    /// # Panics
    ///
    /// Panics if the vectors differ in length or the timestamps are not
    /// strictly increasing.
    pub fn new(timestamps: Vec<NaiveDateTime>, values: Vec<f64>) -> Self {
        assert_eq!(timestamps.len(), values.len());
        assert!(
            timestamps.windows(2).all(|w| w[0] < w[1]),
            "timestamps must be strictly increasing"
        );
        Self { timestamps, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Iterates over `(timestamp, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.timestamps
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }

    /// Arithmetic mean of the values, or 0.0 for an empty series.
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Sample standard deviation (ddof = 1), or 0.0 for fewer than two values.
    pub fn std(&self) -> f64 {
        let n = self.values.len();
        if n < 2 {
            return 0.0;
        }
        let mean = self.mean();
        let sq_sum: f64 = self.values.iter().map(|v| (v - mean) * (v - mean)).sum();
        (sq_sum / (n - 1) as f64).sqrt()
    }
}

/// The forecast series consumed alongside a price series.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSet {
    /// Normalized [0, 1] solar generation forecast.
    pub solar: TimeSeries,
}

/// A price series and the forecasts aligned on the same timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketData {
    pub prices: TimeSeries,
    pub forecasts: ForecastSet,
}

/// Verifies that two series are non-empty, equal-length, and share the same
/// timestamps.
///
/// # Errors
///
/// Returns `SimError::MisalignedSeries` describing the first mismatch found.
pub fn check_alignment(prices: &TimeSeries, solar: &TimeSeries) -> Result<(), SimError> {
    if prices.is_empty() {
        return Err(SimError::MisalignedSeries(
            "price series is empty".to_string(),
        ));
    }
    if prices.len() != solar.len() {
        return Err(SimError::MisalignedSeries(format!(
            "length mismatch: {} prices vs {} solar forecasts",
            prices.len(),
            solar.len()
        )));
    }
    for (i, (p, s)) in prices
        .timestamps()
        .iter()
        .zip(solar.timestamps().iter())
        .enumerate()
    {
        if p != s {
            return Err(SimError::MisalignedSeries(format!(
                "timestamp mismatch at index {i}: {p} vs {s}"
            )));
        }
    }
    Ok(())
}
