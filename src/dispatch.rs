//! Greedy price-threshold dispatch engine and its schedule output.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::battery::{Battery, BatteryAction};
use crate::error::SimError;
use crate::series::{ForecastSet, TimeSeries, check_alignment};

/// SOC policy ceiling for charging decisions. Looser than the physical
/// guard-band so the rule never trips the clamp under normal conditions.
pub const CHARGE_SOC_MARGIN: f64 = 0.95;

/// SOC policy floor for discharging decisions.
pub const DISCHARGE_SOC_MARGIN: f64 = 0.05;

/// Threshold half-width in standard deviations around the price mean.
const THRESHOLD_BAND: f64 = 0.5;

/// One interval of the dispatch schedule.
///
/// Power is signed: positive discharges to the grid, negative charges from
/// the grid. Profit is `-power * price * dt` (paying when charging, earning
/// when discharging).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleRow {
    pub timestamp: NaiveDateTime,
    pub power_mw: f64,
    pub soc: f64,
    pub price: f64,
    pub profit: f64,
    pub energy_charged_mwh: f64,
    pub energy_discharged_mwh: f64,
}

impl fmt::Display for ScheduleRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | price={:>7.2}  power={:>7.2} MW  SoC={:>5.1}%  profit={:>8.2}",
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.price,
            self.power_mw,
            self.soc * 100.0,
            self.profit,
        )
    }
}

/// The ordered dispatch schedule, immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    rows: Vec<ScheduleRow>,
}

impl Schedule {
    pub fn rows(&self) -> &[ScheduleRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Derives the aggregate metrics for this schedule.
    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary::from_rows(&self.rows)
    }
}

/// Aggregate metrics derived from a complete schedule.
///
/// Computed post-hoc from the rows so the reported totals can never
/// disagree with the per-interval data.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleSummary {
    /// Sum of per-interval profits (currency).
    pub total_profit: f64,
    /// Total energy drawn from the grid (MWh).
    pub total_energy_charged_mwh: f64,
    /// Total energy delivered to the grid (MWh).
    pub total_energy_discharged_mwh: f64,
    /// SOC after the last interval.
    pub final_soc: f64,
}

impl ScheduleSummary {
    /// Computes all aggregates from the row vector.
    pub fn from_rows(rows: &[ScheduleRow]) -> Self {
        let mut total_profit = 0.0;
        let mut charged = 0.0;
        let mut discharged = 0.0;

        for r in rows {
            total_profit += r.profit;
            charged += r.energy_charged_mwh;
            discharged += r.energy_discharged_mwh;
        }

        Self {
            total_profit,
            total_energy_charged_mwh: charged,
            total_energy_discharged_mwh: discharged,
            final_soc: rows.last().map_or(0.0, |r| r.soc),
        }
    }
}

impl fmt::Display for ScheduleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Dispatch Summary ---")?;
        writeln!(f, "Total profit:      {:.2}", self.total_profit)?;
        writeln!(
            f,
            "Energy charged:    {:.3} MWh",
            self.total_energy_charged_mwh
        )?;
        writeln!(
            f,
            "Energy discharged: {:.3} MWh",
            self.total_energy_discharged_mwh
        )?;
        write!(f, "Final SoC:         {:.1}%", self.final_soc * 100.0)
    }
}

/// Rule-based dispatch engine.
///
/// A static, lookahead-free greedy threshold policy: charge when the price
/// sits below `mean - 0.5σ`, discharge above `mean + 0.5σ`, idle otherwise.
/// Mean and standard deviation are computed once over the entire input
/// series before the loop; the policy sees the whole horizon and is not an
/// online estimator.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyDispatch;

impl GreedyDispatch {
    /// Runs the policy over the price series and returns the schedule.
    ///
    /// Resets the battery to its initial SOC, then folds over the intervals
    /// in order; each decision depends on the SOC left by the previous step,
    /// so the loop is inherently sequential.
    ///
    /// # Errors
    ///
    /// Returns `SimError::MisalignedSeries` if the price and solar series
    /// are empty, differ in length, or differ in timestamps. No partial
    /// schedule is produced on error.
    pub fn optimize(
        &self,
        battery: &mut Battery,
        prices: &TimeSeries,
        forecasts: &ForecastSet,
    ) -> Result<Schedule, SimError> {
        check_alignment(prices, &forecasts.solar)?;

        battery.reset(None);

        let price_mean = prices.mean();
        let price_std = prices.std();
        let charge_threshold = price_mean - THRESHOLD_BAND * price_std;
        let discharge_threshold = price_mean + THRESHOLD_BAND * price_std;

        let dt_hours = battery.dt_hours();
        let mut rows = Vec::with_capacity(prices.len());

        // The solar forecast is validated for alignment but the threshold
        // rule itself is price-only.
        for (timestamp, price) in prices.iter() {
            let soc = battery.soc();

            let power_mw = if price < charge_threshold && soc < CHARGE_SOC_MARGIN {
                -battery.available_power(BatteryAction::Charge)
            } else if price > discharge_threshold && soc > DISCHARGE_SOC_MARGIN {
                battery.available_power(BatteryAction::Discharge)
            } else {
                0.0
            };

            let outcome = battery.step(power_mw);
            let profit = -power_mw * price * dt_hours;

            rows.push(ScheduleRow {
                timestamp,
                power_mw,
                soc: outcome.soc,
                price,
                profit,
                energy_charged_mwh: (-power_mw).max(0.0) * dt_hours,
                energy_discharged_mwh: power_mw.max(0.0) * dt_hours,
            });
        }

        Ok(Schedule { rows })
    }
}
