use crate::align::align_series;
use crate::drawdown::max_drawdown;
use crate::error::AnalyticsError;
use crate::heatmap::monthly_heatmap;
use crate::monte_carlo::{SimulationParams, simulate};
use crate::normalize::normalize;
use crate::report::{
    ComparisonRow, HeatmapEntry, RiskMetrics, RollingVolatilityPoint, SimulationOutcome,
};
use crate::returns::compute_returns;
use crate::risk::{RiskParams, compute_risk};
use crate::rolling::rolling_volatility;
use core_types::{RawNavRecord, ValuationSeries};
use rand::RngCore;
use std::collections::BTreeMap;

pub const TRADING_DAYS_PER_YEAR: u32 = 252;
pub const RISK_FREE_RATE: f64 = 0.06;

/// A stateless calculator for deriving statistics from valuation histories.
///
/// The engine only carries the annualization parameters; every method is a
/// pure function of its arguments, so one instance can be shared freely
/// across threads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyticsEngine {
    risk: RiskParams,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self::new(TRADING_DAYS_PER_YEAR, RISK_FREE_RATE)
    }
}

impl AnalyticsEngine {
    pub fn new(trading_days_per_year: u32, risk_free_rate: f64) -> Self {
        Self {
            risk: RiskParams {
                trading_days_per_year,
                risk_free_rate,
            },
        }
    }

    /// Cleans raw source records into a valuation series.
    pub fn normalize(&self, records: &[RawNavRecord]) -> ValuationSeries {
        normalize(records)
    }

    /// Like [`AnalyticsEngine::normalize`], but treats an empty result as `DataUnavailable`.
    pub fn normalize_required(
        &self,
        instrument: &str,
        records: &[RawNavRecord],
    ) -> Result<ValuationSeries, AnalyticsError> {
        let series = normalize(records);
        if series.is_empty() {
            return Err(AnalyticsError::DataUnavailable(instrument.to_string()));
        }
        Ok(series)
    }

    /// Annualized volatility, return and Sharpe ratio of the series' periodic returns.
    pub fn risk_metrics(&self, series: &ValuationSeries) -> RiskMetrics {
        compute_risk(&compute_returns(series), &self.risk)
    }

    /// Projects the series forward from its most recent valuation.
    pub fn simulate<R: RngCore + ?Sized>(
        &self,
        series: &ValuationSeries,
        params: &SimulationParams,
        rng: &mut R,
    ) -> SimulationOutcome {
        let Some(last) = series.last() else {
            return SimulationOutcome::NoData;
        };
        simulate(&compute_returns(series), last.value(), params, rng)
    }

    /// Largest peak-to-trough decline of the series, as a fraction at or below zero.
    pub fn max_drawdown(&self, series: &ValuationSeries) -> f64 {
        max_drawdown(series)
    }

    /// Annualized volatility over each trailing `window` of periodic returns.
    pub fn rolling_volatility(
        &self,
        series: &ValuationSeries,
        window: usize,
    ) -> Vec<RollingVolatilityPoint> {
        rolling_volatility(
            &compute_returns(series),
            window,
            self.risk.trading_days_per_year,
        )
    }

    pub fn heatmap(&self, series: &ValuationSeries) -> Vec<HeatmapEntry> {
        monthly_heatmap(series)
    }

    pub fn compare(&self, series: &BTreeMap<String, ValuationSeries>) -> Vec<ComparisonRow> {
        align_series(series)
    }

    /// Percentage change from the valuation one trading year back to the latest one.
    ///
    /// The reference point is `max(0, n - trading_days_per_year)`. Returns
    /// `None` for an empty series or a non-positive reference value.
    pub fn one_year_growth_percent(&self, series: &ValuationSeries) -> Option<f64> {
        let latest = series.last()?.value();
        let index = series
            .len()
            .saturating_sub(self.risk.trading_days_per_year as usize);
        let reference = series.points().get(index)?.value();
        (reference > 0.0).then(|| (latest - reference) / reference * 100.0)
    }
}
