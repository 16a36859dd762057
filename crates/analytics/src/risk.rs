use crate::report::{DatedReturn, RiskMetrics};
use crate::stats::{mean, round_to, sample_std_dev};
use core_types::ReturnSeries;

/// Decimal places kept on each per-period return in the output.
const RETURN_DECIMALS: i32 = 8;

/// Annualization inputs for [`compute_risk`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskParams {
    pub trading_days_per_year: u32,
    pub risk_free_rate: f64,
}

/// Computes annualized volatility, annualized return and the Sharpe ratio.
///
/// Volatility uses the sample standard deviation scaled by `sqrt(days)`; the
/// return compounds the mean periodic return over `days`. An empty series
/// yields [`RiskMetrics::empty`]. With a single observation the deviation is
/// undefined and volatility is reported as zero.
pub fn compute_risk(returns: &ReturnSeries, params: &RiskParams) -> RiskMetrics {
    if returns.is_empty() {
        return RiskMetrics::empty();
    }

    let fractions: Vec<f64> = returns.fractions().collect();
    let days = f64::from(params.trading_days_per_year);

    let annualized_volatility = sample_std_dev(&fractions).unwrap_or(0.0) * days.sqrt();
    let mean_return = mean(&fractions).unwrap_or(0.0);
    let annualized_return = (1.0 + mean_return).powf(days) - 1.0;

    RiskMetrics {
        annualized_volatility,
        annualized_return,
        sharpe_ratio: sharpe_ratio(annualized_return, annualized_volatility, params.risk_free_rate),
        returns: returns
            .points()
            .iter()
            .map(|p| DatedReturn {
                date: p.date,
                fraction: round_to(p.fraction, RETURN_DECIMALS),
            })
            .collect(),
    }
}

/// `(return - risk_free) / volatility`, or zero when volatility is not positive.
pub fn sharpe_ratio(
    annualized_return: f64,
    annualized_volatility: f64,
    risk_free_rate: f64,
) -> f64 {
    if annualized_volatility > 0.0 {
        (annualized_return - risk_free_rate) / annualized_volatility
    } else {
        0.0
    }
}
