use crate::report::RollingVolatilityPoint;
use crate::stats::sample_std_dev;
use core_types::ReturnSeries;

/// Trailing window, in returns, used when the caller does not choose one.
pub const DEFAULT_ROLLING_WINDOW: usize = 21;

/// Annualized sample volatility over each trailing window of `window` returns.
///
/// One point per full window, dated at the window's last return. Windows
/// shorter than two returns have no defined deviation and yield nothing.
pub fn rolling_volatility(
    returns: &ReturnSeries,
    window: usize,
    trading_days_per_year: u32,
) -> Vec<RollingVolatilityPoint> {
    if window < 2 {
        return Vec::new();
    }
    let scale = f64::from(trading_days_per_year).sqrt();
    let fractions: Vec<f64> = returns.fractions().collect();

    fractions
        .windows(window)
        .zip(returns.points().iter().skip(window - 1))
        .filter_map(|(values, last)| {
            sample_std_dev(values).map(|sd| RollingVolatilityPoint {
                date: last.date,
                rolling_volatility: sd * scale,
            })
        })
        .collect()
}
