use core_types::ValuationSeries;

/// Largest peak-to-trough decline, as a fraction at or below zero.
///
/// Each value is compared with the running maximum up to and including its
/// own date. An empty or never-declining series gives `0.0`.
pub fn max_drawdown(series: &ValuationSeries) -> f64 {
    let mut peak = f64::MIN;
    let mut worst = 0.0_f64;
    for value in series.values() {
        peak = peak.max(value);
        worst = worst.min(value / peak - 1.0);
    }
    worst
}
