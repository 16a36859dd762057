//! Small numeric helpers shared by the calculators.

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Relative size below which a deviation is rounding noise around the mean.
const NOISE_FLOOR: f64 = 1e-12;

/// Sample standard deviation (ddof = 1). Undefined below two observations.
///
/// Deviations within rounding noise of the mean collapse to exactly zero so a
/// constant series is reported as riskless.
pub(crate) fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
    let sd = (sum_sq / (values.len() - 1) as f64).sqrt();
    if sd <= mean.abs() * NOISE_FLOOR {
        return Some(0.0);
    }
    Some(sd)
}

/// Percentile with linear interpolation between order statistics.
/// `sorted` must be ascending and non-empty; `pct` is in `0..=100`.
pub(crate) fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let rank = (pct / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_std_dev_uses_n_minus_one() {
        let sd = sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((sd - 2.138089935299395).abs() < 1e-12);
        assert_eq!(sample_std_dev(&[1.0]), None);
    }

    #[test]
    fn constant_values_have_exactly_zero_deviation() {
        assert_eq!(sample_std_dev(&[0.1, 0.1, 0.1]), Some(0.0));
        assert_eq!(sample_std_dev(&[0.001; 7]), Some(0.0));
        assert_eq!(sample_std_dev(&[0.0, 0.0]), Some(0.0));
    }

    #[test]
    fn percentile_interpolates_linearly() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((percentile(&sorted, 5.0) - 1.2).abs() < 1e-12);
        assert!((percentile(&sorted, 95.0) - 4.8).abs() < 1e-12);
        assert_eq!(percentile(&sorted, 50.0), 3.0);
        assert_eq!(percentile(&[7.0], 95.0), 7.0);
    }

    #[test]
    fn rounds_to_eight_decimals() {
        assert_eq!(round_to(0.123456789123, 8), 0.12345679);
    }
}
