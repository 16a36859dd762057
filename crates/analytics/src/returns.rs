use core_types::{ReturnPoint, ReturnSeries, ValuationSeries};

/// Derives periodic fractional returns between consecutive available points.
///
/// The result has `max(n - 1, 0)` entries, each dated at the later point.
/// Calendar gaps are not filled.
pub fn compute_returns(series: &ValuationSeries) -> ReturnSeries {
    let points = series
        .points()
        .windows(2)
        .map(|w| ReturnPoint {
            date: w[1].date(),
            fraction: w[1].value() / w[0].value() - 1.0,
        })
        .collect();
    ReturnSeries::new(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use core_types::ValuationPoint;

    fn series(values: &[f64]) -> ValuationSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        ValuationSeries::from_unsorted(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| ValuationPoint::new(start + Duration::days(i as i64), *v).unwrap())
                .collect(),
        )
    }

    #[test]
    fn length_is_one_less_than_series() {
        for n in 0..5usize {
            let values: Vec<f64> = (1..=n).map(|v| v as f64).collect();
            assert_eq!(compute_returns(&series(&values)).len(), n.saturating_sub(1));
        }
    }

    #[test]
    fn ten_percent_steps() {
        let returns = compute_returns(&series(&[100.0, 110.0, 121.0]));
        let fractions: Vec<f64> = returns.fractions().collect();
        assert_eq!(fractions.len(), 2);
        for f in fractions {
            assert!((f - 0.10).abs() < 1e-9);
        }
        assert_eq!(
            returns.points()[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }
}
