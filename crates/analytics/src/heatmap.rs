use crate::report::HeatmapEntry;
use chrono::Datelike;
use core_types::ValuationSeries;
use std::collections::BTreeMap;

/// Averages day-over-day change per calendar month, ignoring the year.
///
/// The first point's change counts as `0`. Entries come out sorted by month
/// and only months present in the series appear.
pub fn monthly_heatmap(series: &ValuationSeries) -> Vec<HeatmapEntry> {
    let points = series.points();
    let mut buckets: BTreeMap<u32, (f64, usize)> = BTreeMap::new();

    for (i, point) in points.iter().enumerate() {
        let change = match i {
            0 => 0.0,
            _ => point.value() / points[i - 1].value() - 1.0,
        };
        let bucket = buckets.entry(point.date().month()).or_insert((0.0, 0));
        bucket.0 += change;
        bucket.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(month, (sum, count))| HeatmapEntry {
            month,
            average_change: sum / count as f64,
        })
        .collect()
}
