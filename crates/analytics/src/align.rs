use crate::report::ComparisonRow;
use chrono::NaiveDate;
use core_types::ValuationSeries;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Outer-joins several valuation series on date.
///
/// Produces one row per distinct date across all inputs, ascending. Each row
/// carries an entry for every identifier, `None` where that series has no
/// point on the date. If a series repeats a date, its later point wins.
pub fn align_series(series: &BTreeMap<String, ValuationSeries>) -> Vec<ComparisonRow> {
    let lookups: BTreeMap<&str, HashMap<NaiveDate, f64>> = series
        .iter()
        .map(|(id, s)| {
            let by_date = s.points().iter().map(|p| (p.date(), p.value())).collect();
            (id.as_str(), by_date)
        })
        .collect();

    let dates: BTreeSet<NaiveDate> = series
        .values()
        .flat_map(|s| s.points().iter().map(|p| p.date()))
        .collect();

    dates
        .into_iter()
        .map(|date| ComparisonRow {
            date,
            values: lookups
                .iter()
                .map(|(id, by_date)| (id.to_string(), by_date.get(&date).copied()))
                .collect(),
        })
        .collect()
}
