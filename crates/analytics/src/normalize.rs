use chrono::NaiveDate;
use core_types::{RawNavRecord, RawNavValue, ValuationPoint, ValuationSeries};

/// Day-first layouts accepted for raw dates, tried in order. ISO dates are
/// accepted as well since they are unambiguous.
const DATE_FORMATS: &[&str] = &["%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y", "%d-%b-%Y", "%Y-%m-%d"];

/// Cleans raw source records into an ordered valuation series.
///
/// Records whose date or value cannot be parsed, or whose value is not a
/// finite positive number, are dropped. Survivors are sorted ascending by
/// date with a stable sort, so duplicate dates keep their source order.
pub fn normalize(records: &[RawNavRecord]) -> ValuationSeries {
    let points: Vec<ValuationPoint> = records.iter().filter_map(parse_record).collect();

    let dropped = records.len() - points.len();
    if dropped > 0 {
        tracing::debug!(dropped, kept = points.len(), "Dropped malformed valuation records.");
    }

    ValuationSeries::from_unsorted(points)
}

fn parse_record(record: &RawNavRecord) -> Option<ValuationPoint> {
    let date = parse_date(&record.date)?;
    let value = parse_value(&record.value)?;
    ValuationPoint::new(date, value).ok()
}

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

fn parse_value(raw: &RawNavValue) -> Option<f64> {
    let value = match raw {
        RawNavValue::Number(n) => *n,
        RawNavValue::Text(text) => text.trim().parse::<f64>().ok()?,
        RawNavValue::Other(_) => return None,
    };
    value.is_finite().then_some(value)
}
