use crate::enums::HoldingType;
use crate::error::CoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// A single raw record as delivered by a valuation source, before any cleaning.
///
/// Sources are loosely typed: the date is free text and the value may arrive
/// as a string, a JSON number, `null`, or not at all. Deserialization never
/// rejects a record over its contents; cleaning decides what is usable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNavRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(rename = "nav", default)]
    pub value: RawNavValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNavValue {
    Number(f64),
    Text(String),
    /// `null`, a missing field, or any other JSON shape. Never a usable value.
    Other(serde_json::Value),
}

impl Default for RawNavValue {
    fn default() -> Self {
        RawNavValue::Other(serde_json::Value::Null)
    }
}

impl RawNavRecord {
    pub fn new(date: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            value: RawNavValue::Text(value.into()),
        }
    }
}

/// Reads a string, rendering numbers as text and anything else as empty.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => text,
        serde_json::Value::Number(number) => number.to_string(),
        _ => String::new(),
    })
}

/// A cleaned valuation on a calendar date. The value is always finite and positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValuationPoint {
    date: NaiveDate,
    value: f64,
}

impl ValuationPoint {
    pub fn new(date: NaiveDate, value: f64) -> Result<Self, CoreError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(CoreError::InvalidValuation(value));
        }
        Ok(Self { date, value })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// An ascending-by-date sequence of valuation points.
///
/// Duplicate dates are kept side by side in the order they were supplied;
/// they are never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValuationSeries {
    points: Vec<ValuationPoint>,
}

impl ValuationSeries {
    /// Builds a series from points in any order. The sort is stable.
    pub fn from_unsorted(mut points: Vec<ValuationPoint>) -> Self {
        points.sort_by_key(|p| p.date);
        Self { points }
    }

    pub fn points(&self) -> &[ValuationPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&ValuationPoint> {
        self.points.last()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }
}

/// The fractional change between two consecutive valuation points, dated at the later one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub fraction: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ReturnSeries {
    points: Vec<ReturnPoint>,
}

impl ReturnSeries {
    pub fn new(points: Vec<ReturnPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[ReturnPoint] {
        &self.points
    }

    pub fn fractions(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.fraction)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// An instrument held in a user's portfolio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: HoldingType,
    pub name: String,
}
