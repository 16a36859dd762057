use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Annualized risk statistics for one valuation series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskMetrics {
    pub annualized_volatility: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub returns: Vec<DatedReturn>,
}

impl RiskMetrics {
    /// The defined result for a series with no return observations.
    pub fn empty() -> Self {
        Self {
            annualized_volatility: 0.0,
            annualized_return: 0.0,
            sharpe_ratio: 0.0,
            returns: Vec::new(),
        }
    }
}

/// One periodic return, rounded to 8 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DatedReturn {
    #[serde(serialize_with = "serialize_iso_date")]
    pub date: NaiveDate,
    #[serde(rename = "returns")]
    pub fraction: f64,
}

/// The distribution of simulated final-day valuations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationResult {
    #[serde(rename = "expected_nav")]
    pub expected_value: f64,
    /// Percentage (0 to 100) of paths that finished above `last_value`.
    #[serde(rename = "probability_positive_return")]
    pub probability_positive: f64,
    #[serde(rename = "lower_bound_5th_percentile")]
    pub lower_p5: f64,
    #[serde(rename = "upper_bound_95th_percentile")]
    pub upper_p95: f64,
    #[serde(rename = "last_nav")]
    pub last_value: f64,
}

/// The outcome of a Monte Carlo run. Too little history is a normal result, not an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimulationOutcome {
    Completed(SimulationResult),
    /// The series has points but fewer than two returns.
    InsufficientData,
    /// The series has no usable points at all.
    NoData,
}

impl SimulationOutcome {
    pub const INSUFFICIENT_DATA_MESSAGE: &'static str =
        "Insufficient data for Monte Carlo simulation";
    pub const NO_DATA_MESSAGE: &'static str = "No NAV data";

    pub fn result(&self) -> Option<&SimulationResult> {
        match self {
            SimulationOutcome::Completed(result) => Some(result),
            SimulationOutcome::InsufficientData | SimulationOutcome::NoData => None,
        }
    }

    /// The client-facing message for outcomes without a result.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            SimulationOutcome::Completed(_) => None,
            SimulationOutcome::InsufficientData => Some(Self::INSUFFICIENT_DATA_MESSAGE),
            SimulationOutcome::NoData => Some(Self::NO_DATA_MESSAGE),
        }
    }
}

impl Serialize for SimulationOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match (self, self.message()) {
            (SimulationOutcome::Completed(result), _) => result.serialize(serializer),
            (_, message) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("message", message.unwrap_or_default())?;
                map.end()
            }
        }
    }
}

/// Annualized volatility of the trailing window ending on `date`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RollingVolatilityPoint {
    #[serde(serialize_with = "serialize_iso_date")]
    pub date: NaiveDate,
    pub rolling_volatility: f64,
}

/// Average day-over-day change for one calendar month, across all years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatmapEntry {
    #[serde(serialize_with = "serialize_month_label")]
    pub month: u32,
    #[serde(rename = "dayChange")]
    pub average_change: f64,
}

/// One date of a multi-series comparison. Every requested series has an entry;
/// `None` marks a series with no valuation on that date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    #[serde(serialize_with = "serialize_iso_date")]
    pub date: NaiveDate,
    pub values: BTreeMap<String, Option<f64>>,
}

fn serialize_iso_date<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&date.format("%Y-%m-%d"))
}

fn serialize_month_label<S: Serializer>(month: &u32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(month)
}
