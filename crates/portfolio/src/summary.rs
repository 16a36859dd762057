use analytics::{RiskMetrics, SimulationOutcome};
use core_types::{Availability, Holding, HoldingType};
use serde::Serialize;

/// The Monte Carlo figures shown per holding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub expected_nav: f64,
    pub probability_positive: f64,
}

/// The risk figures shown per holding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskSummary {
    pub volatility: f64,
    pub sharpe_ratio: f64,
}

/// One row of a portfolio summary. Anything that could not be computed is `"N/A"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: HoldingType,
    #[serde(rename = "latest_nav")]
    pub latest_value: Availability<f64>,
    #[serde(rename = "one_year_growth")]
    pub one_year_growth_percent: Availability<f64>,
    #[serde(rename = "monte_carlo")]
    pub simulation: Availability<SimulationSummary>,
    #[serde(rename = "risk_volatility")]
    pub risk: Availability<RiskSummary>,
}

impl HoldingSummary {
    /// A row with every metric unavailable.
    pub fn unavailable(holding: &Holding) -> Self {
        Self {
            name: holding.name.clone(),
            item_type: holding.item_type.clone(),
            latest_value: Availability::NotAvailable,
            one_year_growth_percent: Availability::NotAvailable,
            simulation: Availability::NotAvailable,
            risk: Availability::NotAvailable,
        }
    }

    pub(crate) fn from_evaluation(holding: &Holding, evaluation: HoldingEvaluation) -> Self {
        Self {
            name: holding.name.clone(),
            item_type: holding.item_type.clone(),
            latest_value: evaluation.latest_value.into(),
            one_year_growth_percent: evaluation.one_year_growth_percent.into(),
            simulation: evaluation
                .simulation
                .result()
                .map(|r| SimulationSummary {
                    expected_nav: r.expected_value,
                    probability_positive: r.probability_positive,
                })
                .into(),
            risk: Availability::Available(RiskSummary {
                volatility: evaluation.risk.annualized_volatility,
                sharpe_ratio: evaluation.risk.sharpe_ratio,
            }),
        }
    }
}

/// The analytics computed for one mutual fund holding.
#[derive(Debug, Clone)]
pub(crate) struct HoldingEvaluation {
    pub latest_value: Option<f64>,
    pub one_year_growth_percent: Option<f64>,
    pub risk: RiskMetrics,
    pub simulation: SimulationOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub items: Vec<HoldingSummary>,
    #[serde(rename = "total_latest_nav")]
    pub total_latest_value: f64,
}

impl PortfolioSummary {
    /// Totals the latest values of the rows that have one.
    pub fn from_rows(items: Vec<HoldingSummary>) -> Self {
        let total_latest_value = items
            .iter()
            .filter_map(|row| row.latest_value.as_option())
            .sum();
        Self {
            items,
            total_latest_value,
        }
    }

    pub fn empty() -> Self {
        Self::from_rows(Vec::new())
    }
}
