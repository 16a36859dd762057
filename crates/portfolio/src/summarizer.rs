use crate::error::PortfolioError;
use crate::summary::{HoldingEvaluation, HoldingSummary, PortfolioSummary};
use analytics::{AnalyticsEngine, SimulationParams};
use api_client::ValuationSource;
use core_types::Holding;
use futures::stream::{self, StreamExt};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;
pub const DEFAULT_HOLDING_TIMEOUT: Duration = Duration::from_secs(15);

/// How a summary fans out over the holdings of a portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    /// Upper bound on holdings being fetched and evaluated at once.
    pub max_concurrent_fetches: usize,
    /// Budget for fetching and evaluating one holding.
    pub holding_timeout: Duration,
    /// Base seed for the per-holding simulation generators. `None` draws from the OS.
    pub seed: Option<u64>,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            holding_timeout: DEFAULT_HOLDING_TIMEOUT,
            seed: None,
        }
    }
}

/// Builds per-holding analytics for a whole portfolio.
///
/// Holdings are evaluated concurrently, at most `max_concurrent_fetches` at a
/// time, and the rows come back in holding order. A holding whose fetch fails
/// or exceeds its timeout is reported with every metric unavailable; it never
/// fails the summary. The total is computed once all rows are in.
#[derive(Clone)]
pub struct PortfolioSummarizer {
    source: Arc<dyn ValuationSource>,
    engine: AnalyticsEngine,
    simulation: SimulationParams,
    options: SummaryOptions,
}

impl PortfolioSummarizer {
    pub fn new(
        source: Arc<dyn ValuationSource>,
        engine: AnalyticsEngine,
        simulation: SimulationParams,
        options: SummaryOptions,
    ) -> Self {
        Self {
            source,
            engine,
            simulation,
            options,
        }
    }

    pub async fn summarize(&self, holdings: &[Holding]) -> PortfolioSummary {
        tracing::info!(holdings = holdings.len(), "Summarizing portfolio.");

        // Collected up front so the returned future stays `Send` for any
        // borrow lifetime; the futures are lazy and only run when buffered.
        let pending: Vec<_> = holdings
            .iter()
            .enumerate()
            .map(|(index, holding)| self.summarize_holding(index, holding))
            .collect();
        let rows: Vec<HoldingSummary> = stream::iter(pending)
            .buffered(self.options.max_concurrent_fetches.max(1))
            .collect()
            .await;

        let summary = PortfolioSummary::from_rows(rows);
        tracing::info!(
            total_latest_value = summary.total_latest_value,
            "Portfolio summary complete."
        );
        summary
    }

    async fn summarize_holding(&self, index: usize, holding: &Holding) -> HoldingSummary {
        if !holding.item_type.is_mutual_fund() {
            return HoldingSummary::unavailable(holding);
        }

        let timeout = self.options.holding_timeout;
        let result = match tokio::time::timeout(timeout, self.evaluate(index, holding)).await {
            Ok(result) => result,
            Err(_) => Err(PortfolioError::TimedOut(timeout)),
        };

        match result {
            Ok(evaluation) => HoldingSummary::from_evaluation(holding, evaluation),
            Err(e) => {
                tracing::warn!(
                    holding_id = %holding.id,
                    holding_name = %holding.name,
                    error = %e,
                    "Holding could not be evaluated; reporting it as unavailable."
                );
                HoldingSummary::unavailable(holding)
            }
        }
    }

    async fn evaluate(
        &self,
        index: usize,
        holding: &Holding,
    ) -> Result<HoldingEvaluation, PortfolioError> {
        let records = self.source.historical_nav(&holding.id).await?;

        let engine = self.engine;
        let params = self.simulation;
        let seed = self.options.seed.map(|base| base.wrapping_add(index as u64));

        let evaluation = tokio::task::spawn_blocking(move || {
            let series = engine.normalize(&records);
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            HoldingEvaluation {
                latest_value: series.last().map(|p| p.value()),
                one_year_growth_percent: engine.one_year_growth_percent(&series),
                risk: engine.risk_metrics(&series),
                simulation: engine.simulate(&series, &params, &mut rng),
            }
        })
        .await?;

        Ok(evaluation)
    }
}
