use analytics::{AnalyticsEngine, SimulationParams};
use api_client::error::ApiError;
use api_client::{SchemeMeta, ValuationSource};
use async_trait::async_trait;
use chrono::{Duration as Days, NaiveDate};
use core_types::{Availability, Holding, HoldingType, RawNavRecord};
use portfolio::{PortfolioSummarizer, SummaryOptions};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

enum Behavior {
    History(Vec<RawNavRecord>),
    Fail,
    Hang,
}

struct ScriptedSource {
    schemes: HashMap<String, Behavior>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(schemes: Vec<(&str, Behavior)>) -> Arc<Self> {
        Arc::new(Self {
            schemes: schemes
                .into_iter()
                .map(|(code, behavior)| (code.to_string(), behavior))
                .collect(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ValuationSource for ScriptedSource {
    async fn list_schemes(&self) -> Result<BTreeMap<String, String>, ApiError> {
        Ok(BTreeMap::new())
    }

    async fn scheme_meta(&self, _scheme_code: &str) -> Result<SchemeMeta, ApiError> {
        Ok(SchemeMeta::default())
    }

    async fn historical_nav(&self, scheme_code: &str) -> Result<Vec<RawNavRecord>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.schemes.get(scheme_code) {
            Some(Behavior::History(records)) => Ok(records.clone()),
            Some(Behavior::Fail) => Err(ApiError::Deserialization("garbled body".to_string())),
            Some(Behavior::Hang) => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(Vec::new())
            }
            None => Ok(Vec::new()),
        }
    }
}

fn history(values: &[f64]) -> Vec<RawNavRecord> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let date = start + Days::days(i as i64);
            RawNavRecord::new(date.format("%d-%m-%Y").to_string(), value.to_string())
        })
        .collect()
}

fn fund(id: &str, name: &str) -> Holding {
    Holding {
        id: id.to_string(),
        item_type: HoldingType::MutualFund,
        name: name.to_string(),
    }
}

fn stock(id: &str, name: &str) -> Holding {
    Holding {
        id: id.to_string(),
        item_type: HoldingType::Stock,
        name: name.to_string(),
    }
}

fn summarizer(source: Arc<ScriptedSource>, options: SummaryOptions) -> PortfolioSummarizer {
    let params = SimulationParams {
        num_simulations: 200,
        days: 30,
        batches: 4,
    };
    PortfolioSummarizer::new(source, AnalyticsEngine::default(), params, options)
}

fn seeded() -> SummaryOptions {
    SummaryOptions {
        seed: Some(42),
        ..SummaryOptions::default()
    }
}

fn trading_year_history() -> Vec<RawNavRecord> {
    let mut values = vec![100.0; 300];
    values[300 - 252] = 120.0;
    values[299] = 150.0;
    history(&values)
}

#[tokio::test]
async fn mixed_portfolio_totals_fund_values_only() {
    let source = ScriptedSource::new(vec![("118550", Behavior::History(trading_year_history()))]);
    let summary = summarizer(source.clone(), seeded())
        .summarize(&[fund("118550", "Growth Fund"), stock("INFY", "Infosys")])
        .await;

    assert_eq!(summary.items.len(), 2);
    assert_eq!(summary.total_latest_value, 150.0);

    let fund_row = &summary.items[0];
    assert_eq!(fund_row.name, "Growth Fund");
    assert_eq!(fund_row.latest_value, Availability::Available(150.0));
    let growth = *fund_row.one_year_growth_percent.as_option().unwrap();
    assert!((growth - 25.0).abs() < 1e-9);
    assert!(fund_row.risk.is_available());
    assert!(fund_row.simulation.is_available());

    let stock_row = &summary.items[1];
    assert_eq!(stock_row.item_type, HoldingType::Stock);
    assert_eq!(stock_row.latest_value, Availability::NotAvailable);
    assert_eq!(stock_row.risk, Availability::NotAvailable);

    // Non-fund holdings never reach the source.
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failing_holding_does_not_fail_the_summary() {
    let source = ScriptedSource::new(vec![
        ("broken", Behavior::Fail),
        ("118550", Behavior::History(history(&[10.0, 11.0, 12.5]))),
    ]);
    let summary = summarizer(source, seeded())
        .summarize(&[fund("broken", "Broken Fund"), fund("118550", "Working Fund")])
        .await;

    assert_eq!(summary.items[0].name, "Broken Fund");
    assert_eq!(summary.items[0].latest_value, Availability::NotAvailable);
    assert_eq!(summary.items[0].simulation, Availability::NotAvailable);
    assert_eq!(summary.items[1].latest_value, Availability::Available(12.5));
    assert_eq!(summary.total_latest_value, 12.5);
}

#[tokio::test]
async fn slow_holding_is_cut_off_by_its_timeout() {
    let source = ScriptedSource::new(vec![
        ("slow", Behavior::Hang),
        ("118550", Behavior::History(history(&[20.0, 21.0, 22.0]))),
    ]);
    let options = SummaryOptions {
        holding_timeout: Duration::from_millis(100),
        ..seeded()
    };

    let started = std::time::Instant::now();
    let summary = summarizer(source, options)
        .summarize(&[fund("slow", "Slow Fund"), fund("118550", "Quick Fund")])
        .await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(summary.items[0].latest_value, Availability::NotAvailable);
    assert_eq!(summary.items[1].latest_value, Availability::Available(22.0));
    assert_eq!(summary.total_latest_value, 22.0);
}

#[tokio::test]
async fn empty_history_keeps_risk_but_marks_the_rest_unavailable() {
    let source = ScriptedSource::new(vec![]);
    let summary = summarizer(source, seeded())
        .summarize(&[fund("999999", "Unknown Fund")])
        .await;

    let row = &summary.items[0];
    assert_eq!(row.latest_value, Availability::NotAvailable);
    assert_eq!(row.one_year_growth_percent, Availability::NotAvailable);
    assert_eq!(row.simulation, Availability::NotAvailable);
    let risk = row.risk.as_option().unwrap();
    assert_eq!(risk.volatility, 0.0);
    assert_eq!(risk.sharpe_ratio, 0.0);
    assert_eq!(summary.total_latest_value, 0.0);
}

#[tokio::test]
async fn rows_keep_holding_order_under_bounded_concurrency() {
    let codes: Vec<String> = (0..12).map(|i| format!("{}", 100 + i)).collect();
    let source = ScriptedSource::new(
        codes
            .iter()
            .enumerate()
            .map(|(i, code)| {
                let last = 10.0 + i as f64;
                (code.as_str(), Behavior::History(history(&[10.0, 10.5, last])))
            })
            .collect(),
    );
    let holdings: Vec<Holding> = codes.iter().map(|c| fund(c, &format!("Fund {c}"))).collect();
    let options = SummaryOptions {
        max_concurrent_fetches: 3,
        ..seeded()
    };

    let summary = summarizer(source, options).summarize(&holdings).await;

    let names: Vec<&str> = summary.items.iter().map(|r| r.name.as_str()).collect();
    let expected: Vec<String> = codes.iter().map(|c| format!("Fund {c}")).collect();
    assert_eq!(names, expected.iter().map(String::as_str).collect::<Vec<_>>());
    let expected_total: f64 = (0..12).map(|i| 10.0 + i as f64).sum();
    assert!((summary.total_latest_value - expected_total).abs() < 1e-9);
}

#[tokio::test]
async fn seeded_summaries_are_reproducible() {
    let values = [100.0, 101.0, 99.5, 102.0, 101.2, 103.4, 102.9];
    let source = ScriptedSource::new(vec![("118550", Behavior::History(history(&values)))]);
    let holdings = [fund("118550", "Growth Fund")];
    let summarizer = summarizer(source, seeded());

    let first = summarizer.summarize(&holdings).await;
    let second = summarizer.summarize(&holdings).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn empty_portfolio_summarizes_to_zero() {
    let summary = summarizer(ScriptedSource::new(vec![]), seeded())
        .summarize(&[])
        .await;
    assert!(summary.items.is_empty());
    assert_eq!(summary.total_latest_value, 0.0);
    assert_eq!(
        serde_json::to_value(&summary).unwrap(),
        serde_json::json!({ "items": [], "total_latest_nav": 0.0 })
    );
}
